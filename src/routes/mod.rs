pub mod categories;
pub mod communities;
pub mod posts;
pub mod profiles;
pub mod register;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// The full HTTP surface, with uploaded media served from the configured media directory.
pub fn app(state: AppState) -> Router {
    let media = ServeDir::new(state.config.media_path());

    Router::new()
        .merge(register::router())
        .merge(posts::router())
        .merge(categories::router())
        .merge(communities::router())
        .merge(profiles::router())
        .nest_service("/media", media)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
