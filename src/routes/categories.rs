use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::AppResult;
use crate::repository::CategoryStore;
use crate::serializers::category::CategoryView;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/categories/", get(list_categories))
}

async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<CategoryView>>> {
    let categories = state.repo.list_categories().await?;
    Ok(Json(categories.into_iter().map(CategoryView::from).collect()))
}
