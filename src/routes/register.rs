use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use crate::auth::registration;
use crate::error::AppResult;
use crate::extractors::JsonBody;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/register/", post(register))
}

async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<impl IntoResponse> {
    registration::register(state.repo.as_ref(), &body, state.config.auth.bcrypt_cost).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}
