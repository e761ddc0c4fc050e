use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{AppError, AppResult};
use crate::extractors::{JsonBody, PathId};
use crate::repository::ProfileStore;
use crate::serializers::profile::{self, ProfileView};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/", get(list_profiles).post(create_profile))
        .route(
            "/profile/{id}/",
            get(get_profile)
                .put(replace_profile)
                .patch(patch_profile)
                .delete(delete_profile),
        )
}

async fn list_profiles(State(state): State<AppState>) -> AppResult<Json<Vec<ProfileView>>> {
    let media_url = &state.config.media.url;
    let profiles = state.repo.list_profiles().await?;
    Ok(Json(
        profiles
            .into_iter()
            .map(|p| ProfileView::new(p, media_url))
            .collect(),
    ))
}

async fn create_profile(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<ProfileView>)> {
    let media_url = &state.config.media.url;
    let data = profile::validate(&body, false, None, state.repo.as_ref(), media_url).await?;
    let created = state.repo.create_profile(data).await?;
    Ok((StatusCode::CREATED, Json(ProfileView::new(created, media_url))))
}

async fn get_profile(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<ProfileView>> {
    let profile = state.repo.get_profile(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(ProfileView::new(profile, &state.config.media.url)))
}

async fn update_profile(
    state: &AppState,
    id: i64,
    body: &serde_json::Value,
    partial: bool,
) -> AppResult<Json<ProfileView>> {
    let media_url = &state.config.media.url;
    let existing = state.repo.get_profile(id).await?.ok_or(AppError::NotFound)?;
    let data = profile::validate(
        body,
        partial,
        Some(&existing),
        state.repo.as_ref(),
        media_url,
    )
    .await?;
    let updated = state.repo.update_profile(id, data).await?;
    Ok(Json(ProfileView::new(updated, media_url)))
}

async fn replace_profile(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> AppResult<Json<ProfileView>> {
    update_profile(&state, id, &body, false).await
}

async fn patch_profile(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> AppResult<Json<ProfileView>> {
    update_profile(&state, id, &body, true).await
}

async fn delete_profile(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<StatusCode> {
    state.repo.delete_profile(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
