use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{AppError, AppResult};
use crate::extractors::{JsonBody, PathId};
use crate::repository::CommunityStore;
use crate::serializers::community::{self, CommunityView};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/communities/",
            get(list_communities).post(create_community),
        )
        .route(
            "/communities/{id}/",
            get(get_community)
                .put(replace_community)
                .patch(patch_community)
                .delete(delete_community),
        )
}

async fn list_communities(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CommunityView>>> {
    let communities = state.repo.list_communities().await?;
    Ok(Json(
        communities.into_iter().map(CommunityView::from).collect(),
    ))
}

async fn create_community(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<CommunityView>)> {
    let data = community::validate(&body, false, None, state.repo.as_ref()).await?;
    let created = state.repo.create_community(data).await?;
    Ok((StatusCode::CREATED, Json(CommunityView::from(created))))
}

async fn get_community(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<CommunityView>> {
    let community = state
        .repo
        .get_community(id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(CommunityView::from(community)))
}

async fn update_community(
    state: &AppState,
    id: i64,
    body: &serde_json::Value,
    partial: bool,
) -> AppResult<Json<CommunityView>> {
    let existing = state
        .repo
        .get_community(id)
        .await?
        .ok_or(AppError::NotFound)?;
    let data = community::validate(body, partial, Some(&existing), state.repo.as_ref()).await?;
    let updated = state.repo.update_community(id, data).await?;
    Ok(Json(CommunityView::from(updated)))
}

async fn replace_community(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> AppResult<Json<CommunityView>> {
    update_community(&state, id, &body, false).await
}

async fn patch_community(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(body): JsonBody,
) -> AppResult<Json<CommunityView>> {
    update_community(&state, id, &body, true).await
}

async fn delete_community(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<StatusCode> {
    state.repo.delete_community(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
