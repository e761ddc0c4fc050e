use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{AppError, AppResult};
use crate::extractors::{JsonBody, PathId};
use crate::repository::PostStore;
use crate::serializers::post::{self, PostView};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/", get(list_posts).post(create_post))
        .route("/posts/{id}/", get(get_post))
        .route("/posts/category/{category_id}/", get(list_posts_by_category))
}

fn views(posts: Vec<crate::db::models::Post>) -> Json<Vec<PostView>> {
    Json(posts.into_iter().map(PostView::from).collect())
}

async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<PostView>>> {
    Ok(views(state.repo.list_posts().await?))
}

async fn create_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, Json<PostView>)> {
    let new_post = post::validate_new(&body, state.repo.as_ref()).await?;
    let created = state.repo.create_post(new_post).await?;
    Ok((StatusCode::CREATED, Json(PostView::from(created))))
}

async fn get_post(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<PostView>> {
    let post = state.repo.get_post(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(PostView::from(post)))
}

/// Set membership only: an unknown category simply matches nothing.
async fn list_posts_by_category(
    State(state): State<AppState>,
    PathId(category_id): PathId,
) -> AppResult<Json<Vec<PostView>>> {
    Ok(views(state.repo.list_posts_by_category(category_id).await?))
}
