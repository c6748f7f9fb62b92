use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use models::{Blog, BlogDraft, Comment};

use crate::errors::{decode, parse_blog_id, ApiError};
use crate::routes::to_completion;
use crate::state::AppState;

/// List every blog
pub async fn list_blogs(State(state): State<AppState>) -> Result<Json<Vec<Blog>>, ApiError> {
    Ok(Json(state.blogs.list().await?))
}

/// Create a blog; any client-supplied id is ignored
pub async fn create_blog(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Blog>), ApiError> {
    let draft: BlogDraft = decode(&body)?;
    let blog = to_completion(async move { state.blogs.create(draft).await }).await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

pub async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_blog_id(&id)?;
    to_completion(async move { state.blogs.delete(id).await }).await?;
    Ok(StatusCode::OK)
}

pub async fn like_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_blog_id(&id)?;
    to_completion(async move { state.blogs.like(id).await }).await?;
    Ok(StatusCode::OK)
}

/// Append a comment. The id and the payload are both checked before the store is touched.
pub async fn comment_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let id = parse_blog_id(&id)?;
    let comment: Comment = decode(&body)?;
    to_completion(async move { state.blogs.comment(id, comment).await }).await?;
    Ok(StatusCode::OK)
}
