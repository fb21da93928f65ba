use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::PostBoard;
use crate::models::{NewPost, RemotePost};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(rename = "_limit")]
    pub limit: Option<usize>,
    #[serde(rename = "userId")]
    pub user_id: Option<u64>,
}

/// Partial update of a post.
#[derive(Debug, Deserialize)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<u64>,
}

/// Create response: the stored post plus the echoed local id.
#[derive(Debug, Serialize)]
pub struct CreatedPost {
    #[serde(flatten)]
    pub post: RemotePost,
    #[serde(rename = "localId")]
    pub local_id: String,
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Posts
// ============================================================

pub async fn list_posts(
    State(board): State<PostBoard>,
    Query(params): Query<ListParams>,
) -> Json<Vec<RemotePost>> {
    let posts = board
        .snapshot()
        .into_iter()
        .filter(|p| params.user_id.map_or(true, |u| p.user_id == u))
        .take(params.limit.unwrap_or(usize::MAX))
        .collect();
    Json(posts)
}

pub async fn get_post(
    State(board): State<PostBoard>,
    Path(id): Path<u64>,
) -> Result<Json<RemotePost>, (StatusCode, String)> {
    board
        .snapshot()
        .into_iter()
        .find(|p| p.id == id)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Post not found".to_string()))
}

pub async fn create_post(
    State(board): State<PostBoard>,
    Json(input): Json<NewPost>,
) -> Result<(StatusCode, Json<CreatedPost>), (StatusCode, String)> {
    if input.title.trim().is_empty() {
        tracing::warn!("Rejected post without a title");
        return Err((StatusCode::BAD_REQUEST, "Title is required".to_string()));
    }

    let mut posts = board.posts.lock().expect("post board lock poisoned");
    let id = posts.iter().map(|p| p.id).max().unwrap_or(0) + 1;
    let post = RemotePost {
        id,
        title: input.title,
        body: input.body,
        user_id: input.user_id,
    };
    posts.push(post.clone());
    tracing::info!("Created post {} for local quote {}", id, input.local_id);

    Ok((
        StatusCode::CREATED,
        Json(CreatedPost {
            post,
            local_id: input.local_id,
        }),
    ))
}

pub async fn update_post(
    State(board): State<PostBoard>,
    Path(id): Path<u64>,
    Json(input): Json<UpdatePostInput>,
) -> Result<Json<RemotePost>, (StatusCode, String)> {
    let mut posts = board.posts.lock().expect("post board lock poisoned");
    let post = posts
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or((StatusCode::NOT_FOUND, "Post not found".to_string()))?;

    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(body) = input.body {
        post.body = body;
    }
    if let Some(user_id) = input.user_id {
        post.user_id = user_id;
    }

    Ok(Json(post.clone()))
}
