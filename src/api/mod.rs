//! Mock remote posts server.
//!
//! Serves the subset of the JSONPlaceholder API that sync uses, so the
//! client can be pointed at a local endpoint. Unlike JSONPlaceholder, writes
//! stick: created and edited posts show up in later listings.

mod handlers;

use std::sync::{Arc, Mutex};

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::models::RemotePost;

/// In-memory post collection shared by the handlers.
#[derive(Clone, Default)]
pub struct PostBoard {
    posts: Arc<Mutex<Vec<RemotePost>>>,
}

impl PostBoard {
    pub fn new(posts: Vec<RemotePost>) -> Self {
        Self {
            posts: Arc::new(Mutex::new(posts)),
        }
    }

    /// Ten posts from two users, shaped like the public mock API.
    pub fn seeded() -> Self {
        const TITLES: [&str; 10] = [
            "sunt aut facere repellat provident occaecati",
            "qui est esse",
            "ea molestias quasi exercitationem repellat qui ipsa sit aut",
            "eum et est occaecati",
            "nesciunt quas odio",
            "dolorem eum magni eos aperiam quia",
            "magnam facilis autem",
            "dolorem dolore est ipsam",
            "nesciunt iure omnis dolorem tempora et accusantium",
            "optio molestias id quia eum",
        ];

        let posts = TITLES
            .iter()
            .enumerate()
            .map(|(i, title)| RemotePost {
                id: i as u64 + 1,
                title: title.to_string(),
                body: String::new(),
                user_id: if i < 5 { 1 } else { 2 },
            })
            .collect();
        Self::new(posts)
    }

    pub fn snapshot(&self) -> Vec<RemotePost> {
        self.posts.lock().expect("post board lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.posts.lock().expect("post board lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn create_router(board: PostBoard) -> Router {
    Router::new()
        .route(
            "/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/posts/{id}",
            get(handlers::get_post).put(handlers::update_post),
        )
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(board)
}
