//! HTTP client tests against a live mock server on an ephemeral port.

mod common;

use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use common::*;
use quotebook::api::{create_router, PostBoard};
use quotebook::models::*;
use quotebook::remote::{PostsClient, RemoteError, RemoteSource};

/// Serve `app` on 127.0.0.1 and return its base URL.
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    format!("http://{}", addr)
}

fn client(base_url: &str, limit: usize) -> PostsClient {
    PostsClient::new(base_url, limit, Duration::from_secs(5))
}

mod fetch_candidates {
    use super::*;

    #[tokio::test]
    async fn returns_the_first_posts_up_to_the_limit() {
        let url = spawn(create_router(PostBoard::seeded())).await;

        let posts = client(&url, 5).fetch_candidates().await.expect("Fetch failed");

        let ids: Vec<u64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn maps_non_success_status_to_an_error() {
        let app = Router::new().route(
            "/posts",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let url = spawn(app).await;

        let err = client(&url, 5).fetch_candidates().await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(matches!(err, RemoteError::Status { ref body, .. } if body == "boom"));
    }

    #[tokio::test]
    async fn reports_an_unreachable_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}", addr), 5)
            .fetch_candidates()
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::Http(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn gives_up_after_the_timeout() {
        let app = Router::new().route(
            "/posts",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "[]"
            }),
        );
        let url = spawn(app).await;
        let slow = PostsClient::new(url, 5, Duration::from_millis(100));

        let err = slow.fetch_candidates().await.unwrap_err();

        assert!(matches!(err, RemoteError::Http(ref e) if e.is_timeout()));
    }
}

mod submit {
    use super::*;

    #[tokio::test]
    async fn returns_the_server_id() {
        let board = PostBoard::seeded();
        let url = spawn(create_router(board.clone())).await;
        let quote = Quote::new("local-1", "Ship it", "Work");

        let receipt = client(&url, 5)
            .submit(&NewPost::from_quote(&quote))
            .await
            .expect("Submit failed");

        assert_eq!(receipt.id, 11);
        assert_eq!(board.len(), 11);
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn reconcile_pulls_then_merges_upstream_edits() {
        let url = spawn(create_router(PostBoard::seeded())).await;
        let remote = client(&url, 5);
        let mut h = harness();

        let first = h.store.reconcile(&remote).await;
        assert_eq!(first.report().unwrap().added, 5);

        reqwest::Client::new()
            .put(format!("{}/posts/1", url))
            .json(&serde_json::json!({ "title": "changed upstream" }))
            .send()
            .await
            .expect("Update failed");

        let second = h.store.reconcile(&remote).await;
        assert_eq!(
            second.report(),
            Some(&SyncReport { merged: 1, added: 0, total: 8 })
        );
        assert_eq!(h.store.get("server-1").unwrap().text, "Changed upstream.");
    }

    #[tokio::test]
    async fn submitted_quotes_come_back_as_server_quotes() {
        let url = spawn(create_router(PostBoard::seeded())).await;
        let remote = client(&url, 20);
        let mut h = harness();

        h.store
            .add_and_submit(&remote, "Ship it", "Work")
            .await
            .expect("Add failed");
        let outcome = h.store.reconcile(&remote).await;

        assert_eq!(outcome.report().unwrap().added, 11);
        let echoed = h.store.get("server-11").expect("Submitted post missing");
        assert_eq!(echoed.text, "Ship it.");
        assert_eq!(h.store.len(), 15);
    }
}
