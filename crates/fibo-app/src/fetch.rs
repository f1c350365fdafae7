use std::sync::Arc;

use dashmap::DashMap;
use fibo_common::{BackendClient, ClientError, Post};
use tokio::sync::OnceCell;

/// Post fetcher shared by the views.
///
/// Concurrent requests for the same id share one backend call. Successful
/// results stay cached until invalidated; failures are not cached.
#[derive(Clone)]
pub struct CachedFetcher {
    pub client: Arc<BackendClient>,
    posts: Arc<DashMap<i64, Arc<OnceCell<Arc<Post>>>>>,
}

impl CachedFetcher {
    pub fn new(client: BackendClient) -> Self {
        Self {
            client: Arc::new(client),
            posts: Arc::new(DashMap::new()),
        }
    }

    pub async fn get_post(&self, id: i64) -> Result<Arc<Post>, ClientError> {
        // Clone the cell out so the map shard is not locked across the await
        let cell = self.posts.entry(id).or_default().clone();
        let fetched = cell
            .get_or_try_init(|| async {
                tracing::debug!(id, "fetching post");
                self.client.get_post(id).await.map(Arc::new)
            })
            .await;
        match fetched {
            Ok(post) => Ok(post.clone()),
            Err(e) => {
                // Leave no empty cell behind unless another caller has since filled it
                self.posts.remove_if(&id, |_, cell| !cell.initialized());
                Err(e)
            }
        }
    }

    /// Cached copy of a post, without touching the network.
    pub fn cached(&self, id: i64) -> Option<Arc<Post>> {
        self.posts.get(&id).and_then(|cell| cell.get().cloned())
    }

    /// Drop a cached post so the next read refetches it.
    pub fn invalidate(&self, id: i64) {
        self.posts.remove(&id);
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, ClientError> {
        self.client.list_posts().await
    }

    pub async fn list_published(&self) -> Result<Vec<Post>, ClientError> {
        self.client.list_published().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::extract::{Path, State};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;
    use crate::test_backend;

    /// Backend that delays replies, fails the very first request if its id is
    /// odd, and has no posts at ids 100 and up.
    async fn handler(State(hits): State<Arc<AtomicUsize>>, Path(id): Path<i64>) -> Json<Value> {
        let n = hits.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        if id >= 100 {
            return Json(json!({"status": 404, "message": "post not found", "data": null}));
        }
        if id % 2 == 1 && n == 0 {
            return Json(json!({"status": 500, "message": "internal error", "data": null}));
        }
        Json(json!({"status": 200, "message": "ok", "data": {
            "Id": id, "Title": format!("post {id}"), "Content": "{\"blocks\":[]}",
            "Likes": 0, "IsPublished": true
        }}))
    }

    async fn fetcher() -> (CachedFetcher, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route("/posts/{id}", get(handler))
            .with_state(hits.clone());
        let base = test_backend::spawn(router).await;
        (CachedFetcher::new(BackendClient::new(base)), hits)
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_request() {
        let (fetcher, hits) = fetcher().await;
        let (a, b) = tokio::join!(fetcher.get_post(4), fetcher.get_post(4));
        assert_eq!(a.unwrap().title, "post 4");
        assert_eq!(b.unwrap().title, "post 4");
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        fetcher.get_post(4).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(fetcher.cached(4).is_some());
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let (fetcher, hits) = fetcher().await;
        let err = fetcher.get_post(3).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 500, .. }));
        assert!(fetcher.cached(3).is_none());

        let post = fetcher.get_post(3).await.unwrap();
        assert_eq!(post.id, 3);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_ids_leave_no_entries() {
        let (fetcher, _) = fetcher().await;
        for id in 100..150 {
            assert!(fetcher.get_post(id).await.is_err());
        }
        assert_eq!(fetcher.posts.len(), 0);

        fetcher.get_post(2).await.unwrap();
        assert_eq!(fetcher.posts.len(), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let (fetcher, hits) = fetcher().await;
        fetcher.get_post(2).await.unwrap();
        fetcher.invalidate(2);
        fetcher.get_post(2).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
