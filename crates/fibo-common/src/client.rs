use std::fmt;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::ClientError;
use crate::post::{ApiResponse, NewPost, Post, UpdatePost};

/// Token the backend issued at login. Sent verbatim as the `Authorization`
/// header, without a scheme prefix.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// Unauthenticated access to the blog API.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

impl BackendClient {
    pub fn new(base: Url) -> Self {
        Self::with_http(base, reqwest::Client::new())
    }

    pub fn with_http(base: Url, http: reqwest::Client) -> Self {
        Self { http, base }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.backend_url.clone())
    }

    /// Bind a token, giving access to the endpoints that need one.
    pub fn authenticated(&self, token: AuthToken) -> AuthedClient {
        AuthedClient {
            inner: self.clone(),
            token,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base.join(path).map_err(|source| ClientError::Url {
            path: path.to_string(),
            source,
        })
    }

    /// `GET /posts/{id}`
    pub async fn get_post(&self, id: i64) -> Result<Post, ClientError> {
        let url = self.endpoint(&format!("posts/{id}"))?;
        let req = self.http.get(url.clone());
        let post: Option<Post> = fetch_data(req, &url).await?;
        post.ok_or_else(|| ClientError::Api {
            status: 200,
            message: format!("post {id} missing from response"),
        })
    }

    /// `GET /posts`, every post regardless of publish state.
    pub async fn list_posts(&self) -> Result<Vec<Post>, ClientError> {
        let url = self.endpoint("posts")?;
        let posts: Option<Vec<Post>> = fetch_data(self.http.get(url.clone()), &url).await?;
        Ok(posts.unwrap_or_default())
    }

    /// `GET /posts/published`
    pub async fn list_published(&self) -> Result<Vec<Post>, ClientError> {
        let url = self.endpoint("posts/published")?;
        let posts: Option<Vec<Post>> = fetch_data(self.http.get(url.clone()), &url).await?;
        Ok(posts.unwrap_or_default())
    }
}

/// Reply to a write request, passed back as received.
///
/// `transport_status` is the HTTP status line; `body.status` is the status
/// the backend puts in its JSON envelope. Success is judged on the latter.
#[derive(Debug, Clone)]
pub struct SubmitResponse {
    pub transport_status: StatusCode,
    pub body: ApiResponse<serde_json::Value>,
}

impl SubmitResponse {
    pub fn is_success(&self) -> bool {
        self.body.is_ok()
    }

    /// Id of the created post, when the backend returned one.
    pub fn post_id(&self) -> Option<i64> {
        self.body.data.as_ref().and_then(|d| d.as_i64())
    }
}

/// Client with a token attached to every request.
#[derive(Debug, Clone)]
pub struct AuthedClient {
    inner: BackendClient,
    token: AuthToken,
}

impl AuthedClient {
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner
            .http
            .request(method, url)
            .header(AUTHORIZATION, self.token.as_str())
    }

    /// `POST /posts`
    pub async fn submit_post(&self, post: &NewPost) -> Result<SubmitResponse, ClientError> {
        let url = self.inner.endpoint("posts")?;
        tracing::debug!(%url, title = %post.title, published = post.is_published, "submitting post");
        let req = self.request(Method::POST, url.clone()).json(post);
        send_write(req, &url).await
    }

    /// Submit serialized content under `title`.
    pub async fn submit(
        &self,
        title: impl Into<String>,
        content: String,
        publish: bool,
    ) -> Result<SubmitResponse, ClientError> {
        self.submit_post(&NewPost {
            title: title.into(),
            is_published: publish,
            content,
        })
        .await
    }

    /// `PUT /posts/{id}`
    pub async fn update_post(
        &self,
        id: i64,
        update: &UpdatePost,
    ) -> Result<SubmitResponse, ClientError> {
        let url = self.inner.endpoint(&format!("posts/{id}"))?;
        tracing::debug!(%url, published = update.is_published, "updating post");
        let req = self.request(Method::PUT, url.clone()).json(update);
        send_write(req, &url).await
    }

    /// `GET /users/me/posts`, the token owner's posts including drafts.
    pub async fn my_posts(&self) -> Result<Vec<Post>, ClientError> {
        let url = self.inner.endpoint("users/me/posts")?;
        let req = self.request(Method::GET, url.clone());
        let posts: Option<Vec<Post>> = fetch_data(req, &url).await?;
        Ok(posts.unwrap_or_default())
    }

    /// `GET /posts/me/likes`, likes summed over the token owner's posts.
    pub async fn total_likes(&self) -> Result<i64, ClientError> {
        let url = self.inner.endpoint("posts/me/likes")?;
        let req = self.request(Method::GET, url.clone());
        let likes: Option<i64> = fetch_data(req, &url).await?;
        Ok(likes.unwrap_or_default())
    }
}

async fn fetch_envelope<T: DeserializeOwned>(
    req: RequestBuilder,
    url: &Url,
) -> Result<(StatusCode, ApiResponse<T>), ClientError> {
    tracing::debug!(%url, "request");
    let resp = req.send().await.map_err(|source| ClientError::Request {
        url: url.to_string(),
        source,
    })?;
    let status = resp.status();
    let body = resp
        .json::<ApiResponse<T>>()
        .await
        .map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })?;
    Ok((status, body))
}

async fn fetch_data<T: DeserializeOwned>(
    req: RequestBuilder,
    url: &Url,
) -> Result<Option<T>, ClientError> {
    let (_, body) = fetch_envelope::<T>(req, url).await?;
    if !body.is_ok() {
        return Err(ClientError::Api {
            status: body.status,
            message: body.message,
        });
    }
    Ok(body.data)
}

async fn send_write(req: RequestBuilder, url: &Url) -> Result<SubmitResponse, ClientError> {
    let (transport_status, body) = fetch_envelope(req, url).await?;
    let response = SubmitResponse {
        transport_status,
        body,
    };
    if !response.is_success() {
        tracing::warn!(
            %url,
            status = response.body.status,
            http_status = %response.transport_status,
            body = ?response.body,
            "backend rejected write"
        );
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    use super::*;

    type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn spawn_backend(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn auth_header(headers: &HeaderMap) -> Option<String> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    async fn create(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
        let status = if auth_header(&headers).is_some() { 200 } else { 401 };
        seen.lock().unwrap().push((auth_header(&headers), body));
        Json(json!({"status": status, "message": "ok", "data": 41}))
    }

    async fn update(
        State(seen): State<Seen>,
        Path(id): Path<i64>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        seen.lock().unwrap().push((auth_header(&headers), json!({"id": id, "body": body})));
        Json(json!({"status": 400, "message": "validation error", "data": null}))
    }

    async fn single(Path(id): Path<i64>) -> Json<Value> {
        if id == 1 {
            Json(json!({"status": 200, "message": "ok", "data": {
                "Id": 1, "Title": "A", "Content": "{\"blocks\":[]}", "Likes": 2, "IsPublished": false
            }}))
        } else {
            Json(json!({"status": 404, "message": "post not found", "data": null}))
        }
    }

    async fn fixture() -> (BackendClient, Seen) {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route("/posts", post(create).get(|| async { Json(json!({"status": 200, "message": "ok", "data": null})) }))
            .route("/posts/{id}", get(single).put(update))
            .route(
                "/users/me/posts",
                get(|headers: HeaderMap| async move {
                    let data = if auth_header(&headers).as_deref() == Some("tok") {
                        json!([{"Id": 3, "Title": "mine", "Content": "{}", "IsPublished": false}])
                    } else {
                        Value::Null
                    };
                    Json(json!({"status": 200, "message": "ok", "data": data}))
                }),
            )
            .route(
                "/posts/published",
                get(|| async {
                    Json(json!({"status": 200, "message": "ok", "data": [
                        {"Id": 5, "Title": "five", "Content": "{}", "Likes": 1, "IsPublished": true},
                        {"Id": 8, "Title": "eight", "Content": "{}", "Likes": 0, "IsPublished": true}
                    ]}))
                }),
            )
            .route(
                "/posts/me/likes",
                get(|headers: HeaderMap| async move {
                    let data = match auth_header(&headers).as_deref() {
                        Some("tok") => json!(7),
                        _ => Value::Null,
                    };
                    Json(json!({"status": 200, "message": "ok", "data": data}))
                }),
            )
            .with_state(seen.clone());
        let base = spawn_backend(router).await;
        (BackendClient::new(base), seen)
    }

    #[tokio::test]
    async fn submit_sends_exact_body_and_raw_token() {
        let (client, seen) = fixture().await;
        let authed = client.authenticated(AuthToken::new("eyJhbGciOi.token"));
        let content = r#"{"blocks":[{"type":"paragraph","data":{"text":"x"}}]}"#.to_string();

        let resp = authed.submit("test", content.clone(), true).await.unwrap();

        assert!(resp.is_success());
        assert_eq!(resp.post_id(), Some(41));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.as_deref(), Some("eyJhbGciOi.token"));
        assert_eq!(
            seen[0].1,
            json!({"title": "test", "is_published": true, "content": content})
        );
    }

    #[tokio::test]
    async fn rejected_write_is_returned_not_raised() {
        let (client, seen) = fixture().await;
        let authed = client.authenticated(AuthToken::new("tok"));
        let update = UpdatePost {
            title: String::new(),
            content: "{}".into(),
            is_published: false,
        };

        let resp = authed.update_post(9, &update).await.unwrap();

        assert!(!resp.is_success());
        assert_eq!(resp.transport_status, StatusCode::OK);
        assert_eq!(resp.body.message, "validation error");
        assert_eq!(seen.lock().unwrap()[0].1["id"], 9);
    }

    #[tokio::test]
    async fn get_post_unwraps_envelope() {
        let (client, _) = fixture().await;
        let post = client.get_post(1).await.unwrap();
        assert_eq!(post.title, "A");
        assert!(post.is_draft());
    }

    #[tokio::test]
    async fn get_post_surfaces_backend_error() {
        let (client, _) = fixture().await;
        let err = client.get_post(2).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, .. }));
        assert_eq!(err.to_string(), "backend replied 404: post not found");
    }

    #[tokio::test]
    async fn null_list_is_empty() {
        let (client, _) = fixture().await;
        assert!(client.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn my_posts_carries_token() {
        let (client, _) = fixture().await;
        let mine = client.authenticated(AuthToken::new("tok")).my_posts().await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, 3);
    }

    #[tokio::test]
    async fn published_list_keeps_backend_order() {
        let (client, _) = fixture().await;
        let posts = client.list_published().await.unwrap();
        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![5, 8]);
        assert!(posts.iter().all(|p| p.is_published));
    }

    #[tokio::test]
    async fn total_likes_reads_count() {
        let (client, _) = fixture().await;
        let likes = client.authenticated(AuthToken::new("tok")).total_likes().await.unwrap();
        assert_eq!(likes, 7);
    }

    #[tokio::test]
    async fn null_likes_is_zero() {
        let (client, _) = fixture().await;
        let likes = client.authenticated(AuthToken::new("other")).total_likes().await.unwrap();
        assert_eq!(likes, 0);
    }

    #[tokio::test]
    async fn unreachable_backend_is_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = BackendClient::new(Url::parse(&format!("http://{addr}/")).unwrap());
        let err = client.get_post(1).await.unwrap_err();
        assert!(matches!(err, ClientError::Request { .. }));
    }

    #[test]
    fn token_debug_is_redacted() {
        assert_eq!(format!("{:?}", AuthToken::new("secret")), "AuthToken(..)");
    }
}
