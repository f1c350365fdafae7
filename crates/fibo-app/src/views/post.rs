//! Single post page.

use fibo_common::{ClientError, Post};
use markdown_weaver_escape::escape_html;

use crate::fetch::CachedFetcher;

/// Display state of the post page. Starts in `Loading` and settles exactly
/// once into `Error` or `Ready`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PostView {
    #[default]
    Loading,
    /// Message shown to the reader.
    Error(String),
    /// Rendered post body.
    Ready(String),
}

impl PostView {
    pub fn new() -> Self {
        Self::Loading
    }

    /// Fetch post `id` and settle into a terminal state.
    pub async fn load(fetcher: &CachedFetcher, id: i64) -> Self {
        let fetched = fetcher.get_post(id).await;
        let view = Self::new().settle(fetched.as_deref());
        match &view {
            PostView::Ready(_) => tracing::info!(id, "post ready"),
            PostView::Error(message) => tracing::warn!(id, %message, "post failed to load"),
            PostView::Loading => {}
        }
        view
    }

    /// Apply the outcome of the fetch. Terminal states ignore further outcomes.
    pub fn settle(self, fetched: Result<&Post, &ClientError>) -> Self {
        if self.is_terminal() {
            return self;
        }
        match fetched {
            Err(e) => PostView::Error(e.to_string()),
            Ok(post) => match fibo_renderer::render_content(&post.content) {
                Ok(html) => PostView::Ready(html),
                Err(e) => PostView::Error(e.to_string()),
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PostView::Loading)
    }

    /// Page markup for the current state.
    pub fn html(&self) -> String {
        match self {
            PostView::Loading => "<div class=\"loader\" role=\"status\">Loading...</div>\n".to_string(),
            PostView::Error(message) => {
                let mut html = String::from("<p>Error: ");
                let _ = escape_html(&mut html, message);
                html.push_str("</p>\n");
                html
            }
            PostView::Ready(body) => format!(
                "<div class=\"post-page\"><div class=\"post-content\">\n{}</div></div>\n",
                body
            ),
        }
    }
}
