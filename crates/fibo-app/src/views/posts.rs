//! Post lists: drafts and published posts.

use std::fmt::Write;

use fibo_common::Post;
use markdown_weaver_escape::escape_html;

/// Characters of body text shown on a card.
const EXCERPT_CHARS: usize = 140;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    /// Open the post in the editor.
    Edit,
    /// Open the read-only post page.
    View,
}

/// Summary of one post in a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub id: i64,
    pub title: String,
    pub likes: i64,
    pub excerpt: String,
    pub action: CardAction,
}

impl PostCard {
    pub fn new(post: &Post, action: CardAction) -> Self {
        let excerpt = match post.document() {
            Ok(doc) => doc.excerpt(EXCERPT_CHARS),
            Err(e) => {
                tracing::debug!(id = post.id, error = %e, "no excerpt for post");
                String::new()
            }
        };
        Self {
            id: post.id,
            title: post.title.clone(),
            likes: post.likes,
            excerpt,
            action,
        }
    }

    pub fn href(&self) -> String {
        match self.action {
            CardAction::Edit => format!("/user/write/{}", self.id),
            CardAction::View => format!("/posts/{}", self.id),
        }
    }

    pub fn html(&self) -> String {
        let mut html = String::new();
        let _ = write!(html, "<article class=\"post-card\" data-id=\"{}\"><h3>", self.id);
        let _ = escape_html(&mut html, &self.title);
        html.push_str("</h3>");
        if !self.excerpt.is_empty() {
            html.push_str("<p class=\"excerpt\">");
            let _ = escape_html(&mut html, &self.excerpt);
            html.push_str("</p>");
        }
        let label = match self.action {
            CardAction::Edit => "Edit",
            CardAction::View => "Read",
        };
        let _ = write!(
            html,
            "<span class=\"likes\">{} likes</span><a href=\"{}\">{}</a></article>\n",
            self.likes,
            self.href(),
            label
        );
        html
    }
}

/// Cards for the posts matching `keep`, in their original order.
pub fn cards_where(
    posts: &[Post],
    action: CardAction,
    keep: impl Fn(&Post) -> bool,
) -> Vec<PostCard> {
    posts
        .iter()
        .filter(|&post| keep(post))
        .map(|post| PostCard::new(post, action))
        .collect()
}

/// Unpublished posts, each with an edit link.
pub fn drafts(posts: &[Post]) -> Vec<PostCard> {
    cards_where(posts, CardAction::Edit, Post::is_draft)
}

/// Published posts, each with a read link.
pub fn published(posts: &[Post]) -> Vec<PostCard> {
    cards_where(posts, CardAction::View, |post| post.is_published)
}

pub fn render_cards(cards: &[PostCard]) -> String {
    let mut html = String::from("<div class=\"post-list\">\n");
    for card in cards {
        html.push_str(&card.html());
    }
    html.push_str("</div>\n");
    html
}
