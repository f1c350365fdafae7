use serde::{Deserialize, Serialize};

use crate::document::{self, BlockDocument};
use crate::error::ParseError;

/// A post as the backend returns it. Field names are PascalCase on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub title: String,
    /// Serialized [`BlockDocument`].
    pub content: String,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Post {
    pub fn is_draft(&self) -> bool {
        !self.is_published
    }

    pub fn document(&self) -> Result<BlockDocument, ParseError> {
        document::deserialize(&self.content)
    }
}

/// Envelope wrapping every backend reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Application-level success, as reported in the body.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Body of `POST /posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub is_published: bool,
    pub content: String,
}

/// Body of `PUT /posts/{id}`. Empty title or content leaves the stored value
/// untouched on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePost {
    pub title: String,
    pub content: String,
    pub is_published: bool,
}
