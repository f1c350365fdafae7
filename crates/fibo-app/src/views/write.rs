//! Authoring page state and the save action.

use std::time::{SystemTime, UNIX_EPOCH};

use fibo_common::document::{self, Block, BlockDocument};
use fibo_common::{AuthedClient, FiboError, ParseError, Post, SubmitResponse, UpdatePost};

/// Where the page goes after a successful save.
pub const HOME: &str = "/";

const DEFAULT_TITLE: &str = "Untitled";

/// Local form state of the write page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteForm {
    pub title: String,
    pub is_published: bool,
    pub document: BlockDocument,
    /// Set when editing an existing post instead of creating one.
    pub editing: Option<i64>,
}

#[derive(Debug)]
pub enum SaveOutcome {
    /// Saved; leave the page.
    Navigate(&'static str),
    /// The backend declined; stay on the page with the form intact.
    Stay(SubmitResponse),
}

impl Default for WriteForm {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteForm {
    /// A fresh form holding the editor's starter document.
    pub fn new() -> Self {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|d| i64::try_from(d.as_millis()).ok());
        Self {
            title: DEFAULT_TITLE.to_string(),
            is_published: false,
            document: BlockDocument {
                time,
                blocks: vec![Block::header("This is my awesome editor!", 1)],
                version: None,
            },
            editing: None,
        }
    }

    /// Load an existing post into the form for editing.
    pub fn edit(post: &Post) -> Result<Self, ParseError> {
        Ok(Self {
            title: post.title.clone(),
            is_published: post.is_published,
            document: post.document()?,
            editing: Some(post.id),
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_document(mut self, document: BlockDocument) -> Self {
        self.document = document;
        self
    }

    pub fn publish(mut self, is_published: bool) -> Self {
        self.is_published = is_published;
        self
    }

    /// Serialize the document and send it. Creates a post, or updates the
    /// one being edited.
    pub async fn save(&self, client: &AuthedClient) -> Result<SaveOutcome, FiboError> {
        let content = document::serialize(&self.document)?;
        let response = match self.editing {
            None => {
                client
                    .submit(self.title.clone(), content, self.is_published)
                    .await?
            }
            Some(id) => {
                let update = UpdatePost {
                    title: self.title.clone(),
                    content,
                    is_published: self.is_published,
                };
                client.update_post(id, &update).await?
            }
        };

        if response.is_success() {
            tracing::info!(
                editing = ?self.editing,
                created = ?response.post_id(),
                published = self.is_published,
                "post saved"
            );
            Ok(SaveOutcome::Navigate(HOME))
        } else {
            Ok(SaveOutcome::Stay(response))
        }
    }
}
