//! Shared pieces of the fibo blog client: the post model, the editor's block
//! document and its codec, and the HTTP client for the blog API.

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod post;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use crate::client::{AuthToken, AuthedClient, BackendClient, SubmitResponse};
pub use crate::config::Config;
pub use crate::document::{Block, BlockDocument, BlockKind};
pub use crate::error::{ClientError, ConfigError, FiboError, ParseError, SerDeError};
pub use crate::post::{ApiResponse, NewPost, Post, UpdatePost};
