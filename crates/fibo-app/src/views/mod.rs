//! Views produce page markup as strings.

pub mod post;
pub mod posts;
pub mod write;

pub use post::PostView;
pub use posts::{CardAction, PostCard, drafts, published, render_cards};
pub use write::{SaveOutcome, WriteForm};
