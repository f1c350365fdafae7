//! fibo renderer
//!
//! Turns stored post content (a serialized block document) into HTML for the
//! read-only post page. Block text is trusted: inline markup written by the
//! author passes through unescaped.

pub mod editorjs;

pub use editorjs::{render_block, render_content, render_document};
