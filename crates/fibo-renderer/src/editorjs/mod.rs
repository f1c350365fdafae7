mod block_renderer;

pub use block_renderer::{render_block, render_content, render_document};
