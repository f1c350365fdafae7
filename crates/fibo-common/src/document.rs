//! Block documents as produced by the post editor, and their JSON codec.
//!
//! A post's `content` is the whole document serialized as a JSON string:
//!
//! ```json
//! { "time": 1700000000000,
//!   "blocks": [ { "id": "x1", "type": "header", "data": { "text": "Hi", "level": 1 } } ],
//!   "version": "2.28.2" }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, SerDeError};

/// Name used for the source in parse diagnostics.
const CONTENT_SOURCE_NAME: &str = "post content";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDocument {
    /// Editor save time, milliseconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub kind: BlockKind,
}

/// Every block type the editor is configured with. Anything else fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum BlockKind {
    Header(Header),
    Paragraph(Paragraph),
    List(List),
    Quote(Quote),
    Code(Code),
    Delimiter(Delimiter),
    Image(Image),
    Embed(Embed),
    Raw(Raw),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub text: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Ordered,
    #[default]
    Unordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    #[serde(default)]
    pub style: ListStyle,
    pub items: Vec<ListItem>,
}

/// Older editor versions save list items as bare strings, newer ones as
/// objects with nested children. Item `meta` is ignored, and checklist
/// lists are rejected by [`ListStyle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListItem {
    Text(String),
    Nested {
        content: String,
        #[serde(default)]
        items: Vec<ListItem>,
    },
}

impl ListItem {
    pub fn content(&self) -> &str {
        match self {
            ListItem::Text(text) => text,
            ListItem::Nested { content, .. } => content,
        }
    }

    pub fn children(&self) -> &[ListItem] {
        match self {
            ListItem::Text(_) => &[],
            ListItem::Nested { items, .. } => items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    pub code: String,
}

/// Horizontal separator; the editor saves it with empty data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiter {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub file: ImageFile,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub with_border: bool,
    #[serde(default)]
    pub stretched: bool,
    #[serde(default)]
    pub with_background: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Provider name, e.g. `youtube`.
    pub service: String,
    /// Original URL the author pasted.
    pub source: String,
    /// URL suitable for an iframe.
    pub embed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raw {
    pub html: String,
}

impl Block {
    pub fn new(kind: BlockKind) -> Self {
        Self { id: None, kind }
    }

    pub fn header(text: impl Into<String>, level: u8) -> Self {
        Self::new(BlockKind::Header(Header {
            text: text.into(),
            level,
        }))
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph(Paragraph { text: text.into() }))
    }

    /// The block's `type` tag as written on the wire.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            BlockKind::Header(_) => "header",
            BlockKind::Paragraph(_) => "paragraph",
            BlockKind::List(_) => "list",
            BlockKind::Quote(_) => "quote",
            BlockKind::Code(_) => "code",
            BlockKind::Delimiter(_) => "delimiter",
            BlockKind::Image(_) => "image",
            BlockKind::Embed(_) => "embed",
            BlockKind::Raw(_) => "raw",
        }
    }
}

impl BlockDocument {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            time: None,
            blocks,
            version: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// First `max_chars` characters of readable text, inline markup removed.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            let text = match &block.kind {
                BlockKind::Paragraph(p) => p.text.as_str(),
                BlockKind::Quote(q) => q.text.as_str(),
                _ => continue,
            };
            if !out.is_empty() {
                out.push(' ');
            }
            push_without_tags(&mut out, text);
            if out.chars().count() >= max_chars {
                break;
            }
        }
        if out.chars().count() > max_chars {
            let mut cut: String = out.chars().take(max_chars).collect();
            cut.push('…');
            cut
        } else {
            out
        }
    }
}

fn push_without_tags(out: &mut String, text: &str) {
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
}

/// Encode a document as the JSON string stored in a post's `content`.
pub fn serialize(document: &BlockDocument) -> Result<String, SerDeError> {
    Ok(serde_json::to_string(document)?)
}

/// Parse a post's `content` back into a document.
pub fn deserialize(content: &str) -> Result<BlockDocument, ParseError> {
    deserialize_named(CONTENT_SOURCE_NAME, content)
}

/// Like [`deserialize`], naming the source (e.g. a file path) in diagnostics.
pub fn deserialize_named(name: &str, content: &str) -> Result<BlockDocument, ParseError> {
    serde_json::from_str(content).map_err(|e| ParseError::new(name, content, e))
}
