use std::fmt::Write;

use fibo_common::document::{
    self, Block, BlockDocument, BlockKind, Code, Embed, Header, Image, List, ListItem, ListStyle,
    Quote,
};
use fibo_common::error::ParseError;

/// Parse stored post content and render it.
pub fn render_content(content: &str) -> Result<String, ParseError> {
    let doc = document::deserialize(content)?;
    let html = render_document(&doc);
    tracing::debug!(blocks = doc.blocks.len(), bytes = html.len(), "rendered post content");
    Ok(html)
}

/// Render every block in document order.
pub fn render_document(doc: &BlockDocument) -> String {
    let mut html = String::new();
    for block in &doc.blocks {
        render_block(&mut html, block);
    }
    html
}

pub fn render_block(html: &mut String, block: &Block) {
    match &block.kind {
        BlockKind::Header(header) => {
            render_header_block(html, header);
        }
        BlockKind::Paragraph(paragraph) => {
            html.push_str("<p>");
            html.push_str(&paragraph.text);
            html.push_str("</p>\n");
        }
        BlockKind::List(list) => {
            render_list(html, list);
        }
        BlockKind::Quote(quote) => {
            render_quote_block(html, quote);
        }
        BlockKind::Code(code) => {
            render_code_block(html, code);
        }
        BlockKind::Delimiter(_) => {
            html.push_str("<hr />\n");
        }
        BlockKind::Image(image) => {
            render_image_block(html, image);
        }
        BlockKind::Embed(embed) => {
            render_embed_block(html, embed);
        }
        BlockKind::Raw(raw) => {
            html.push_str(&raw.html);
            html.push('\n');
        }
    }
}

fn render_header_block(html: &mut String, header: &Header) {
    let level = header.level.clamp(1, 6);
    let _ = write!(html, "<h{}>{}</h{}>\n", level, header.text, level);
}

fn list_tag(style: ListStyle) -> &'static str {
    match style {
        ListStyle::Ordered => "ol",
        ListStyle::Unordered => "ul",
    }
}

fn render_list(html: &mut String, list: &List) {
    let tag = list_tag(list.style);
    let _ = write!(html, "<{}>\n", tag);
    for item in &list.items {
        render_list_item(html, item, tag);
    }
    let _ = write!(html, "</{}>\n", tag);
}

fn render_list_item(html: &mut String, item: &ListItem, tag: &str) {
    html.push_str("<li>");
    html.push_str(item.content());

    let children = item.children();
    if !children.is_empty() {
        let _ = write!(html, "\n<{}>\n", tag);
        for child in children {
            render_list_item(html, child, tag);
        }
        let _ = write!(html, "</{}>\n", tag);
    }

    html.push_str("</li>\n");
}

fn render_quote_block(html: &mut String, quote: &Quote) {
    html.push_str("<blockquote");
    if let Some(alignment) = quote.alignment.as_deref().filter(|a| !a.is_empty()) {
        let _ = write!(html, " class=\"align-{}\"", alignment);
    }
    html.push('>');
    html.push_str(&quote.text);
    if !quote.caption.is_empty() {
        html.push_str("<cite>");
        html.push_str(&quote.caption);
        html.push_str("</cite>");
    }
    html.push_str("</blockquote>\n");
}

fn render_code_block(html: &mut String, code: &Code) {
    html.push_str("<pre><code>");
    html.push_str(&code.code);
    html.push_str("</code></pre>\n");
}

fn render_image_block(html: &mut String, image: &Image) {
    let classes: Vec<&str> = [
        (image.with_border, "image-bordered"),
        (image.stretched, "image-stretched"),
        (image.with_background, "image-background"),
    ]
    .into_iter()
    .filter_map(|(set, class)| set.then_some(class))
    .collect();

    html.push_str("<figure");
    if !classes.is_empty() {
        let _ = write!(html, " class=\"{}\"", classes.join(" "));
    }
    let _ = write!(
        html,
        "><img src=\"{}\" alt=\"{}\" />",
        image.file.url, image.caption
    );
    render_caption(html, &image.caption);
    html.push_str("</figure>\n");
}

fn render_embed_block(html: &mut String, embed: &Embed) {
    let _ = write!(
        html,
        "<figure class=\"embed embed-{}\"><iframe src=\"{}\"",
        embed.service, embed.embed
    );
    if let Some(width) = embed.width {
        let _ = write!(html, " width=\"{}\"", width);
    }
    if let Some(height) = embed.height {
        let _ = write!(html, " height=\"{}\"", height);
    }
    html.push_str(" frameborder=\"0\" allowfullscreen></iframe>");
    render_caption(html, &embed.caption);
    html.push_str("</figure>\n");
}

fn render_caption(html: &mut String, caption: &str) {
    if !caption.is_empty() {
        html.push_str("<figcaption>");
        html.push_str(caption);
        html.push_str("</figcaption>");
    }
}
