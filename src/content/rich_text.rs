//! Structured text (the repository's rich-text format) and its HTML serializer

use serde::{Deserialize, Serialize};

use crate::helpers::html_escape;

/// One block of structured text: a paragraph, heading, list item, image, ...
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredText {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<serde_json::Value>,
}

impl StructuredText {
    /// A plain paragraph block
    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: "paragraph".to_string(),
            text: text.to_string(),
            ..Self::default()
        }
    }
}

/// Inline formatting over a UTF-16 range of the block text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

/// Extra span payload (hyperlink target, label name)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Converts structured text into sanitized HTML
pub trait RichTextConverter: Send + Sync {
    fn convert(&self, blocks: &[StructuredText]) -> String;
}

/// Default serializer producing the same markup the repository's own
/// helpers emit, with every text and attribute value escaped
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSerializer;

impl RichTextConverter for HtmlSerializer {
    fn convert(&self, blocks: &[StructuredText]) -> String {
        let mut html = String::new();
        let mut open_list: Option<&'static str> = None;

        for block in blocks {
            let list_tag = match block.kind.as_str() {
                "list-item" => Some("ul"),
                "o-list-item" => Some("ol"),
                _ => None,
            };

            if open_list != list_tag {
                if let Some(tag) = open_list {
                    html.push_str(&format!("</{}>", tag));
                }
                if let Some(tag) = list_tag {
                    html.push_str(&format!("<{}>", tag));
                }
                open_list = list_tag;
            }

            html.push_str(&serialize_block(block));
        }

        if let Some(tag) = open_list {
            html.push_str(&format!("</{}>", tag));
        }

        html
    }
}

fn serialize_block(block: &StructuredText) -> String {
    match block.kind.as_str() {
        kind @ ("heading1" | "heading2" | "heading3" | "heading4" | "heading5" | "heading6") => {
            let level = &kind["heading".len()..];
            format!("<h{0}>{1}</h{0}>", level, serialize_spans(block))
        }
        "paragraph" => format!("<p>{}</p>", serialize_spans(block)),
        "preformatted" => format!("<pre>{}</pre>", serialize_spans(block)),
        "list-item" | "o-list-item" => format!("<li>{}</li>", serialize_spans(block)),
        "image" => match block.url.as_deref().filter(|u| is_safe_url(u)) {
            Some(url) => format!(
                r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                html_escape(url),
                html_escape(block.alt.as_deref().unwrap_or(""))
            ),
            None => String::new(),
        },
        "embed" => serialize_embed(block),
        other => {
            tracing::debug!("Skipping unsupported rich text block: {}", other);
            String::new()
        }
    }
}

fn serialize_embed(block: &StructuredText) -> String {
    let Some(oembed) = block.oembed.as_ref() else {
        return String::new();
    };
    let field = |name: &str| oembed.get(name).and_then(|v| v.as_str()).unwrap_or("");

    let url = field("embed_url");
    if !is_safe_url(url) {
        return String::new();
    }
    let title = match field("title") {
        "" => url,
        title => title,
    };
    format!(
        r#"<div data-oembed="{0}" data-oembed-type="{1}" data-oembed-provider="{2}"><a href="{0}">{3}</a></div>"#,
        html_escape(url),
        html_escape(field("type")),
        html_escape(field("provider_name")),
        html_escape(title)
    )
}

/// Only web, mail and relative links survive sanitization
fn is_safe_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return false;
    }
    if lower.starts_with('/') || lower.starts_with('#') {
        return true;
    }
    ["http://", "https://", "mailto:", "tel:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

fn open_tag(span: &Span) -> Option<String> {
    match span.kind.as_str() {
        "strong" => Some("<strong>".to_string()),
        "em" => Some("<em>".to_string()),
        "hyperlink" => {
            let data = span.data.as_ref()?;
            let url = data.url.as_deref().filter(|u| is_safe_url(u))?;
            let target = match data.target.as_deref() {
                Some(target) => format!(
                    r#" target="{}" rel="noopener noreferrer""#,
                    html_escape(target)
                ),
                None => String::new(),
            };
            Some(format!(r#"<a href="{}"{}>"#, html_escape(url), target))
        }
        "label" => {
            let label = span
                .data
                .as_ref()
                .and_then(|d| d.label.as_deref())
                .unwrap_or("");
            Some(format!(r#"<span class="{}">"#, html_escape(label)))
        }
        _ => None,
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        "hyperlink" => "</a>",
        "label" => "</span>",
        _ => "",
    }
}

/// Byte offset of every UTF-16 position in `text` (index = UTF-16 offset)
fn utf16_boundaries(text: &str) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(text.len() + 1);
    for (byte, ch) in text.char_indices() {
        for _ in 0..ch.len_utf16() {
            offsets.push(byte);
        }
    }
    offsets.push(text.len());
    offsets
}

fn escape_text(text: &str) -> String {
    html_escape(text).replace('\n', "<br />")
}

/// Render the block text with its spans, keeping tags properly nested
fn serialize_spans(block: &StructuredText) -> String {
    let text = &block.text;
    let offsets = utf16_boundaries(text);
    let len16 = offsets.len() - 1;

    // Spans that render to a tag, clamped to the text
    let spans: Vec<(usize, usize, &Span, String)> = block
        .spans
        .iter()
        .filter_map(|span| {
            let start = span.start.min(len16);
            let end = span.end.min(len16);
            if start >= end {
                return None;
            }
            open_tag(span).map(|tag| (start, end, span, tag))
        })
        .collect();

    if spans.is_empty() {
        return escape_text(text);
    }

    let mut cuts: Vec<usize> = vec![0, len16];
    for (start, end, _, _) in &spans {
        cuts.push(*start);
        cuts.push(*end);
    }
    cuts.sort_unstable();
    cuts.dedup();

    // Outer spans first: earlier start, then longer range
    let mut order: Vec<usize> = (0..spans.len()).collect();
    order.sort_by(|&a, &b| spans[a].0.cmp(&spans[b].0).then(spans[b].1.cmp(&spans[a].1)));

    let mut html = String::new();
    let mut stack: Vec<usize> = Vec::new();

    for window in cuts.windows(2) {
        let (from, to) = (window[0], window[1]);
        let active: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&i| spans[i].0 <= from && spans[i].1 >= to)
            .collect();

        let common = stack
            .iter()
            .zip(active.iter())
            .take_while(|(a, b)| a == b)
            .count();
        while stack.len() > common {
            if let Some(i) = stack.pop() {
                html.push_str(close_tag(spans[i].2));
            }
        }
        for &i in &active[common..] {
            html.push_str(&spans[i].3);
            stack.push(i);
        }

        html.push_str(&escape_text(&text[offsets[from]..offsets[to]]));
    }

    while let Some(i) = stack.pop() {
        html.push_str(close_tag(spans[i].2));
    }

    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(kind: &str, text: &str, spans: Vec<Span>) -> StructuredText {
        StructuredText {
            kind: kind.to_string(),
            text: text.to_string(),
            spans,
            ..StructuredText::default()
        }
    }

    fn span(kind: &str, start: usize, end: usize) -> Span {
        Span {
            start,
            end,
            kind: kind.to_string(),
            data: None,
        }
    }

    fn link(start: usize, end: usize, url: &str) -> Span {
        Span {
            start,
            end,
            kind: "hyperlink".to_string(),
            data: Some(SpanData {
                url: Some(url.to_string()),
                ..SpanData::default()
            }),
        }
    }

    #[test]
    fn test_paragraph_and_heading() {
        let html = HtmlSerializer.convert(&[
            block("heading2", "Title", vec![]),
            StructuredText::paragraph("Body"),
        ]);
        assert_eq!(html, "<h2>Title</h2><p>Body</p>");
    }

    #[test]
    fn test_escapes_text() {
        let html = HtmlSerializer.convert(&[StructuredText::paragraph("<script>x</script> & co")]);
        assert_eq!(html, "<p>&lt;script&gt;x&lt;/script&gt; &amp; co</p>");
    }

    #[test]
    fn test_newline_becomes_break() {
        let html = HtmlSerializer.convert(&[StructuredText::paragraph("a\nb")]);
        assert_eq!(html, "<p>a<br />b</p>");
    }

    #[test]
    fn test_spans() {
        let html = HtmlSerializer.convert(&[block(
            "paragraph",
            "Hello bold world",
            vec![span("strong", 6, 10)],
        )]);
        assert_eq!(html, "<p>Hello <strong>bold</strong> world</p>");
    }

    #[test]
    fn test_overlapping_spans_stay_nested() {
        let html = HtmlSerializer.convert(&[block(
            "paragraph",
            "abcdef",
            vec![span("strong", 0, 4), span("em", 2, 6)],
        )]);
        assert_eq!(
            html,
            "<p><strong>ab<em>cd</em></strong><em>ef</em></p>"
        );
    }

    #[test]
    fn test_utf16_offsets() {
        // "é" is one UTF-16 unit, the emoji is two
        let html = HtmlSerializer.convert(&[block(
            "paragraph",
            "é 🚀 go",
            vec![span("em", 5, 7)],
        )]);
        assert_eq!(html, "<p>é 🚀 <em>go</em></p>");
    }

    #[test]
    fn test_hyperlink_sanitized() {
        let html = HtmlSerializer.convert(&[block(
            "paragraph",
            "safe bad",
            vec![link(0, 4, "https://a.io?x=1&y=2"), link(5, 8, "javascript:alert(1)")],
        )]);
        assert_eq!(html, r#"<p><a href="https://a.io?x=1&amp;y=2">safe</a> bad</p>"#);
    }

    #[test]
    fn test_hyperlink_target() {
        let mut l = link(0, 4, "https://a.io");
        if let Some(data) = l.data.as_mut() {
            data.target = Some("_blank".to_string());
        }
        let html = HtmlSerializer.convert(&[block("paragraph", "site", vec![l])]);
        assert!(html.contains(r#"target="_blank" rel="noopener noreferrer""#));
    }

    #[test]
    fn test_list_grouping() {
        let html = HtmlSerializer.convert(&[
            block("list-item", "a", vec![]),
            block("list-item", "b", vec![]),
            block("o-list-item", "c", vec![]),
            StructuredText::paragraph("d"),
        ]);
        assert_eq!(
            html,
            "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol><p>d</p>"
        );
    }

    #[test]
    fn test_image_and_unknown_blocks() {
        let image = StructuredText {
            kind: "image".to_string(),
            url: Some("https://images.io/a.png".to_string()),
            alt: Some("a \"quote\"".to_string()),
            ..StructuredText::default()
        };
        let html = HtmlSerializer.convert(&[image, block("mystery", "x", vec![])]);
        assert_eq!(
            html,
            r#"<p class="block-img"><img src="https://images.io/a.png" alt="a &quot;quote&quot;" /></p>"#
        );
    }

    #[test]
    fn test_embed_renders_link() {
        let embed = StructuredText {
            kind: "embed".to_string(),
            oembed: Some(serde_json::json!({
                "embed_url": "https://www.youtube.com/watch?v=1",
                "type": "video",
                "provider_name": "YouTube",
                "html": "<iframe src=\"x\"></iframe>"
            })),
            ..StructuredText::default()
        };
        let html = HtmlSerializer.convert(&[embed]);
        assert!(html.contains(r#"data-oembed-provider="YouTube""#));
        assert!(!html.contains("<iframe"));
    }

    #[test]
    fn test_block_order_preserved() {
        let blocks: Vec<StructuredText> = (0..6)
            .map(|i| StructuredText::paragraph(&format!("segment-{}", i)))
            .collect();
        let html = HtmlSerializer.convert(&blocks);

        let positions: Vec<usize> = (0..6)
            .map(|i| html.find(&format!("segment-{}", i)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_deserialize_block() {
        let json = r#"{
            "type": "paragraph",
            "text": "Read the docs",
            "spans": [{"start": 9, "end": 13, "type": "hyperlink",
                       "data": {"link_type": "Web", "url": "https://docs.rs"}}]
        }"#;
        let block: StructuredText = serde_json::from_str(json).unwrap();
        assert_eq!(block.spans.len(), 1);
        assert_eq!(
            HtmlSerializer.convert(&[block]),
            r#"<p>Read the <a href="https://docs.rs">docs</a></p>"#
        );
    }
}
