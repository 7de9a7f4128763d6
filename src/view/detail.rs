//! Detail view: one post with its estimated reading time

use serde::Serialize;

use crate::content::{ContentBlock, Document, PostDocument, RichTextConverter};
use crate::error::Result;

/// Assumed reading speed
pub const WORDS_PER_MINUTE: usize = 200;

/// A post ready to render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub post: PostDocument,
    pub estimated_read_minutes: usize,
}

impl PostView {
    /// Map a repository document, estimating reading time at `words_per_minute`
    pub fn from_document(doc: Document, words_per_minute: usize) -> Result<Self> {
        let post = PostDocument::try_from(doc)?;
        let estimated_read_minutes = estimate_read_minutes(&post.content, words_per_minute);
        Ok(Self {
            post,
            estimated_read_minutes,
        })
    }

    /// Each block's heading with its body converted to HTML, in order
    pub fn rendered_blocks(&self, converter: &dyn RichTextConverter) -> Vec<RenderedBlock> {
        self.post
            .content
            .iter()
            .map(|block| RenderedBlock {
                heading: block.heading.clone(),
                html: converter.convert(&block.body),
            })
            .collect()
    }
}

/// A content block after rich-text conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedBlock {
    pub heading: String,
    pub html: String,
}

/// Words in a block: the heading plus the body segments joined without a
/// separator, so words touching at a segment boundary count once
pub fn count_block_words(block: &ContentBlock) -> usize {
    let body: String = block.body.iter().map(|segment| segment.text.as_str()).collect();
    block.heading.split_whitespace().count() + body.split_whitespace().count()
}

/// Whole minutes needed to read `blocks`, rounded up
pub fn estimate_read_minutes(blocks: &[ContentBlock], words_per_minute: usize) -> usize {
    let words: usize = blocks.iter().map(count_block_words).sum();
    words.div_ceil(words_per_minute.max(1))
}

/// Client-observable state of a detail page
#[derive(Debug, Clone, PartialEq)]
pub enum DetailPage {
    /// Placeholder while a page not generated at build time is produced
    Fallback,
    /// Loaded and rendered
    Ready(Box<PostView>),
}

impl DetailPage {
    pub fn is_fallback(&self) -> bool {
        matches!(self, DetailPage::Fallback)
    }

    /// Move to `Ready`. A page that is already ready keeps its content.
    pub fn resolve(self, view: PostView) -> DetailPage {
        match self {
            DetailPage::Fallback => DetailPage::Ready(Box::new(view)),
            ready @ DetailPage::Ready(_) => ready,
        }
    }
}
