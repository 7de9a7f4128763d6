//! Content module - repository documents, post view models and rich text

mod document;
mod post;
pub mod rich_text;

pub use document::{
    parse_api_date, ApiPage, Banner, ContentSlice, Document, PostData, Repository, RepositoryRef,
};
pub use post::{ContentBlock, PostDocument, PostSummary};
pub use rich_text::{HtmlSerializer, RichTextConverter, StructuredText};
