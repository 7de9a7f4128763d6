//! Post view models built from repository documents

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::document::{ContentSlice, Document};
use super::rich_text::StructuredText;
use crate::error::{ContentError, Result};
use crate::helpers::is_url_safe_slug;

/// A post as shown in the list page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    /// URL-safe unique identifier
    pub uid: String,
    pub first_publication_date: Option<DateTime<FixedOffset>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl TryFrom<Document> for PostSummary {
    type Error = ContentError;

    fn try_from(doc: Document) -> Result<Self> {
        let uid = checked_uid(&doc)?;
        Ok(Self {
            uid,
            first_publication_date: doc.first_publication_date,
            title: doc.data.title,
            subtitle: doc.data.subtitle,
            author: doc.data.author,
        })
    }
}

/// A full post as shown in its detail page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDocument {
    pub uid: String,
    pub first_publication_date: Option<DateTime<FixedOffset>>,
    pub title: String,
    pub author: String,
    pub banner_url: Option<String>,
    /// In the order the repository declares them
    pub content: Vec<ContentBlock>,
}

impl TryFrom<Document> for PostDocument {
    type Error = ContentError;

    fn try_from(doc: Document) -> Result<Self> {
        let uid = checked_uid(&doc)?;
        Ok(Self {
            uid,
            first_publication_date: doc.first_publication_date,
            title: doc.data.title,
            author: doc.data.author,
            banner_url: doc.data.banner.url.filter(|u| !u.is_empty()),
            content: doc.data.content.into_iter().map(ContentBlock::from).collect(),
        })
    }
}

/// A headed section of a post body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: Vec<StructuredText>,
}

impl From<ContentSlice> for ContentBlock {
    fn from(slice: ContentSlice) -> Self {
        Self {
            heading: slice.heading,
            body: slice.body,
        }
    }
}

fn checked_uid(doc: &Document) -> Result<String> {
    match doc.uid.as_deref() {
        Some(uid) if is_url_safe_slug(uid) => Ok(uid.to_string()),
        Some(uid) => Err(ContentError::InvalidResponse(format!(
            "document {} has a uid that is not URL-safe: {:?}",
            doc.id, uid
        ))),
        None => Err(ContentError::InvalidResponse(format!(
            "document {} has no uid",
            doc.id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::document::PostData;

    fn document(uid: Option<&str>) -> Document {
        Document {
            id: "YF8s".to_string(),
            uid: uid.map(str::to_string),
            content_type: "posts".to_string(),
            first_publication_date: None,
            last_publication_date: None,
            data: PostData {
                title: "Como utilizar Hooks".to_string(),
                subtitle: "Pensando em sincronização".to_string(),
                author: "Joseph Oliveira".to_string(),
                content: vec![
                    ContentSlice {
                        heading: "First".to_string(),
                        body: vec![],
                    },
                    ContentSlice {
                        heading: "Second".to_string(),
                        body: vec![],
                    },
                ],
                ..PostData::default()
            },
        }
    }

    #[test]
    fn test_summary_from_document() {
        let summary = PostSummary::try_from(document(Some("como-utilizar-hooks"))).unwrap();
        assert_eq!(summary.uid, "como-utilizar-hooks");
        assert_eq!(summary.author, "Joseph Oliveira");
    }

    #[test]
    fn test_document_keeps_block_order() {
        let post = PostDocument::try_from(document(Some("hooks"))).unwrap();
        let headings: Vec<_> = post.content.iter().map(|b| b.heading.as_str()).collect();
        assert_eq!(headings, ["First", "Second"]);
        assert!(post.banner_url.is_none());
    }

    #[test]
    fn test_missing_or_unsafe_uid_rejected() {
        assert!(matches!(
            PostSummary::try_from(document(None)),
            Err(ContentError::InvalidResponse(_))
        ));
        assert!(PostSummary::try_from(document(Some("../x"))).is_err());
    }
}
