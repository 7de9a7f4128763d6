//! Content client adapter
//!
//! [`Client`] exposes the typed read operations the generator needs. The
//! remote boundary itself is the narrow [`ContentApi`] trait, implemented
//! over HTTP by [`PrismicApi`] and by fixture doubles in tests.

mod prismic;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use prismic::{PrismicApi, REPOSITORY_TTL};

use crate::config::ContentApiConfig;
use crate::content::{ApiPage, Document};
use crate::error::{ContentError, Result};
use crate::helpers::is_url_safe_slug;

/// Page size used when walking every document of a type
const LIST_PAGE_SIZE: usize = 100;

/// What a search selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Every document of the content type
    Type,
    /// The document of the content type with this uid
    Uid(String),
}

/// A search against the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub content_type: String,
    pub predicate: Predicate,
    pub page_size: usize,
    /// 1-based
    pub page: u32,
}

impl Query {
    /// First page of documents of `content_type`
    pub fn by_type(content_type: &str, page_size: usize) -> Self {
        Self {
            content_type: content_type.to_string(),
            predicate: Predicate::Type,
            page_size,
            page: 1,
        }
    }

    /// The single document of `content_type` with the given uid
    pub fn by_uid(content_type: &str, uid: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            predicate: Predicate::Uid(uid.to_string()),
            page_size: 1,
            page: 1,
        }
    }
}

/// The remote content API, as seen by this crate
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Run a search and return one page of documents
    async fn query(&self, query: &Query) -> Result<ApiPage>;

    /// Fetch a page from a continuation URL returned by an earlier page
    async fn fetch_page_url(&self, url: &str) -> Result<ApiPage>;
}

/// Read-only client bound to one repository
#[derive(Clone)]
pub struct Client {
    api: Arc<dyn ContentApi>,
}

impl Client {
    /// Create an HTTP client with a custom request timeout
    pub fn with_timeout(config: &ContentApiConfig, timeout: Duration) -> Result<Self> {
        let api = PrismicApi::new(config, timeout)?;
        Ok(Self::from_api(Arc::new(api)))
    }

    /// Wrap any [`ContentApi`] implementation
    pub fn from_api(api: Arc<dyn ContentApi>) -> Self {
        Self { api }
    }

    /// The underlying API, for continuation fetches
    pub fn api(&self) -> Arc<dyn ContentApi> {
        Arc::clone(&self.api)
    }

    /// First page of documents of `content_type`
    pub async fn fetch_page(&self, content_type: &str, page_size: usize) -> Result<ApiPage> {
        self.api
            .query(&Query::by_type(content_type, page_size))
            .await
    }

    /// The document with the given identifier
    pub async fn fetch_by_identifier(&self, content_type: &str, uid: &str) -> Result<Document> {
        let not_found = || ContentError::NotFound(format!("{}/{}", content_type, uid));

        // An unsafe slug cannot name a published post
        if !is_url_safe_slug(uid) {
            return Err(not_found());
        }

        let page = self.api.query(&Query::by_uid(content_type, uid)).await?;
        page.results.into_iter().next().ok_or_else(not_found)
    }

    /// Identifiers of every document of `content_type`, following all pages
    pub async fn list_identifiers(&self, content_type: &str) -> Result<Vec<String>> {
        let mut page = self
            .api
            .query(&Query::by_type(content_type, LIST_PAGE_SIZE))
            .await?;
        let mut identifiers = Vec::new();

        loop {
            for doc in &page.results {
                match doc.uid.as_deref() {
                    Some(uid) if is_url_safe_slug(uid) => identifiers.push(uid.to_string()),
                    Some(uid) => tracing::warn!("Skipping document {} with unsafe uid {:?}", doc.id, uid),
                    None => tracing::warn!("Skipping document {} without uid", doc.id),
                }
            }

            match page.next_page.take() {
                Some(next) => page = self.api.fetch_page_url(&next).await?,
                None => break,
            }
        }

        tracing::debug!("Listed {} {} identifiers", identifiers.len(), content_type);
        Ok(identifiers)
    }
}

/// Fixture doubles for the content API
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::content::PostData;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// A post document with a uid and title
    pub fn doc(uid: &str) -> Document {
        Document {
            id: format!("id-{}", uid),
            uid: Some(uid.to_string()),
            content_type: "posts".to_string(),
            first_publication_date: crate::content::parse_api_date("2021-03-15T19:25:28+0000"),
            last_publication_date: None,
            data: PostData {
                title: format!("Title {}", uid),
                subtitle: format!("Subtitle {}", uid),
                author: "Ana".to_string(),
                ..PostData::default()
            },
        }
    }

    /// A page of documents with an optional cursor
    pub fn page(uids: &[&str], next: Option<&str>) -> ApiPage {
        ApiPage {
            page: 1,
            results_per_page: uids.len() as u32,
            total_results_size: uids.len() as u32,
            total_pages: 1,
            next_page: next.map(str::to_string),
            prev_page: None,
            results: uids.iter().map(|u| doc(u)).collect(),
        }
    }

    /// Serves a fixed first page, cursor pages by URL and documents by uid
    #[derive(Default)]
    pub struct FixtureApi {
        pub first_page: Option<ApiPage>,
        pub cursor_pages: HashMap<String, ApiPage>,
        pub documents: HashMap<String, Document>,
        pub fail_cursors: bool,
        pub requests: Mutex<Vec<String>>,
    }

    impl FixtureApi {
        pub fn with_first_page(page: ApiPage) -> Self {
            Self {
                first_page: Some(page),
                ..Self::default()
            }
        }

        pub fn cursor(mut self, url: &str, page: ApiPage) -> Self {
            self.cursor_pages.insert(url.to_string(), page);
            self
        }

        pub fn document(mut self, doc: Document) -> Self {
            let uid = doc.uid.clone().unwrap_or_default();
            self.documents.insert(uid, doc);
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContentApi for FixtureApi {
        async fn query(&self, query: &Query) -> Result<ApiPage> {
            self.requests
                .lock()
                .unwrap()
                .push(format!("query:{:?}", query.predicate));
            if query.content_type != "posts" {
                return Err(ContentError::NotFound(query.content_type.clone()));
            }
            match &query.predicate {
                Predicate::Type => self
                    .first_page
                    .clone()
                    .ok_or_else(|| ContentError::RemoteUnavailable("no fixture".into())),
                Predicate::Uid(uid) => Ok(ApiPage {
                    results: self.documents.get(uid).cloned().into_iter().collect(),
                    ..page(&[], None)
                }),
            }
        }

        async fn fetch_page_url(&self, url: &str) -> Result<ApiPage> {
            self.requests.lock().unwrap().push(format!("url:{}", url));
            if self.fail_cursors {
                return Err(ContentError::RemoteUnavailable("connection reset".into()));
            }
            self.cursor_pages
                .get(url)
                .cloned()
                .ok_or_else(|| ContentError::NotFound(url.to_string()))
        }
    }
}
