//! List view: accumulated post summaries plus a continuation cursor

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::client::ContentApi;
use crate::content::{ApiPage, PostSummary};
use crate::error::{ContentError, Result};

/// Shown to the reader when "load more" fails
pub const LOAD_MORE_NOTICE: &str = "Ocorreu um erro por favor recarrege a página!";

/// Posts loaded so far and where the next page lives
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pagination {
    /// `None` exactly when there are no further pages
    pub next_page: Option<String>,
    /// In fetch order; never reordered or shrunk
    pub results: Vec<PostSummary>,
}

impl Pagination {
    /// Build the initial state from the first page
    pub fn from_page(mut page: ApiPage) -> Self {
        Self {
            next_page: page.next_page.take(),
            results: summaries(page),
        }
    }

    /// Whether another page can be loaded
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Fetch the page behind the cursor and return the extended state.
    ///
    /// With no cursor the state is returned unchanged. On error `self` is
    /// untouched, so the caller keeps what it had.
    pub async fn load_more(&self, api: &dyn ContentApi) -> Result<Pagination> {
        let Some(cursor) = self.next_page.as_deref() else {
            return Ok(self.clone());
        };

        let page = api.fetch_page_url(cursor).await?;
        let mut next = self.clone();
        next.next_page = page.next_page.clone();
        next.results.extend(summaries(page));
        Ok(next)
    }
}

/// Summaries of a page's documents; documents that cannot be routed are skipped
fn summaries(page: ApiPage) -> Vec<PostSummary> {
    page.results
        .into_iter()
        .filter_map(|doc| match PostSummary::try_from(doc) {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!("Skipping post: {}", e);
                None
            }
        })
        .collect()
}

/// Result of one [`ListView::load_more`] call
#[derive(Debug)]
pub enum LoadMore {
    /// There was no cursor; nothing was fetched
    Exhausted,
    /// This many posts were appended
    Appended(usize),
    /// The fetch failed; state is unchanged
    Failed(ContentError),
}

impl LoadMore {
    /// The user-facing notice, if the call failed
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            LoadMore::Failed(_) => Some(LOAD_MORE_NOTICE),
            _ => None,
        }
    }
}

/// A list view instance whose "load more" calls run one at a time.
///
/// A call issued while another is in flight waits for it and then continues
/// from the cursor that call left behind.
pub struct ListView {
    api: Arc<dyn ContentApi>,
    state: Mutex<Pagination>,
}

impl ListView {
    pub fn new(api: Arc<dyn ContentApi>, initial: Pagination) -> Self {
        Self {
            api,
            state: Mutex::new(initial),
        }
    }

    /// Current state
    pub async fn snapshot(&self) -> Pagination {
        self.state.lock().await.clone()
    }

    /// Load the next page into this view
    pub async fn load_more(&self) -> LoadMore {
        let mut state = self.state.lock().await;
        if !state.has_more() {
            return LoadMore::Exhausted;
        }

        match state.load_more(self.api.as_ref()).await {
            Ok(next) => {
                let appended = next.results.len() - state.results.len();
                *state = next;
                LoadMore::Appended(appended)
            }
            Err(e) => {
                tracing::warn!("Load more failed: {}", e);
                LoadMore::Failed(e)
            }
        }
    }
}
