//! HTTP implementation of [`ContentApi`] for the repository REST API

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::{ContentApi, Predicate, Query};
use crate::config::ContentApiConfig;
use crate::content::{ApiPage, Repository};
use crate::error::{ContentError, Result};

const TOKEN_PARAM: &str = "access_token";

/// How long a fetched master ref is reused before the repository root is read again
pub const REPOSITORY_TTL: Duration = Duration::from_secs(5);

/// Repository API client over HTTP
pub struct PrismicApi {
    http_client: reqwest::Client,
    endpoint: Url,
    access_token: String,
    repository: Mutex<Option<(Instant, Arc<Repository>)>>,
    repository_ttl: Duration,
}

impl PrismicApi {
    /// Create a client; no request is made until the first query
    pub fn new(config: &ContentApiConfig, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            ContentError::Configuration(format!("invalid endpoint {}: {}", config.endpoint, e))
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ContentError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint,
            access_token: config.access_token.clone(),
            repository: Mutex::new(None),
            repository_ttl: REPOSITORY_TTL,
        })
    }

    /// Reuse a fetched master ref for `ttl`; zero reads the root before every search
    pub fn with_repository_ttl(mut self, ttl: Duration) -> Self {
        self.repository_ttl = ttl;
        self
    }

    /// Repository metadata, re-read once the cached copy is older than the TTL
    /// so documents published later become visible
    async fn repository(&self) -> Result<Arc<Repository>> {
        let mut cached = self.repository.lock().await;
        if let Some((fetched_at, repository)) = cached.as_ref() {
            if fetched_at.elapsed() < self.repository_ttl {
                return Ok(Arc::clone(repository));
            }
        }

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(TOKEN_PARAM, &self.access_token);
        let repository = Arc::new(self.get_json::<Repository>(url).await?);
        tracing::debug!("Master ref: {:?}", repository.master_ref());

        *cached = Some((Instant::now(), Arc::clone(&repository)));
        Ok(repository)
    }

    fn search_url(&self, master_ref: &str, query: &Query) -> Url {
        let mut url = self.endpoint.clone();
        let path = format!("{}/documents/search", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.query_pairs_mut()
            .append_pair("ref", master_ref)
            .append_pair("q", &predicate(query))
            .append_pair("pageSize", &query.page_size.to_string())
            .append_pair("page", &query.page.to_string())
            .append_pair(TOKEN_PARAM, &self.access_token);
        url
    }

    /// Cursor URLs pointing at our repository get the token if they lack it;
    /// the token is never attached to another host
    fn authorize_cursor(&self, url: &str) -> Result<Url> {
        let mut url = Url::parse(url)
            .map_err(|e| ContentError::InvalidResponse(format!("invalid page URL: {}", e)))?;

        let same_origin = url.host_str() == self.endpoint.host_str()
            && url.port_or_known_default() == self.endpoint.port_or_known_default();
        let has_token = url.query_pairs().any(|(k, _)| k == TOKEN_PARAM);
        if same_origin && !has_token {
            url.query_pairs_mut()
                .append_pair(TOKEN_PARAM, &self.access_token);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let shown = redact(&url);
        tracing::debug!("GET {}", shown);

        let response = self.http_client.get(url).send().await.map_err(|e| {
            ContentError::RemoteUnavailable(format!("request to {} failed: {}", shown, e.without_url()))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &shown, body.trim()));
        }

        let text = response.text().await.map_err(|e| {
            ContentError::RemoteUnavailable(format!("failed to read body from {}: {}", shown, e.without_url()))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            ContentError::InvalidResponse(format!("failed to parse JSON from {}: {}", shown, e))
        })
    }
}

#[async_trait]
impl ContentApi for PrismicApi {
    async fn query(&self, query: &Query) -> Result<ApiPage> {
        let repository = self.repository().await?;

        if !repository.types.is_empty() && !repository.has_type(&query.content_type) {
            return Err(ContentError::NotFound(format!(
                "content type {:?}",
                query.content_type
            )));
        }

        let master_ref = repository.master_ref().ok_or_else(|| {
            ContentError::InvalidResponse("repository has no master ref".to_string())
        })?;

        let url = self.search_url(master_ref, query);
        self.get_json(url).await
    }

    async fn fetch_page_url(&self, url: &str) -> Result<ApiPage> {
        let url = self.authorize_cursor(url)?;
        self.get_json(url).await
    }
}

fn predicate(query: &Query) -> String {
    match &query.predicate {
        Predicate::Type => format!(
            "[[at(document.type,\"{}\")]]",
            escape_literal(&query.content_type)
        ),
        Predicate::Uid(uid) => format!(
            "[[at(my.{}.uid,\"{}\")]]",
            query.content_type,
            escape_literal(uid)
        ),
    }
}

fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn status_error(status: StatusCode, url: &str, body: &str) -> ContentError {
    let detail = if body.is_empty() {
        format!("HTTP {} from {}", status, url)
    } else {
        format!("HTTP {} from {}: {}", status, url, body)
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ContentError::Auth(detail),
        StatusCode::NOT_FOUND => ContentError::NotFound(detail),
        _ => ContentError::RemoteUnavailable(detail),
    }
}

/// The URL with the access token masked, for logs and error messages
fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == TOKEN_PARAM) {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == TOKEN_PARAM {
                (k.into_owned(), "***".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();
    let mut shown = url.clone();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
