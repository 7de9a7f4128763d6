//! Wire models for the repository API

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

use super::rich_text::StructuredText;

/// Repository metadata returned by the API root
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub refs: Vec<RepositoryRef>,
    #[serde(default)]
    pub types: std::collections::HashMap<String, String>,
}

impl Repository {
    /// The ref every search must be pinned to
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }

    /// Whether the repository declares the given custom type
    pub fn has_type(&self, content_type: &str) -> bool {
        self.types.contains_key(content_type)
    }
}

/// A repository revision
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryRef {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiPage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub total_results_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    pub results: Vec<Document>,
}

fn first_page() -> u32 {
    1
}

/// A document as returned by the API, before mapping to a view model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default, deserialize_with = "deserialize_api_date")]
    pub first_publication_date: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "deserialize_api_date")]
    pub last_publication_date: Option<DateTime<FixedOffset>>,
    pub data: PostData,
}

/// The custom fields of a post document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,
    pub content: Vec<ContentSlice>,
}

/// Banner image field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// One entry of the `content` group field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSlice {
    pub heading: String,
    pub body: Vec<StructuredText>,
}

/// Parse the API timestamp format (`2021-03-15T19:25:28+0000`), falling back to RFC 3339
pub fn parse_api_date(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}

fn deserialize_api_date<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(s) => parse_api_date(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
    }
}
