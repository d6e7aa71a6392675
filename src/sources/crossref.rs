//! Crossref API client.
//!
//! Free-text keyword query against the Crossref works index.

use super::{decode_hits, fetch_text, null_as_empty, Source};
use crate::error::{Result, ScholarError};
use crate::normalize::RawHit;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::debug;

/// Crossref API base URL
const CROSSREF_API_URL: &str = "https://api.crossref.org/works";

/// Polite pool email for Crossref API
const MAILTO: &str = "rustmultischolar@example.com";

// === Crossref API Response Types ===

#[derive(Debug, Deserialize)]
struct CrossrefResponse {
    message: CrossrefMessage,
}

#[derive(Debug, Deserialize)]
struct CrossrefMessage {
    #[serde(default, deserialize_with = "null_as_empty")]
    items: Vec<serde_json::Value>,
}

/// One Crossref work
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrossrefItem {
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: Vec<CrossrefAuthor>,
    #[serde(rename = "container-title", default, deserialize_with = "null_as_empty")]
    pub container_title: Vec<String>,
    #[serde(default)]
    pub created: Option<CrossrefDate>,
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrossrefAuthor {
    #[serde(default)]
    pub given: String,
    #[serde(default)]
    pub family: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrossrefDate {
    #[serde(rename = "date-parts", default, deserialize_with = "null_as_empty")]
    pub date_parts: Vec<Vec<Option<i32>>>,
}

impl CrossrefItem {
    /// First title, with inline markup such as `<i>` removed
    pub fn first_title(&self) -> Option<String> {
        self.title.first().map(|t| strip_html_tags(t))
    }

    /// Year of the `created` date
    pub fn created_year(&self) -> Option<i32> {
        self.created
            .as_ref()
            .and_then(|c| c.date_parts.first())
            .and_then(|parts| parts.first().copied().flatten())
    }

    /// Landing page, falling back to the DOI resolver
    pub fn landing_url(&self) -> Option<String> {
        self.url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.doi.as_ref().map(|d| format!("https://doi.org/{}", d)))
    }
}

impl CrossrefAuthor {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.given, self.family).trim().to_string()
    }
}

/// Search Crossref for a keyword.
pub async fn search(client: &Client, keyword: &str, max: usize) -> Result<Vec<RawHit>> {
    let rows = max.to_string();
    let request = client.get(CROSSREF_API_URL).query(&[
        ("query", keyword),
        ("rows", rows.as_str()),
        ("mailto", MAILTO),
    ]);

    debug!(keyword, "Querying Crossref");
    let body = fetch_text(Source::Crossref, request).await?;
    let items = parse_response(&body)?;
    Ok(items.into_iter().map(RawHit::Crossref).collect())
}

/// Decode a Crossref works response body.
pub fn parse_response(body: &str) -> Result<Vec<CrossrefItem>> {
    let response: CrossrefResponse = serde_json::from_str(body)
        .map_err(|e| ScholarError::Parse(format!("Failed to parse Crossref response: {}", e)))?;
    Ok(decode_hits(Source::Crossref, response.message.items))
}

/// Strip HTML tags from text
fn strip_html_tags(text: &str) -> String {
    static TAGS: OnceLock<Option<Regex>> = OnceLock::new();
    match TAGS.get_or_init(|| Regex::new(r"<[^>]+>").ok()) {
        Some(re) => re.replace_all(text, "").to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_tags() {
        assert_eq!(strip_html_tags("<p>Hello</p>"), "Hello");
        assert_eq!(strip_html_tags("No tags"), "No tags");
        assert_eq!(
            strip_html_tags("<b>Bold</b> and <i>italic</i>"),
            "Bold and italic"
        );
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"status": "ok", "message": {"items": [
            {"DOI": "10.1234/test", "title": ["Test <i>Title</i>"],
             "author": [{"given": "John", "family": "Doe"}, {"family": "Roe"}],
             "container-title": ["Nature"],
             "created": {"date-parts": [[2023, 6, 15]]},
             "URL": "https://doi.org/10.1234/test"},
            {"DOI": "10.1234/other", "title": [], "created": {"date-parts": [[null]]}}
        ]}}"#;

        let items = parse_response(body).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.first_title().as_deref(), Some("Test Title"));
        assert_eq!(first.author[0].display_name(), "John Doe");
        assert_eq!(first.author[1].display_name(), "Roe");
        assert_eq!(first.created_year(), Some(2023));

        let second = &items[1];
        assert!(second.first_title().is_none());
        assert_eq!(second.created_year(), None);
        assert_eq!(
            second.landing_url().as_deref(),
            Some("https://doi.org/10.1234/other")
        );
    }

    #[test]
    fn test_null_lists_are_empty() {
        let body = r#"{"message": {"items": [
            {"DOI": "10.1/a", "title": null, "author": null, "container-title": null,
             "created": {"date-parts": null}},
            {"DOI": "10.1/b", "title": ["Kept"]}
        ]}}"#;

        let items = parse_response(body).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].first_title().is_none());
        assert_eq!(items[0].created_year(), None);
        assert_eq!(items[1].first_title().as_deref(), Some("Kept"));
    }
}
