//! CORE open access aggregator client (API v3).

use super::{decode_hits, fetch_text, null_as_empty, Source};
use crate::error::{Result, ScholarError};
use crate::normalize::RawHit;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// CORE works search endpoint
const CORE_API_URL: &str = "https://api.core.ac.uk/v3/search/works";

#[derive(Debug, Deserialize)]
struct CoreResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    results: Vec<serde_json::Value>,
}

/// One CORE work
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoreWork {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<CoreName>,
    #[serde(rename = "yearPublished", default)]
    pub year_published: Option<serde_json::Value>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(rename = "downloadUrl", default)]
    pub download_url: Option<String>,
    #[serde(rename = "sourceFulltextUrls", default, deserialize_with = "null_as_empty")]
    pub source_fulltext_urls: Vec<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub journals: Vec<CoreJournal>,
}

/// CORE sends authors either as `{"name": ..}` objects or bare strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CoreName {
    Plain(String),
    Named {
        #[serde(default)]
        name: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CoreJournal {
    Plain(String),
    Titled {
        #[serde(default)]
        title: Option<String>,
    },
}

impl CoreName {
    pub fn into_name(self) -> String {
        match self {
            CoreName::Plain(name) => name,
            CoreName::Named { name } => name,
        }
    }
}

impl CoreWork {
    /// Download link, falling back to the first full-text source
    pub fn best_url(&self) -> Option<String> {
        self.download_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.source_fulltext_urls.first().cloned())
    }

    /// Publisher, falling back to the first journal title
    pub fn venue_name(&self) -> Option<String> {
        self.publisher
            .clone()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| {
                self.journals.first().and_then(|j| match j {
                    CoreJournal::Plain(title) => Some(title.clone()),
                    CoreJournal::Titled { title } => title.clone(),
                })
            })
    }
}

/// Search CORE for a keyword.
pub async fn search(client: &Client, keyword: &str, max: usize) -> Result<Vec<RawHit>> {
    let limit = max.to_string();
    let request = client
        .get(CORE_API_URL)
        .query(&[("q", keyword), ("limit", limit.as_str())]);

    debug!(keyword, "Querying CORE");
    let body = fetch_text(Source::Core, request).await?;
    let works = parse_response(&body)?;
    Ok(works.into_iter().map(RawHit::Core).collect())
}

/// Decode a CORE search response body.
pub fn parse_response(body: &str) -> Result<Vec<CoreWork>> {
    let response: CoreResponse = serde_json::from_str(body)
        .map_err(|e| ScholarError::Parse(format!("Failed to parse CORE response: {}", e)))?;
    Ok(decode_hits(Source::Core, response.results))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = r#"{"totalHits": 2, "results": [
            {"title": "Cookie Banners", "authors": [{"name": "Jane Doe"}, "John Roe"],
             "yearPublished": 2020, "doi": "10.5/abc", "downloadUrl": "",
             "sourceFulltextUrls": ["https://repo.example/1.pdf"],
             "publisher": null, "journals": [{"title": "J. Privacy", "identifiers": []}]},
            {"title": "Second", "authors": [], "yearPublished": null,
             "downloadUrl": "https://core.ac.uk/download/2.pdf", "publisher": "ACM"}
        ]}"#;

        let works = parse_response(body).unwrap();
        assert_eq!(works.len(), 2);

        let names: Vec<String> = works[0].authors.iter().cloned().map(CoreName::into_name).collect();
        assert_eq!(names, vec!["Jane Doe", "John Roe"]);
        assert_eq!(works[0].best_url().as_deref(), Some("https://repo.example/1.pdf"));
        assert_eq!(works[0].venue_name().as_deref(), Some("J. Privacy"));

        assert_eq!(works[1].best_url().as_deref(), Some("https://core.ac.uk/download/2.pdf"));
        assert_eq!(works[1].venue_name().as_deref(), Some("ACM"));
    }

    #[test]
    fn test_null_lists_keep_the_batch() {
        let body = r#"{"results": [
            {"title": "Valid Paper", "authors": [{"name": "Jane Doe"}], "yearPublished": 2021},
            {"title": "Null Lists", "authors": null, "sourceFulltextUrls": null, "journals": null,
             "downloadUrl": null, "publisher": null},
            {"title": 42, "authors": []}
        ]}"#;

        let works = parse_response(body).unwrap();
        let titles: Vec<&str> = works.iter().filter_map(|w| w.title.as_deref()).collect();
        assert_eq!(titles, vec!["Valid Paper", "Null Lists"]);
        assert!(works[1].authors.is_empty());
        assert!(works[1].best_url().is_none());
        assert!(works[1].venue_name().is_none());
    }
}
