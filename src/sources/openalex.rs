//! OpenAlex API Client
//!
//! Keyword search over OpenAlex works. OpenAlex returns DOIs as full
//! `https://doi.org/` URLs; the prefix is stripped during normalization.
//!
//! API Best Practices (per OpenAlex docs):
//! - Use `mailto:email` parameter for polite pool (10 req/s vs 1 req/s)

use super::{decode_hits, fetch_text, null_as_empty, Source};
use crate::error::{Result, ScholarError};
use crate::normalize::RawHit;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// OpenAlex API base URL
const OPENALEX_API_BASE: &str = "https://api.openalex.org";

/// Email for polite pool access
const POLITE_EMAIL: &str = "rustmultischolar@example.com";

#[derive(Debug, Deserialize)]
struct OpenAlexResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    results: Vec<serde_json::Value>,
}

/// One OpenAlex work
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAlexWork {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub publication_year: Option<serde_json::Value>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authorships: Vec<OpenAlexAuthorship>,
    #[serde(default)]
    pub primary_location: Option<OpenAlexLocation>,
    /// Legacy venue object still present on older snapshots
    #[serde(default)]
    pub host_venue: Option<OpenAlexSource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAlexAuthorship {
    #[serde(default)]
    pub author: Option<OpenAlexAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAlexAuthor {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAlexLocation {
    #[serde(default)]
    pub source: Option<OpenAlexSource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAlexSource {
    #[serde(default)]
    pub display_name: Option<String>,
}

impl OpenAlexWork {
    /// Venue from the primary location, falling back to the legacy host venue
    pub fn venue_name(&self) -> Option<String> {
        self.primary_location
            .as_ref()
            .and_then(|l| l.source.as_ref())
            .and_then(|s| s.display_name.clone())
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.host_venue.as_ref().and_then(|h| h.display_name.clone()))
    }
}

/// Search OpenAlex for a keyword.
pub async fn search(client: &Client, keyword: &str, max: usize) -> Result<Vec<RawHit>> {
    let url = build_search_url(keyword, max);
    debug!(url = %url, "Querying OpenAlex");

    let body = fetch_text(Source::OpenAlex, client.get(&url)).await?;
    let works = parse_response(&body)?;
    Ok(works.into_iter().map(RawHit::OpenAlex).collect())
}

/// Build OpenAlex API search URL
fn build_search_url(keyword: &str, max: usize) -> String {
    format!(
        "{}/works?search={}&per-page={}&mailto={}",
        OPENALEX_API_BASE,
        urlencoding::encode(keyword),
        max,
        POLITE_EMAIL
    )
}

/// Decode an OpenAlex works response body.
pub fn parse_response(body: &str) -> Result<Vec<OpenAlexWork>> {
    let response: OpenAlexResponse = serde_json::from_str(body)
        .map_err(|e| ScholarError::Parse(format!("Failed to parse OpenAlex response: {}", e)))?;
    Ok(decode_hits(Source::OpenAlex, response.results))
}
