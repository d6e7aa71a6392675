//! Semantic Scholar API Client
//!
//! Keyword search over the graph API.
//!
//! API Details:
//! - Search endpoint: GET /graph/v1/paper/search
//! - Rate limit: 1 req/s (unauthenticated), higher with API key

use super::{decode_hits, fetch_text, null_as_empty, Source};
use crate::error::{Result, ScholarError};
use crate::normalize::RawHit;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Semantic Scholar API base URL
const SS_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

/// Fields requested for every paper
const SEARCH_FIELDS: &str = "title,authors,year,externalIds,url,venue,publicationVenue";

#[derive(Debug, Deserialize)]
struct SSSearchResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    data: Vec<serde_json::Value>,
}

/// One paper of a search page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SSPaper {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<SSAuthor>,
    #[serde(default)]
    pub year: Option<serde_json::Value>,
    #[serde(rename = "externalIds", default)]
    pub external_ids: Option<SSExternalIds>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(rename = "publicationVenue", default)]
    pub publication_venue: Option<SSPublicationVenue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SSAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SSExternalIds {
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SSPublicationVenue {
    #[serde(default)]
    pub name: Option<String>,
}

impl SSPaper {
    /// Venue name, falling back to the structured publication venue
    pub fn venue_name(&self) -> Option<String> {
        self.venue
            .clone()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.publication_venue.as_ref().and_then(|p| p.name.clone()))
    }
}

/// Search Semantic Scholar for a keyword.
pub async fn search(client: &Client, keyword: &str, max: usize) -> Result<Vec<RawHit>> {
    let url = format!("{}/paper/search", SS_API_BASE);
    let limit = max.to_string();
    let request = client.get(&url).query(&[
        ("query", keyword),
        ("limit", limit.as_str()),
        ("fields", SEARCH_FIELDS),
    ]);

    debug!(url = %url, keyword, "Querying Semantic Scholar");
    let body = fetch_text(Source::SemanticScholar, request).await?;
    let papers = parse_response(&body)?;
    Ok(papers.into_iter().map(RawHit::SemanticScholar).collect())
}

/// Decode a search response body.
pub fn parse_response(body: &str) -> Result<Vec<SSPaper>> {
    let response: SSSearchResponse = serde_json::from_str(body).map_err(|e| {
        ScholarError::Parse(format!("Failed to parse Semantic Scholar response: {}", e))
    })?;
    Ok(decode_hits(Source::SemanticScholar, response.data))
}
