//! DBLP publication search client.
//!
//! DBLP's JSON export is loosely typed: `author`, `ee` and `venue` switch
//! between a single value and a list depending on the record.

use super::{decode_hits, fetch_text, null_as_empty, OneOrMany, Source};
use crate::error::{Result, ScholarError};
use crate::normalize::RawHit;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// DBLP publication search endpoint
const DBLP_API_URL: &str = "https://dblp.org/search/publ/api";

#[derive(Debug, Deserialize)]
struct DblpResponse {
    result: DblpResult,
}

#[derive(Debug, Deserialize)]
struct DblpResult {
    #[serde(default)]
    hits: DblpHits,
}

#[derive(Debug, Default, Deserialize)]
struct DblpHits {
    #[serde(default, deserialize_with = "null_as_empty")]
    hit: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DblpHit {
    #[serde(default)]
    info: DblpInfo,
}

/// Publication fields of one DBLP hit
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DblpInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Option<DblpAuthors>,
    #[serde(default)]
    pub year: Option<serde_json::Value>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub ee: Option<OneOrMany<String>>,
    #[serde(default)]
    pub venue: Option<OneOrMany<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DblpAuthors {
    #[serde(default)]
    pub author: Option<OneOrMany<DblpAuthor>>,
}

/// An author entry: either a bare name or an object carrying the name in `text`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DblpAuthor {
    Name(String),
    Tagged {
        #[serde(default)]
        text: String,
    },
}

impl DblpAuthor {
    pub fn into_name(self) -> String {
        match self {
            DblpAuthor::Name(name) => name,
            DblpAuthor::Tagged { text } => text,
        }
    }
}

/// Search DBLP for a keyword.
pub async fn search(client: &Client, keyword: &str, max: usize) -> Result<Vec<RawHit>> {
    let max = max.to_string();
    let request = client
        .get(DBLP_API_URL)
        .query(&[("q", keyword), ("format", "json"), ("h", max.as_str())]);

    debug!(keyword, "Querying DBLP");
    let body = fetch_text(Source::Dblp, request).await?;
    let hits = parse_response(&body)?;
    Ok(hits.into_iter().map(RawHit::Dblp).collect())
}

/// Decode a DBLP search response body.
pub fn parse_response(body: &str) -> Result<Vec<DblpInfo>> {
    let response: DblpResponse = serde_json::from_str(body)
        .map_err(|e| ScholarError::Parse(format!("Failed to parse DBLP response: {}", e)))?;

    let hits: Vec<DblpHit> = decode_hits(Source::Dblp, response.result.hits.hit);
    Ok(hits.into_iter().map(|h| h.info).collect())
}
