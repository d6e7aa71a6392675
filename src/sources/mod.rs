//! Scholarly search API adapters.
//!
//! Each adapter turns one (source, keyword) search into raw hits. Transport is
//! deliberately thin: one attempt per request and a fixed timeout. A failing
//! source yields zero hits for that keyword instead of failing the run.
//!
//! - [`dblp`] - DBLP computer science bibliography (JSON)
//! - [`arxiv`] - arXiv preprints (Atom feed)
//! - [`semanticscholar`] - Semantic Scholar graph search (JSON)
//! - [`openalex`] - OpenAlex works search (JSON)
//! - [`crossref`] - Crossref works query (JSON)
//! - [`core_ac`] - CORE open access aggregator (JSON)

pub mod arxiv;
pub mod core_ac;
pub mod crossref;
pub mod dblp;
pub mod openalex;
pub mod semanticscholar;

use crate::error::{Result, ScholarError};
use crate::normalize::RawHit;
use futures::future::join_all;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// User agent sent to every API
const USER_AGENT: &str = "rustmultischolar/0.1 (literature aggregation)";

/// A supported search platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    Dblp,
    Arxiv,
    SemanticScholar,
    OpenAlex,
    Crossref,
    Core,
}

impl Source {
    /// All sources in the fixed order they are queried and persisted.
    pub const ALL: [Source; 6] = [
        Source::Dblp,
        Source::Arxiv,
        Source::SemanticScholar,
        Source::OpenAlex,
        Source::Crossref,
        Source::Core,
    ];

    /// Platform name as it appears in records and catalogs
    pub fn display_name(self) -> &'static str {
        match self {
            Source::Dblp => "DBLP",
            Source::Arxiv => "arXiv",
            Source::SemanticScholar => "Semantic Scholar",
            Source::OpenAlex => "OpenAlex",
            Source::Crossref => "CrossRef",
            Source::Core => "CORE",
        }
    }

    /// File stem of the per-platform catalog
    pub fn file_stem(self) -> &'static str {
        match self {
            Source::Dblp => "dblp",
            Source::Arxiv => "arxiv",
            Source::SemanticScholar => "semantic_scholar",
            Source::OpenAlex => "openalex",
            Source::Crossref => "crossref",
            Source::Core => "core",
        }
    }

    /// Look up a source by its catalog file stem.
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.file_stem().eq_ignore_ascii_case(stem))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Options shared by all adapters
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Maximum hits requested per source per keyword
    pub max_results: usize,
    /// arXiv category used by the category-restricted query strategies
    pub arxiv_category: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 15,
            arxiv_category: "cs.HC".to_string(),
        }
    }
}

/// HTTP front end over the six adapters.
pub struct SearchClient {
    client: Client,
    options: SearchOptions,
}

impl SearchClient {
    pub fn new(options: SearchOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScholarError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, options })
    }

    /// Search one source. Failures are logged and produce an empty list.
    pub async fn search(&self, source: Source, keyword: &str) -> Vec<RawHit> {
        let max = self.options.max_results;
        let result = match source {
            Source::Dblp => dblp::search(&self.client, keyword, max).await,
            Source::Arxiv => {
                arxiv::search(&self.client, keyword, max, &self.options.arxiv_category).await
            }
            Source::SemanticScholar => semanticscholar::search(&self.client, keyword, max).await,
            Source::OpenAlex => openalex::search(&self.client, keyword, max).await,
            Source::Crossref => crossref::search(&self.client, keyword, max).await,
            Source::Core => core_ac::search(&self.client, keyword, max).await,
        };

        match result {
            Ok(hits) => {
                info!(source = %source, keyword, count = hits.len(), "Source search complete");
                hits
            }
            Err(e) => {
                warn!(source = %source, keyword, error = %e, "Source unavailable, continuing without it");
                Vec::new()
            }
        }
    }

    /// Search every source for one keyword concurrently.
    ///
    /// The result is always in [`Source::ALL`] order, independent of which
    /// request finished first.
    pub async fn search_all(&self, keyword: &str) -> Vec<(Source, Vec<RawHit>)> {
        let futures = Source::ALL
            .into_iter()
            .map(move |source| async move { (source, self.search(source, keyword).await) });
        join_all(futures).await
    }
}

/// Send a request and return the body of a successful response.
pub(crate) async fn fetch_text(source: Source, request: RequestBuilder) -> Result<String> {
    let response = request.send().await?;
    let status = response.status();
    debug!(source = %source, status = status.as_u16(), "Response received");

    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::FORBIDDEN {
        return Err(ScholarError::RateLimited(source.display_name().to_string()));
    }

    if !status.is_success() {
        return Err(ScholarError::Api {
            code: status.as_u16(),
            message: format!("{} API error: {}", source, status),
        });
    }

    Ok(response.text().await?)
}

/// Deserialize a list field that an API may send as `null`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode every hit of a result list on its own. Hits that do not fit `T`
/// are skipped, the rest of the batch is kept.
pub(crate) fn decode_hits<T: DeserializeOwned>(source: Source, items: Vec<serde_json::Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(hit) => Some(hit),
            Err(e) => {
                debug!(source = %source, error = %e, "Skipping malformed hit");
                None
            }
        })
        .collect()
}

/// A JSON field that some APIs send either as a single value or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }

    pub fn into_first(self) -> Option<T> {
        self.into_vec().into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_lookup() {
        for source in Source::ALL {
            assert_eq!(Source::from_file_stem(source.file_stem()), Some(source));
        }
        assert_eq!(Source::from_file_stem("Semantic_Scholar"), Some(Source::SemanticScholar));
        assert_eq!(Source::from_file_stem("combined_all_platforms"), None);
    }

    #[test]
    fn test_one_or_many() {
        let one: OneOrMany<String> = serde_json::from_str("\"a\"").unwrap();
        assert_eq!(one.into_vec(), vec!["a"]);

        let many: OneOrMany<String> = serde_json::from_str("[\"a\", \"b\"]").unwrap();
        assert_eq!(many.into_first(), Some("a".to_string()));
    }
}
