//! Record normalization.
//!
//! Maps one raw hit from any source, plus the keyword that produced it, onto
//! an [`ArticleRecord`]. Hits without a usable title are skipped: the title is
//! the identity key and an anonymous record cannot be deduplicated.

use crate::bibtex;
use crate::record::ArticleRecord;
use crate::sources::arxiv::ArxivEntry;
use crate::sources::core_ac::{CoreName, CoreWork};
use crate::sources::crossref::CrossrefItem;
use crate::sources::dblp::{DblpAuthor, DblpInfo};
use crate::sources::openalex::OpenAlexWork;
use crate::sources::semanticscholar::SSPaper;
use crate::sources::{OneOrMany, Source};
use tracing::debug;

/// Literal used by sources and catalogs for a missing value
pub const NOT_AVAILABLE: &str = "N/A";

/// A search hit as returned by one source, before normalization.
#[derive(Debug, Clone)]
pub enum RawHit {
    Dblp(DblpInfo),
    Arxiv(ArxivEntry),
    SemanticScholar(SSPaper),
    OpenAlex(OpenAlexWork),
    Crossref(CrossrefItem),
    Core(CoreWork),
}

/// Source-independent view of the fields a hit exposes
#[derive(Debug, Default)]
struct HitFields {
    title: Option<String>,
    authors: Vec<String>,
    year: Option<String>,
    journal: Option<String>,
    doi: Option<String>,
    url: Option<String>,
}

impl RawHit {
    /// Source that produced this hit
    pub fn source(&self) -> Source {
        match self {
            RawHit::Dblp(_) => Source::Dblp,
            RawHit::Arxiv(_) => Source::Arxiv,
            RawHit::SemanticScholar(_) => Source::SemanticScholar,
            RawHit::OpenAlex(_) => Source::OpenAlex,
            RawHit::Crossref(_) => Source::Crossref,
            RawHit::Core(_) => Source::Core,
        }
    }

    fn into_fields(self) -> HitFields {
        match self {
            RawHit::Dblp(info) => HitFields {
                authors: info
                    .authors
                    .and_then(|a| a.author)
                    .map(|a| a.into_vec().into_iter().map(DblpAuthor::into_name).collect())
                    .unwrap_or_default(),
                year: info.year.as_ref().and_then(value_to_string),
                journal: info.venue.and_then(OneOrMany::into_first),
                url: info.ee.and_then(OneOrMany::into_first),
                doi: info.doi,
                title: info.title,
            },
            RawHit::Arxiv(entry) => HitFields {
                year: Some(entry.published.chars().take(10).collect()),
                title: Some(entry.title),
                authors: entry.authors,
                journal: entry.journal_ref,
                doi: entry.doi,
                url: Some(entry.id),
            },
            RawHit::SemanticScholar(paper) => HitFields {
                journal: paper.venue_name(),
                year: paper.year.as_ref().and_then(value_to_string),
                doi: paper.external_ids.and_then(|ids| ids.doi),
                authors: paper.authors.into_iter().filter_map(|a| a.name).collect(),
                title: paper.title,
                url: paper.url,
            },
            RawHit::OpenAlex(work) => HitFields {
                journal: work.venue_name(),
                year: work.publication_year.as_ref().and_then(value_to_string),
                url: work.id.clone().filter(|id| !id.is_empty()).or_else(|| work.doi.clone()),
                doi: work.doi.map(|d| d.replace("https://doi.org/", "")),
                authors: work
                    .authorships
                    .into_iter()
                    .filter_map(|a| a.author)
                    .filter_map(|a| a.display_name)
                    .collect(),
                title: work.title,
            },
            RawHit::Crossref(item) => HitFields {
                title: item.first_title(),
                year: item.created_year().map(|y| y.to_string()),
                journal: item.container_title.first().cloned(),
                url: item.landing_url(),
                authors: item.author.iter().map(|a| a.display_name()).collect(),
                doi: item.doi,
            },
            RawHit::Core(work) => HitFields {
                year: work.year_published.as_ref().and_then(value_to_string),
                url: work.best_url(),
                journal: work.venue_name(),
                authors: work.authors.into_iter().map(CoreName::into_name).collect(),
                title: work.title,
                doi: work.doi,
            },
        }
    }
}

/// Normalize one hit found under `keyword`.
///
/// Returns `None` when the hit has no usable title.
pub fn normalize(hit: RawHit, keyword: &str) -> Option<ArticleRecord> {
    let source = hit.source();
    let fields = hit.into_fields();

    let Some(title) = fields.title.as_deref().and_then(clean_field) else {
        debug!(source = %source, keyword, "Skipping hit without a title");
        return None;
    };

    let authors_list: Vec<String> = fields
        .authors
        .iter()
        .filter_map(|a| clean_field(a))
        .collect();

    let mut record = ArticleRecord {
        title,
        authors: authors_list.join(", "),
        authors_list,
        year: fields.year.as_deref().and_then(clean_field),
        journal: fields.journal.as_deref().and_then(clean_field),
        doi: fields.doi.as_deref().and_then(clean_field),
        url: fields.url.as_deref().and_then(clean_field),
        ..Default::default()
    };
    record.add_platform(source.display_name());
    record.add_keyword(keyword);
    record.bibtex = bibtex::synthesize(&record);

    Some(record)
}

/// Normalize every hit of one (source, keyword) batch, dropping untitled hits.
pub fn normalize_batch(hits: Vec<RawHit>, keyword: &str) -> Vec<ArticleRecord> {
    let total = hits.len();
    let records: Vec<ArticleRecord> = hits
        .into_iter()
        .filter_map(|hit| normalize(hit, keyword))
        .collect();

    if records.len() < total {
        debug!(keyword, skipped = total - records.len(), "Dropped untitled hits");
    }
    records
}

/// Collapse whitespace runs to single spaces; empty and `N/A` become absent.
pub fn clean_field(value: &str) -> Option<String> {
    let cleaned = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() || cleaned == NOT_AVAILABLE {
        None
    } else {
        Some(cleaned)
    }
}

/// Convert JSON value to string
fn value_to_string(val: &serde_json::Value) -> Option<String> {
    match val {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Null => None,
        _ => Some(val.to_string()),
    }
}
