//! CSV export of merged records.

use crate::error::Result;
use crate::record::ArticleRecord;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Flat CSV row. Multi-valued fields are joined with `"; "`.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    authors: &'a str,
    year: &'a str,
    journal: &'a str,
    doi: &'a str,
    url: &'a str,
    platforms: String,
    keywords: String,
}

impl<'a> From<&'a ArticleRecord> for CsvRow<'a> {
    fn from(r: &'a ArticleRecord) -> Self {
        Self {
            title: &r.title,
            authors: &r.authors,
            year: r.year.as_deref().unwrap_or_default(),
            journal: r.journal.as_deref().unwrap_or_default(),
            doi: r.doi.as_deref().unwrap_or_default(),
            url: r.url.as_deref().unwrap_or_default(),
            platforms: r.platforms.join("; "),
            keywords: r.keywords.iter().cloned().collect::<Vec<_>>().join("; "),
        }
    }
}

/// Write records to `path` as CSV with a header row. Returns the row count.
pub fn write_csv<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a ArticleRecord>,
) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_path(path)?;

    let mut rows = 0;
    for record in records {
        wtr.serialize(CsvRow::from(record))?;
        rows += 1;
    }

    wtr.flush()?;
    info!(path = %path.display(), rows, "Saved CSV");
    Ok(rows)
}
