//! Cross-source merge engine.
//!
//! Collapses records for the same title arriving from different platforms and
//! keyword searches into one record per title.
//!
//! Merge policy:
//! - `keywords` and `platforms` accumulate from every contributor
//!   (platforms keep first-seen order).
//! - Scalar fields (authors, year, journal, doi, url, bibtex) are first writer
//!   wins: an incoming value only fills a slot that is still empty.
//!
//! The scalar policy makes the result depend on input order, so callers must
//! feed records in a reproducible order.

use crate::record::{ArticleRecord, TitleKey};
use std::collections::HashMap;
use tracing::{debug, info};

/// Merged records keyed by normalized title, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct MergedCatalog {
    entries: Vec<(TitleKey, ArticleRecord)>,
    positions: HashMap<TitleKey, usize>,
}

impl MergedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record, merging it into an existing entry with the same title.
    ///
    /// Returns `false` when the record has no usable title and was ignored.
    pub fn insert(&mut self, record: ArticleRecord) -> bool {
        let Some(key) = record.key() else {
            debug!("Ignoring record without a title");
            return false;
        };

        match self.positions.get(&key) {
            Some(&idx) => merge_record(&mut self.entries[idx].1, record),
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, record));
            }
        }
        true
    }

    /// Look up the merged record for a title (any case/whitespace variant).
    pub fn get(&self, title: &str) -> Option<&ArticleRecord> {
        let key = TitleKey::from_title(title)?;
        self.positions.get(&key).map(|&idx| &self.entries[idx].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&TitleKey, &ArticleRecord)> {
        self.entries.iter().map(|(k, r)| (k, r))
    }

    /// Merged records in first-seen order
    pub fn records(&self) -> impl Iterator<Item = &ArticleRecord> {
        self.entries.iter().map(|(_, r)| r)
    }

    pub fn into_records(self) -> Vec<ArticleRecord> {
        self.entries.into_iter().map(|(_, r)| r).collect()
    }
}

impl Extend<ArticleRecord> for MergedCatalog {
    fn extend<I: IntoIterator<Item = ArticleRecord>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl FromIterator<ArticleRecord> for MergedCatalog {
    fn from_iter<I: IntoIterator<Item = ArticleRecord>>(iter: I) -> Self {
        let mut catalog = Self::new();
        catalog.extend(iter);
        catalog
    }
}

/// Merge every record, in encounter order, into one record per title.
pub fn merge_all(records: impl IntoIterator<Item = ArticleRecord>) -> MergedCatalog {
    let mut catalog = MergedCatalog::new();
    let mut total = 0usize;
    for record in records {
        total += 1;
        catalog.insert(record);
    }

    info!(
        before = total,
        unique = catalog.len(),
        "Merged records across platforms and keywords"
    );
    catalog
}

/// Merge `incoming` into `existing`, which already holds the same title.
pub fn merge_record(existing: &mut ArticleRecord, incoming: ArticleRecord) {
    existing.keywords.extend(incoming.keywords);
    for platform in &incoming.platforms {
        existing.add_platform(platform);
    }

    if existing.authors.is_empty() && !incoming.authors.is_empty() {
        existing.authors = incoming.authors;
        existing.authors_list = incoming.authors_list;
    }
    fill(&mut existing.year, incoming.year);
    fill(&mut existing.journal, incoming.journal);
    fill(&mut existing.doi, incoming.doi);
    fill(&mut existing.url, incoming.url);
    if existing.bibtex.is_empty() {
        existing.bibtex = incoming.bibtex;
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn record(title: &str, platform: &str, keyword: &str) -> ArticleRecord {
        let mut r = ArticleRecord {
            title: title.to_string(),
            ..Default::default()
        };
        r.add_platform(platform);
        r.add_keyword(keyword);
        r
    }

    fn platform_set(r: &ArticleRecord) -> BTreeSet<String> {
        r.platforms.iter().cloned().collect()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut first = record("X", "A", "k1");
        first.year = Some("2020".to_string());
        let mut second = record("x", "B", "k1");
        second.doi = Some("10.1/xyz".to_string());
        let third = record("X", "A", "k2");

        let catalog = merge_all(vec![first, second, third]);
        assert_eq!(catalog.len(), 1);

        let merged = catalog.get("X").unwrap();
        assert_eq!(merged.platforms, vec!["A", "B"]);
        assert_eq!(
            merged.keywords,
            ["k1", "k2"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>()
        );
        assert_eq!(merged.year.as_deref(), Some("2020"));
        assert_eq!(merged.doi.as_deref(), Some("10.1/xyz"));
        assert_eq!(merged.title, "X");
    }

    #[test]
    fn test_case_and_whitespace_variants_collapse() {
        let catalog = merge_all(vec![
            record("Dark Patterns", "DBLP", "dark patterns"),
            record("dark patterns ", "arXiv", "dark patterns"),
        ]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("DARK PATTERNS").is_some());
    }

    #[test]
    fn test_merge_with_self_is_fixed_point() {
        let mut r = record("Dark Patterns", "DBLP", "dark patterns");
        r.authors = "Jane Doe".to_string();
        r.year = Some("2019".to_string());
        r.bibtex = "@article{doe2019dark}".to_string();

        let mut merged = r.clone();
        merge_record(&mut merged, r.clone());
        assert_eq!(merged, r);
    }

    #[test]
    fn test_set_fields_commute_scalars_do_not() {
        let mut a = record("Paper", "DBLP", "k1");
        a.journal = Some("CHI".to_string());
        a.year = Some("2020".to_string());
        let mut b = record("paper", "arXiv", "k2");
        b.journal = Some("arXiv preprint".to_string());
        b.year = Some("2019-05-01".to_string());

        let ab = merge_all(vec![a.clone(), b.clone()]).into_records().remove(0);
        let ba = merge_all(vec![b, a]).into_records().remove(0);

        assert_eq!(ab.keywords, ba.keywords);
        assert_eq!(platform_set(&ab), platform_set(&ba));

        // first writer wins for scalars
        assert_eq!(ab.journal.as_deref(), Some("CHI"));
        assert_eq!(ba.journal.as_deref(), Some("arXiv preprint"));
        assert_eq!(ab.year.as_deref(), Some("2020"));
        assert_eq!(ba.year.as_deref(), Some("2019-05-01"));
        assert_eq!(ab.platforms, vec!["DBLP", "arXiv"]);
        assert_eq!(ba.platforms, vec!["arXiv", "DBLP"]);
    }

    #[test]
    fn test_fill_only_empty_scalars() {
        let mut existing = record("T", "DBLP", "k");
        existing.url = Some("https://dblp.example".to_string());
        let mut incoming = record("T", "CORE", "k");
        incoming.authors = "Jane Doe".to_string();
        incoming.authors_list = vec!["Jane Doe".to_string()];
        incoming.url = Some("https://core.example".to_string());
        incoming.journal = Some("ACM".to_string());
        incoming.bibtex = "@article{x}".to_string();

        merge_record(&mut existing, incoming);
        assert_eq!(existing.url.as_deref(), Some("https://dblp.example"));
        assert_eq!(existing.authors, "Jane Doe");
        assert_eq!(existing.authors_list, vec!["Jane Doe"]);
        assert_eq!(existing.journal.as_deref(), Some("ACM"));
        assert_eq!(existing.bibtex, "@article{x}");
    }

    #[test]
    fn test_untitled_records_are_ignored() {
        let mut catalog = MergedCatalog::new();
        assert!(!catalog.insert(ArticleRecord::default()));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_preserves_first_seen_order() {
        let catalog: MergedCatalog = vec![
            record("B", "DBLP", "k"),
            record("A", "DBLP", "k"),
            record("b", "CORE", "k"),
        ]
        .into_iter()
        .collect();

        let titles: Vec<&str> = catalog.records().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
        let keys: Vec<&str> = catalog.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
