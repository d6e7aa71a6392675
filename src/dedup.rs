//! Per-platform duplicate filtering.
//!
//! Keeps the first occurrence of each title within one batch. This is a pure
//! filter: later duplicates are dropped, never merged.

use crate::record::{ArticleRecord, TitleKey};
use std::collections::HashSet;

/// Retain only the first record of each title, preserving first-seen order.
pub fn dedup_by_title(records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    let mut seen: HashSet<TitleKey> = HashSet::new();
    records
        .into_iter()
        .filter(|r| r.key().is_some_and(|key| seen.insert(key)))
        .collect()
}

/// Number of distinct titles across the given records.
pub fn count_unique<'a>(records: impl IntoIterator<Item = &'a ArticleRecord>) -> usize {
    records
        .into_iter()
        .filter_map(ArticleRecord::key)
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, doi: Option<&str>) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            doi: doi.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_keeps_first_occurrence_in_order() {
        let records = vec![
            record("Dark Patterns", None),
            record("Deceptive Design", None),
            record("dark patterns ", Some("10.1/late")),
            record("Consent", None),
            record("DECEPTIVE   design", None),
        ];

        let unique = dedup_by_title(records);
        let titles: Vec<&str> = unique.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Dark Patterns", "Deceptive Design", "Consent"]);
        // filter, not merge: the later duplicate's DOI is not carried over
        assert!(unique[0].doi.is_none());
    }

    #[test]
    fn test_drops_untitled_records() {
        let unique = dedup_by_title(vec![record("", None), record("A", None)]);
        assert_eq!(unique.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedup_by_title(Vec::new()).is_empty());
        assert_eq!(count_unique(&Vec::<ArticleRecord>::new()), 0);
    }

    #[test]
    fn test_count_unique() {
        let records = vec![record("A", None), record("a", None), record("B", None)];
        assert_eq!(count_unique(&records), 2);
    }
}
