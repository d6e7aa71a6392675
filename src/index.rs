//! Keyword index and recency ranking over merged records.

use crate::record::ArticleRecord;
use std::collections::BTreeMap;

/// Bucket for records that carry no keyword
pub const UNCATEGORIZED: &str = "uncategorized";

/// Records grouped by keyword, each group ranked newest first.
///
/// A record carrying N keywords appears in N groups. Groups iterate in
/// keyword order.
#[derive(Debug, Default)]
pub struct KeywordIndex<'a> {
    groups: BTreeMap<String, Vec<&'a ArticleRecord>>,
    total: usize,
}

impl<'a> KeywordIndex<'a> {
    /// Group and rank the given records.
    pub fn build(records: impl IntoIterator<Item = &'a ArticleRecord>) -> Self {
        let mut groups: BTreeMap<String, Vec<&'a ArticleRecord>> = BTreeMap::new();
        let mut total = 0;

        for record in records {
            total += 1;
            if record.keywords.is_empty() {
                groups.entry(UNCATEGORIZED.to_string()).or_default().push(record);
                continue;
            }
            for keyword in &record.keywords {
                groups.entry(keyword.clone()).or_default().push(record);
            }
        }

        for group in groups.values_mut() {
            rank_by_year(group);
        }

        Self { groups, total }
    }

    /// Ranked records for one keyword
    pub fn get(&self, keyword: &str) -> Option<&[&'a ArticleRecord]> {
        self.groups.get(keyword).map(Vec::as_slice)
    }

    /// (keyword, ranked records) in keyword order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a ArticleRecord])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn keyword_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of distinct records indexed
    pub fn total_records(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Per-keyword record counts in keyword order
    pub fn counts(&self) -> Vec<(&str, usize)> {
        self.groups
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect()
    }
}

/// Numeric recency rank of a year value.
///
/// Pure digit strings parse as integers, saturating at `u64::MAX`; dates,
/// `N/A` and empty values rank 0.
pub fn year_rank(year: Option<&str>) -> u64 {
    match year {
        Some(y) if !y.is_empty() && y.bytes().all(|b| b.is_ascii_digit()) => {
            y.parse().unwrap_or(u64::MAX)
        }
        _ => 0,
    }
}

/// Sort newest first. Stable, so equal ranks keep encounter order.
pub fn rank_by_year(records: &mut [&ArticleRecord]) {
    records.sort_by_key(|r| std::cmp::Reverse(year_rank(r.year.as_deref())));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, year: Option<&str>, keywords: &[&str]) -> ArticleRecord {
        let mut r = ArticleRecord {
            title: title.to_string(),
            year: year.map(str::to_string),
            ..Default::default()
        };
        for k in keywords {
            r.add_keyword(k);
        }
        r
    }

    #[test]
    fn test_year_rank() {
        assert_eq!(year_rank(Some("2021")), 2021);
        assert_eq!(year_rank(Some("2019-03")), 0);
        assert_eq!(year_rank(Some("N/A")), 0);
        assert_eq!(year_rank(Some("")), 0);
        assert_eq!(year_rank(None), 0);
        assert_eq!(year_rank(Some("99999999999999999999999")), u64::MAX);
    }

    #[test]
    fn test_ranking_is_stable_on_zero_rank() {
        let records = vec![
            record("a", Some("2021"), &["k"]),
            record("b", None, &["k"]),
            record("c", Some("2019-03"), &["k"]),
            record("d", Some("2023"), &["k"]),
        ];

        let index = KeywordIndex::build(&records);
        let titles: Vec<&str> = index
            .get("k")
            .unwrap()
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn test_multi_keyword_records_appear_in_each_group() {
        let records = vec![
            record("shared", Some("2020"), &["dark patterns", "nudging"]),
            record("solo", Some("2021"), &["nudging"]),
            record("loose", None, &[]),
        ];

        let index = KeywordIndex::build(&records);
        assert_eq!(index.total_records(), 3);
        assert_eq!(
            index.counts(),
            vec![("dark patterns", 1), ("nudging", 2), (UNCATEGORIZED, 1)]
        );
        let keywords: Vec<&str> = index.iter().map(|(k, _)| k).collect();
        assert_eq!(keywords, vec!["dark patterns", "nudging", "uncategorized"]);
    }

    #[test]
    fn test_empty_index() {
        let empty = Vec::<ArticleRecord>::new();
        let index = KeywordIndex::build(&empty);
        assert!(index.is_empty());
        assert_eq!(index.keyword_count(), 0);
    }
}
