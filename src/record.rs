//! Canonical article record shared by every pipeline stage.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Identity key of an article: the title case-folded with whitespace runs collapsed.
///
/// Two titles that differ only in case or whitespace produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TitleKey(String);

impl TitleKey {
    /// Derive the key for a title. Returns `None` for a blank title.
    pub fn from_title(title: &str) -> Option<Self> {
        let key = title
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TitleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One bibliographic record in canonical form.
///
/// Optional scalars use `None` as the absent sentinel; `authors` and `bibtex`
/// use the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    pub title: String,
    /// Comma-joined display form
    pub authors: String,
    /// Ordered author names, when the source exposed them individually
    pub authors_list: Vec<String>,
    /// Free-form: a year, a date, or a partial date
    pub year: Option<String>,
    pub journal: Option<String>,
    pub doi: Option<String>,
    pub url: Option<String>,
    pub bibtex: String,
    /// Sources that produced this title, in first-seen order
    pub platforms: Vec<String>,
    pub keywords: BTreeSet<String>,
}

impl ArticleRecord {
    /// Identity key of this record, `None` when the title is blank.
    pub fn key(&self) -> Option<TitleKey> {
        TitleKey::from_title(&self.title)
    }

    /// Record a platform, keeping first-seen order and skipping repeats.
    pub fn add_platform(&mut self, platform: &str) {
        let platform = platform.trim();
        if platform.is_empty() || self.platforms.iter().any(|p| p == platform) {
            return;
        }
        self.platforms.push(platform.to_string());
    }

    /// Record a search keyword in its stored (trimmed, lowercase) form.
    pub fn add_keyword(&mut self, keyword: &str) {
        let keyword = normalize_keyword(keyword);
        if !keyword.is_empty() {
            self.keywords.insert(keyword);
        }
    }

    /// First platform that reported this record.
    pub fn primary_platform(&self) -> Option<&str> {
        self.platforms.first().map(String::as_str)
    }
}

/// Stored form of a search keyword.
///
/// Lowercased with commas turned into spaces and whitespace runs collapsed.
/// Catalogs list keywords joined by `", "`, so a stored keyword never holds
/// a comma.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
