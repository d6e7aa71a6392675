//! Plain-text catalog format.
//!
//! A catalog is a top banner, a few metadata counts, then keyword sections.
//! Each section holds numbered record blocks. Banners and section headers are
//! framed by lines of 100 `=`; record titles are framed by lines of 100 `-`.
//! The parser locates sections and records by those exact rule lines.
//!
//! Two layouts share the record block:
//! - per-platform files written by the search pipeline
//! - the combined catalog, which adds `Found in:` and a statistics section

mod format;
mod parser;

pub use format::{write_combined_catalog, write_platform_catalog, write_record, Layout};
pub use parser::parse_catalog;

use crate::record::ArticleRecord;

/// Width of every banner and divider rule
pub const RULE_WIDTH: usize = 100;

/// Title of the combined catalog banner
pub const COMBINED_BANNER: &str = "COMBINED RESULTS FROM ALL PLATFORMS";

/// Title of the statistics banner
pub const STATISTICS_BANNER: &str = "STATISTICS";

pub(crate) const KEYWORD_PREFIX: &str = "KEYWORD:";
pub(crate) const AUTHORS_LABEL: &str = "Authors:";
pub(crate) const DATE_LABEL: &str = "Publication Date:";
pub(crate) const JOURNAL_LABEL: &str = "Journal/Venue:";
pub(crate) const FOUND_IN_LABEL: &str = "Found in:";
pub(crate) const ALSO_MATCHES_LABEL: &str = "Also matches keywords:";
pub(crate) const DOI_LABEL: &str = "DOI:";
pub(crate) const URL_LABEL: &str = "URL:";
pub(crate) const BIBTEX_LABEL: &str = "BibTeX Citation:";

/// Records listed under one keyword header, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSection {
    /// Stored (lowercase) keyword
    pub keyword: String,
    pub records: Vec<ArticleRecord>,
}

impl KeywordSection {
    pub fn new(keyword: impl Into<String>, records: Vec<ArticleRecord>) -> Self {
        Self {
            keyword: keyword.into(),
            records,
        }
    }
}

pub(crate) fn rule(ch: char) -> String {
    std::iter::repeat(ch).take(RULE_WIDTH).collect()
}

/// True for a line made of exactly [`RULE_WIDTH`] copies of `ch`.
pub(crate) fn is_rule(line: &str, ch: char) -> bool {
    let line = line.trim_end();
    line.len() == RULE_WIDTH && line.chars().all(|c| c == ch)
}
