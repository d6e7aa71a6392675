//! Catalog parser.
//!
//! A line-oriented state machine over the layout written by [`super::format`].
//! Rule lines drive the transitions:
//!
//! ```text
//! SeekingSection --'='--> SectionTitle --title--> SectionClose --'='--> SeekingRecord
//! SeekingRecord  --'-'--> RecordTitle  --[n]----> RecordClose  --'-'--> ReadingFields
//! ReadingFields  --"BibTeX Citation:"--> ReadingBibtex
//! ```
//!
//! Any `=` rule ends the open record and starts a new banner; any `-` rule
//! ends the open record and starts a new record header. Banners other than
//! `KEYWORD:` headers (top banner, statistics) carry no records.

use super::{
    is_rule, KeywordSection, ALSO_MATCHES_LABEL, AUTHORS_LABEL, BIBTEX_LABEL, DATE_LABEL,
    DOI_LABEL, FOUND_IN_LABEL, JOURNAL_LABEL, KEYWORD_PREFIX, URL_LABEL,
};
use crate::normalize::clean_field;
use crate::record::{normalize_keyword, ArticleRecord};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekingSection,
    SectionTitle,
    SectionClose,
    SeekingRecord,
    RecordTitle,
    RecordClose,
    ReadingFields,
    ReadingBibtex,
}

struct Parser {
    state: State,
    /// Keyword of the open section, `None` inside non-keyword banners
    keyword: Option<String>,
    record: Option<ArticleRecord>,
    bibtex: Vec<String>,
    sections: Vec<KeywordSection>,
}

/// Parse a per-platform or combined catalog into its keyword sections.
///
/// Every record is tagged with the keyword of its section. `N/A` values come
/// back as absent. Records without a title are dropped.
pub fn parse_catalog(text: &str) -> Vec<KeywordSection> {
    let mut parser = Parser {
        state: State::SeekingSection,
        keyword: None,
        record: None,
        bibtex: Vec::new(),
        sections: Vec::new(),
    };
    for line in text.lines() {
        parser.feed(line);
    }
    parser.finish_record();
    parser.sections
}

impl Parser {
    fn feed(&mut self, line: &str) {
        if is_rule(line, '=') {
            self.finish_record();
            self.state = match self.state {
                State::SectionClose => State::SeekingRecord,
                _ => State::SectionTitle,
            };
            return;
        }

        if is_rule(line, '-') {
            self.state = match self.state {
                State::RecordClose => State::ReadingFields,
                _ => {
                    self.finish_record();
                    if self.keyword.is_some() {
                        State::RecordTitle
                    } else {
                        State::SeekingSection
                    }
                }
            };
            return;
        }

        match self.state {
            State::SeekingSection | State::SeekingRecord | State::SectionClose => {}
            State::SectionTitle => {
                let title = line.trim();
                if title.is_empty() {
                    return;
                }
                self.open_section(title);
                self.state = State::SectionClose;
            }
            State::RecordTitle => {
                let line = line.trim();
                if line.is_empty() {
                    return;
                }
                match parse_title_line(line) {
                    Some(title) => {
                        self.record = Some(ArticleRecord {
                            title,
                            ..Default::default()
                        });
                        self.state = State::RecordClose;
                    }
                    None => {
                        debug!(line, "Expected a numbered title line");
                        self.state = State::SeekingRecord;
                    }
                }
            }
            State::RecordClose => {}
            State::ReadingFields => self.read_field(line.trim()),
            State::ReadingBibtex => self.bibtex.push(line.trim_end().to_string()),
        }
    }

    fn open_section(&mut self, title: &str) {
        self.keyword = title
            .strip_prefix(KEYWORD_PREFIX)
            .map(normalize_keyword)
            .filter(|k| !k.is_empty());

        if let Some(keyword) = &self.keyword {
            let known = self.sections.last().is_some_and(|s| &s.keyword == keyword);
            if !known {
                self.sections.push(KeywordSection::new(keyword.clone(), Vec::new()));
            }
        }
    }

    fn read_field(&mut self, line: &str) {
        let Some(record) = self.record.as_mut() else {
            return;
        };

        if let Some(value) = line.strip_prefix(AUTHORS_LABEL) {
            record.authors = clean_field(value).unwrap_or_default();
            record.authors_list = split_list(&record.authors);
        } else if let Some(value) = line.strip_prefix(DATE_LABEL) {
            record.year = clean_field(value);
        } else if let Some(value) = line.strip_prefix(JOURNAL_LABEL) {
            record.journal = clean_field(value);
        } else if let Some(value) = line.strip_prefix(FOUND_IN_LABEL) {
            for platform in split_list(value) {
                record.add_platform(&platform);
            }
        } else if let Some(value) = line.strip_prefix(ALSO_MATCHES_LABEL) {
            for keyword in split_list(value) {
                record.add_keyword(&keyword);
            }
        } else if let Some(value) = line.strip_prefix(DOI_LABEL) {
            record.doi = clean_field(value);
        } else if let Some(value) = line.strip_prefix(URL_LABEL) {
            record.url = clean_field(value);
        } else if line.starts_with(BIBTEX_LABEL) {
            self.state = State::ReadingBibtex;
        }
    }

    fn finish_record(&mut self) {
        let bibtex_lines = std::mem::take(&mut self.bibtex);
        let Some(mut record) = self.record.take() else {
            return;
        };

        let start = bibtex_lines.iter().position(|l| !l.trim().is_empty());
        let end = bibtex_lines.iter().rposition(|l| !l.trim().is_empty());
        record.bibtex = match (start, end) {
            (Some(start), Some(end)) => bibtex_lines[start..=end].join("\n"),
            _ => String::new(),
        };
        if clean_field(&record.bibtex).is_none() {
            record.bibtex.clear();
        }

        if record.key().is_none() {
            debug!("Dropping catalog record without a title");
            return;
        }

        if let (Some(keyword), Some(section)) = (&self.keyword, self.sections.last_mut()) {
            record.add_keyword(keyword);
            section.records.push(record);
        }
    }
}

/// Title of a `[n] Title` line.
fn parse_title_line(line: &str) -> Option<String> {
    static TITLE_LINE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = TITLE_LINE
        .get_or_init(|| Regex::new(r"^\[(\d+)\]\s*(.*)$").ok())
        .as_ref()?;
    let caps = re.captures(line)?;
    caps.get(2).map(|m| m.as_str().trim().to_string())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(", ")
        .filter_map(clean_field)
        .collect()
}
