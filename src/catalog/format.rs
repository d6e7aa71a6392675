//! Catalog serializer.

use super::{
    rule, KeywordSection, ALSO_MATCHES_LABEL, AUTHORS_LABEL, BIBTEX_LABEL, COMBINED_BANNER,
    DATE_LABEL, DOI_LABEL, FOUND_IN_LABEL, JOURNAL_LABEL, KEYWORD_PREFIX, STATISTICS_BANNER,
    URL_LABEL,
};
use crate::dedup::count_unique;
use crate::index::KeywordIndex;
use crate::normalize::NOT_AVAILABLE;
use crate::record::ArticleRecord;
use std::io::{self, Write};

/// Which catalog a record block is written into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One platform's search results
    Platform,
    /// Merged catalog across platforms, with `Found in:` lines
    Combined,
}

/// Write one numbered record block.
///
/// `section_keyword` is the keyword of the enclosing section; the record's
/// other keywords go on the `Also matches keywords:` line.
pub fn write_record<W: Write>(
    w: &mut W,
    number: usize,
    record: &ArticleRecord,
    section_keyword: &str,
    layout: Layout,
) -> io::Result<()> {
    let divider = rule('-');
    writeln!(w)?;
    writeln!(w, "{}", divider)?;
    writeln!(w, "[{}] {}", number, record.title)?;
    writeln!(w, "{}", divider)?;
    writeln!(w)?;

    writeln!(w, "{} {}", AUTHORS_LABEL, or_na(Some(record.authors.as_str())))?;
    writeln!(w, "{} {}", DATE_LABEL, or_na(record.year.as_deref()))?;
    writeln!(w, "{} {}", JOURNAL_LABEL, or_na(record.journal.as_deref()))?;

    if layout == Layout::Combined {
        let platforms = record.platforms.join(", ");
        writeln!(w, "{} {}", FOUND_IN_LABEL, or_na(Some(platforms.as_str())))?;
    }

    if record.keywords.len() > 1 {
        let others: Vec<&str> = record
            .keywords
            .iter()
            .map(String::as_str)
            .filter(|k| *k != section_keyword)
            .collect();
        writeln!(w, "{} {}", ALSO_MATCHES_LABEL, others.join(", "))?;
    }

    writeln!(w, "{} {}", DOI_LABEL, or_na(record.doi.as_deref()))?;
    writeln!(w, "{} {}", URL_LABEL, or_na(record.url.as_deref()))?;

    writeln!(w)?;
    writeln!(w, "{}", BIBTEX_LABEL)?;
    writeln!(w, "{}", or_na(Some(record.bibtex.as_str())))?;
    Ok(())
}

/// Write a per-platform catalog. Empty sections are skipped.
pub fn write_platform_catalog<W: Write>(
    w: &mut W,
    platform: &str,
    sections: &[KeywordSection],
) -> io::Result<()> {
    let total_unique = count_unique(sections.iter().flat_map(|s| &s.records));

    write_banner(w, &format!("{} - RESEARCH ARTICLES", platform.to_uppercase()))?;
    writeln!(w)?;
    writeln!(w, "Total unique articles: {}", total_unique)?;
    writeln!(w, "Search keywords: {}", sections.len())?;
    writeln!(w)?;

    for section in sections.iter().filter(|s| !s.records.is_empty()) {
        writeln!(w)?;
        write_keyword_header(w, &section.keyword)?;
        writeln!(w, "Articles found: {}", section.records.len())?;
        writeln!(w)?;

        for (i, record) in section.records.iter().enumerate() {
            write_record(w, i + 1, record, &section.keyword, Layout::Platform)?;
        }
    }
    Ok(())
}

/// Write the combined catalog: banner, counts, keyword sections, statistics.
pub fn write_combined_catalog<W: Write>(
    w: &mut W,
    index: &KeywordIndex<'_>,
    files_processed: usize,
) -> io::Result<()> {
    write_banner(w, COMBINED_BANNER)?;
    writeln!(w)?;
    writeln!(w, "Total unique articles: {}", index.total_records())?;
    writeln!(w, "Keywords: {}", index.keyword_count())?;
    writeln!(w, "Platform files processed: {}", files_processed)?;
    writeln!(w)?;

    for (keyword, records) in index.iter() {
        writeln!(w)?;
        write_keyword_header(w, keyword)?;
        writeln!(w, "Unique articles: {}", records.len())?;
        writeln!(w)?;

        for (i, record) in records.iter().enumerate() {
            write_record(w, i + 1, record, keyword, Layout::Combined)?;
        }
    }

    writeln!(w)?;
    writeln!(w)?;
    write_banner(w, STATISTICS_BANNER)?;
    writeln!(w)?;
    writeln!(w, "Total unique articles: {}", index.total_records())?;
    writeln!(w, "Total keywords: {}", index.keyword_count())?;
    writeln!(w)?;
    writeln!(w, "Articles per keyword:")?;
    for (keyword, count) in index.counts() {
        writeln!(w, "  • {}: {} articles", keyword, count)?;
    }
    Ok(())
}

fn write_banner<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    let banner = rule('=');
    writeln!(w, "{}", banner)?;
    writeln!(w, "{}", title)?;
    writeln!(w, "{}", banner)
}

fn write_keyword_header<W: Write>(w: &mut W, keyword: &str) -> io::Result<()> {
    write_banner(w, &format!("{} {}", KEYWORD_PREFIX, keyword.to_uppercase()))
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_AVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample() -> ArticleRecord {
        let mut r = ArticleRecord {
            title: "Dark Patterns at Scale".to_string(),
            authors: "Jane Doe, John Roe".to_string(),
            authors_list: vec!["Jane Doe".to_string(), "John Roe".to_string()],
            year: Some("2019".to_string()),
            doi: Some("10.1145/3359183".to_string()),
            bibtex: "@article{doe2019dark,\n  title={Dark Patterns at Scale}\n}".to_string(),
            ..Default::default()
        };
        r.add_platform("DBLP");
        r.add_keyword("dark patterns");
        r
    }

    #[test]
    fn test_record_block_layout() {
        let text = render(|w| write_record(w, 3, &sample(), "dark patterns", Layout::Platform));
        let dashes = "-".repeat(100);
        let expected = format!(
            "\n{d}\n[3] Dark Patterns at Scale\n{d}\n\n\
             Authors: Jane Doe, John Roe\n\
             Publication Date: 2019\n\
             Journal/Venue: N/A\n\
             DOI: 10.1145/3359183\n\
             URL: N/A\n\
             \nBibTeX Citation:\n\
             @article{{doe2019dark,\n  title={{Dark Patterns at Scale}}\n}}\n",
            d = dashes
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_combined_block_lists_platforms_and_other_keywords() {
        let mut r = sample();
        r.add_platform("arXiv");
        r.add_keyword("deceptive design");

        let text = render(|w| write_record(w, 1, &r, "dark patterns", Layout::Combined));
        assert!(text.contains("Found in: DBLP, arXiv\n"));
        assert!(text.contains("Also matches keywords: deceptive design\n"));
    }

    #[test]
    fn test_platform_catalog_header_and_empty_sections() {
        let mut dup = sample();
        dup.keywords.clear();
        dup.add_keyword("nudging");
        let sections = vec![
            KeywordSection::new("dark patterns", vec![sample()]),
            KeywordSection::new("nudging", vec![dup]),
            KeywordSection::new("consent", Vec::new()),
        ];

        let text = render(|w| write_platform_catalog(w, "Semantic Scholar", &sections));
        assert!(text.starts_with(&format!("{}\nSEMANTIC SCHOLAR - RESEARCH ARTICLES\n", "=".repeat(100))));
        assert!(text.contains("Total unique articles: 1\n"));
        assert!(text.contains("Search keywords: 3\n"));
        assert!(text.contains("KEYWORD: DARK PATTERNS\n"));
        assert!(text.contains("KEYWORD: NUDGING\n"));
        assert!(!text.contains("KEYWORD: CONSENT"));
        assert!(!text.contains(STATISTICS_BANNER));
    }

    #[test]
    fn test_combined_catalog_statistics() {
        let mut second = sample();
        second.title = "Nudge Theory".to_string();
        second.add_keyword("nudging");
        let records = vec![sample(), second];
        let index = KeywordIndex::build(&records);

        let text = render(|w| write_combined_catalog(w, &index, 2));
        assert!(text.contains("Total unique articles: 2\nKeywords: 2\nPlatform files processed: 2\n"));
        assert!(text.contains("Unique articles: 2\n"));
        assert!(text.contains("Articles per keyword:\n  • dark patterns: 2 articles\n  • nudging: 1 articles\n"));
    }
}
