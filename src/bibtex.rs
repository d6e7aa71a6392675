//! BibTeX citation synthesis for records whose source supplied none.

use crate::record::ArticleRecord;

/// Year placeholder used when a record carries no date.
const NO_DATE: &str = "n.d.";

/// Derive the citation key: first author's surname, year, first title word.
///
/// Each part falls back to a fixed placeholder (`unknown`, `nd`, `untitled`),
/// so every record gets a key.
pub fn citation_key(record: &ArticleRecord) -> String {
    let first_author = record
        .authors_list
        .first()
        .map(String::as_str)
        .or_else(|| record.authors.split(',').next());

    let surname = first_author
        .and_then(|name| name.split_whitespace().last())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "unknown".to_string());

    let year: String = record
        .year
        .as_deref()
        .unwrap_or(NO_DATE)
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();

    let title_word = strip_braces(&record.title)
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
        .unwrap_or_else(|| "untitled".to_string());

    format!("{}{}{}", surname, year, title_word)
}

/// Build the `@article` citation block for a record.
///
/// Field order is fixed: title, author, year, then journal, doi and url when
/// present, then a note naming the first reporting platform.
pub fn synthesize(record: &ArticleRecord) -> String {
    let authors = if record.authors.is_empty() {
        "Unknown"
    } else {
        record.authors.as_str()
    };

    let mut bibtex = format!("@article{{{},\n", citation_key(record));
    bibtex.push_str(&format!("  title={{{}}},\n", strip_braces(&record.title)));
    bibtex.push_str(&format!("  author={{{}}},\n", authors));
    bibtex.push_str(&format!(
        "  year={{{}}},\n",
        record.year.as_deref().unwrap_or(NO_DATE)
    ));

    if let Some(journal) = &record.journal {
        bibtex.push_str(&format!("  journal={{{}}},\n", journal));
    }
    if let Some(doi) = &record.doi {
        bibtex.push_str(&format!("  doi={{{}}},\n", doi));
    }
    if let Some(url) = &record.url {
        bibtex.push_str(&format!("  url={{{}}},\n", url));
    }

    bibtex.push_str(&format!(
        "  note={{Source: {}}}\n",
        record.primary_platform().unwrap_or("Unknown")
    ));
    bibtex.push('}');
    bibtex
}

fn strip_braces(text: &str) -> String {
    text.replace(['{', '}'], "")
}
