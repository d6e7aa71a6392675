//! arXiv API client.
//!
//! arXiv answers with an Atom feed. Several query strategies are tried in
//! order, from most to least restrictive, until one returns entries.

use super::{fetch_text, Source};
use crate::error::{Result, ScholarError};
use crate::normalize::RawHit;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use std::future::Future;
use tracing::{debug, warn};

/// arXiv export API base URL
const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

/// One `<entry>` of the Atom feed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArxivEntry {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub published: String,
    pub doi: Option<String>,
    pub journal_ref: Option<String>,
}

/// Search arXiv for a keyword.
///
/// A blocked (403/429) response ends the search immediately; any other
/// failure, network or malformed feed, moves on to the next strategy.
pub async fn search(client: &Client, keyword: &str, max: usize, category: &str) -> Result<Vec<RawHit>> {
    let urls = build_search_urls(keyword, max, category);
    let entries = run_strategies(&urls, |url| fetch_text(Source::Arxiv, client.get(url))).await?;
    Ok(entries.into_iter().map(RawHit::Arxiv).collect())
}

/// Try each URL in order until one yields entries. The last strategy's
/// error is returned when every strategy fails.
async fn run_strategies<F, Fut>(urls: &[String], mut fetch: F) -> Result<Vec<ArxivEntry>>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let last = urls.len().saturating_sub(1);

    for (idx, url) in urls.iter().enumerate() {
        debug!(strategy = idx + 1, url = %url, "Querying arXiv");

        let result = match fetch(url).await {
            Ok(body) => parse_feed(&body),
            Err(e) => Err(e),
        };

        match result {
            Ok(entries) if !entries.is_empty() => return Ok(entries),
            Ok(_) => {}
            Err(e @ ScholarError::RateLimited(_)) => return Err(e),
            Err(e) if idx == last => return Err(e),
            Err(e) => warn!(strategy = idx + 1, error = %e, "arXiv strategy failed, trying next"),
        }
    }

    Ok(Vec::new())
}

/// Build the query URLs in the order they are tried.
fn build_search_urls(keyword: &str, max: usize, category: &str) -> Vec<String> {
    let query = urlencoding::encode(keyword);
    let mut urls = Vec::new();

    if !category.is_empty() {
        urls.push(format!(
            "{}?search_query=cat:{}+AND+all:{}&start=0&max_results={}&sortBy=submittedDate&sortOrder=descending",
            ARXIV_API_URL, category, query, max
        ));
        urls.push(format!(
            "{}?search_query=cat:{}+AND+(ti:{}+OR+abs:{})&start=0&max_results={}&sortBy=submittedDate&sortOrder=descending",
            ARXIV_API_URL, category, query, query, max
        ));
        urls.push(format!(
            "{}?search_query=cat:{}*+AND+all:{}&start=0&max_results={}&sortBy=relevance",
            ARXIV_API_URL,
            category.replace(':', "%3A"),
            query,
            max
        ));
    }

    urls.push(format!(
        "{}?search_query=all:{}&start=0&max_results={}&sortBy=relevance",
        ARXIV_API_URL, query, max
    ));

    urls
}

/// Which entry field the current text node belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    None,
    Id,
    Title,
    Published,
    AuthorName,
    Doi,
    JournalRef,
}

/// Decode an Atom feed into entries.
pub fn parse_feed(xml: &str) -> Result<Vec<ArxivEntry>> {
    let mut reader = Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current: Option<ArxivEntry> = None;
    let mut field = Field::None;
    let mut in_author = false;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                if is_tag(e, b"entry") {
                    current = Some(ArxivEntry::default());
                } else if current.is_some() {
                    field = match e.name().as_ref() {
                        b"id" => Field::Id,
                        b"title" => Field::Title,
                        b"published" => Field::Published,
                        b"author" => {
                            in_author = true;
                            Field::None
                        }
                        b"name" if in_author => Field::AuthorName,
                        b"arxiv:doi" => Field::Doi,
                        b"arxiv:journal_ref" => Field::JournalRef,
                        _ => Field::None,
                    };
                    text.clear();
                }
            }
            Event::Text(ref e) => {
                if field != Field::None {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(ref e) => {
                if field != Field::None {
                    text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::End(ref e) => {
                let name = e.name();
                if name.as_ref() == b"entry" {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                } else if name.as_ref() == b"author" {
                    in_author = false;
                } else if let Some(entry) = current.as_mut() {
                    store_field(entry, field, std::mem::take(&mut text));
                }
                field = Field::None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

fn is_tag(e: &BytesStart<'_>, tag: &[u8]) -> bool {
    e.name().as_ref() == tag
}

fn store_field(entry: &mut ArxivEntry, field: Field, text: String) {
    let text = text.trim().to_string();
    match field {
        Field::Id => entry.id = text,
        Field::Title => entry.title = text,
        Field::Published => entry.published = text,
        Field::AuthorName if !text.is_empty() => entry.authors.push(text),
        Field::Doi if !text.is_empty() => entry.doi = Some(text),
        Field::JournalRef if !text.is_empty() => entry.journal_ref = Some(text),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title type="html">ArXiv Query: dark patterns</title>
  <id>http://arxiv.org/api/abc</id>
  <entry>
    <id>http://arxiv.org/abs/2101.00001v2</id>
    <published>2021-01-04T10:00:00Z</published>
    <title>Dark Patterns in
      the Wild &amp; Beyond</title>
    <author><name>Jane Doe</name></author>
    <author><name>John Roe</name><arxiv:affiliation>Somewhere</arxiv:affiliation></author>
    <arxiv:doi>10.1000/xyz</arxiv:doi>
    <arxiv:journal_ref>Proc. CHI 2021</arxiv:journal_ref>
    <link href="http://arxiv.org/abs/2101.00001v2" rel="alternate" type="text/html"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2102.00002v1</id>
    <published>2021-02-01T00:00:00Z</published>
    <title>Second Paper</title>
    <author><name>Solo</name></author>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let entries = parse_feed(FEED).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.id, "http://arxiv.org/abs/2101.00001v2");
        assert!(first.title.starts_with("Dark Patterns in"));
        assert!(first.title.ends_with("the Wild & Beyond"));
        assert_eq!(first.authors, vec!["Jane Doe", "John Roe"]);
        assert_eq!(first.published, "2021-01-04T10:00:00Z");
        assert_eq!(first.doi.as_deref(), Some("10.1000/xyz"));
        assert_eq!(first.journal_ref.as_deref(), Some("Proc. CHI 2021"));

        let second = &entries[1];
        assert_eq!(second.authors, vec!["Solo"]);
        assert!(second.doi.is_none());
        assert!(second.journal_ref.is_none());
    }

    #[test]
    fn test_parse_empty_feed() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>none</title></feed>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn test_build_search_urls() {
        let urls = build_search_urls("dark patterns", 15, "cs.HC");
        assert_eq!(urls.len(), 4);
        assert!(urls[0].contains("cat:cs.HC+AND+all:dark%20patterns"));
        assert!(urls[1].contains("(ti:dark%20patterns+OR+abs:dark%20patterns)"));
        assert!(urls[2].contains("cat:cs.HC*"));
        assert!(urls[3].contains("search_query=all:dark%20patterns"));
        assert!(urls.iter().all(|u| u.contains("max_results=15")));

        let uncategorized = build_search_urls("dark patterns", 5, "");
        assert_eq!(uncategorized.len(), 1);
    }

    fn canned(bodies: Vec<Result<String>>) -> impl FnMut(&str) -> std::future::Ready<Result<String>> {
        let mut bodies = bodies.into_iter();
        move |_url| {
            std::future::ready(bodies.next().unwrap_or_else(|| Ok(String::new())))
        }
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://arxiv.test/{}", i)).collect()
    }

    #[tokio::test]
    async fn test_malformed_feed_falls_through_to_next_strategy() {
        let fetch = canned(vec![
            Ok("<feed><entry><title>broken</wrong></entry></feed>".to_string()),
            Ok(FEED.to_string()),
        ]);

        let entries = run_strategies(&urls(3), fetch).await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_and_failed_strategies() {
        let fetch = canned(vec![
            Err(ScholarError::Parse("timeout".to_string())),
            Ok(r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#.to_string()),
            Ok(FEED.to_string()),
        ]);
        assert_eq!(run_strategies(&urls(3), fetch).await.unwrap().len(), 2);

        let fetch = canned(vec![Ok("<feed><a></b></feed>".to_string())]);
        assert!(run_strategies(&urls(1), fetch).await.is_err());
    }

    #[tokio::test]
    async fn test_rate_limit_stops_strategies() {
        let fetch = canned(vec![
            Err(ScholarError::RateLimited("arXiv".to_string())),
            Ok(FEED.to_string()),
        ]);
        assert!(matches!(
            run_strategies(&urls(2), fetch).await,
            Err(ScholarError::RateLimited(_))
        ));
    }
}
