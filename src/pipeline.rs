//! Search and combine pipelines.
//!
//! Search: keywords -> six sources -> normalized records -> one catalog file
//! per platform. Combine: platform files -> parse -> merge -> keyword index ->
//! combined catalog (and optionally CSV).

use crate::catalog::{parse_catalog, write_combined_catalog, write_platform_catalog, KeywordSection};
use crate::dedup::dedup_by_title;
use crate::error::{OptionExt, Result, ScholarError};
use crate::export::write_csv;
use crate::index::KeywordIndex;
use crate::merge::merge_all;
use crate::normalize::normalize_batch;
use crate::record::{normalize_keyword, ArticleRecord};
use crate::sources::{SearchClient, SearchOptions, Source};
use rand::Rng;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default directory for platform catalogs
pub const DEFAULT_OUTPUT_DIR: &str = "./results";

/// Default file name of the combined catalog
pub const COMBINED_FILE_NAME: &str = "combined_all_platforms.txt";

/// Options for [`run_search`]
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Keywords in search order
    pub keywords: Vec<String>,
    /// Directory receiving one catalog per platform
    pub output_dir: PathBuf,
    pub options: SearchOptions,
    /// Random pause between keywords, in milliseconds
    pub keyword_pause_ms: RangeInclusive<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            options: SearchOptions::default(),
            keyword_pause_ms: 1000..=2000,
        }
    }
}

/// Options for [`run_combine`]
#[derive(Debug, Clone)]
pub struct CombineConfig {
    /// Directory holding the platform catalogs
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    /// Also export the merged records as CSV
    pub csv: Option<PathBuf>,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_file: Path::new(DEFAULT_OUTPUT_DIR).join(COMBINED_FILE_NAME),
            csv: None,
        }
    }
}

/// Outcome of a combine run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineSummary {
    pub files_processed: usize,
    pub records_before: usize,
    pub unique_records: usize,
    pub keywords: usize,
    pub output_file: PathBuf,
}

/// Per-platform accumulator: platform -> keyword sections in search order.
#[derive(Debug, Default)]
pub struct PlatformBatch {
    platforms: BTreeMap<Source, Vec<KeywordSection>>,
}

impl PlatformBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one (source, keyword) result. Empty results still open a section.
    pub fn add(&mut self, source: Source, keyword: &str, records: Vec<ArticleRecord>) {
        let keyword = normalize_keyword(keyword);
        let sections = self.platforms.entry(source).or_default();
        match sections.iter_mut().find(|s| s.keyword == keyword) {
            Some(section) => section.records.extend(records),
            None => sections.push(KeywordSection::new(keyword, records)),
        }
    }

    /// Sections gathered so far for one platform
    pub fn sections(&self, source: Source) -> &[KeywordSection] {
        self.platforms.get(&source).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn total_records(&self) -> usize {
        self.platforms
            .values()
            .flatten()
            .map(|s| s.records.len())
            .sum()
    }

    /// Platforms in source order with every keyword section deduplicated.
    pub fn into_deduplicated(self) -> Vec<(Source, Vec<KeywordSection>)> {
        self.platforms
            .into_iter()
            .map(|(source, sections)| {
                let sections = sections
                    .into_iter()
                    .map(|s| KeywordSection::new(s.keyword, dedup_by_title(s.records)))
                    .collect();
                (source, sections)
            })
            .collect()
    }
}

/// Search every keyword on every source and write the platform catalogs.
///
/// Returns the written file paths in source order.
pub async fn run_search(config: &SearchConfig) -> Result<Vec<PathBuf>> {
    if config.keywords.iter().all(|k| k.trim().is_empty()) {
        return Err(ScholarError::Validation("No search keywords given".to_string()));
    }

    let client = SearchClient::new(config.options.clone())?;
    let keywords: Vec<&str> = config
        .keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();

    info!(
        keywords = keywords.len(),
        max_results = config.options.max_results,
        "Searching all platforms"
    );

    let mut batch = PlatformBatch::new();
    for (idx, keyword) in keywords.iter().enumerate() {
        info!(keyword, progress = %format!("{}/{}", idx + 1, keywords.len()), "Searching keyword");

        for (source, hits) in client.search_all(keyword).await {
            batch.add(source, keyword, normalize_batch(hits, keyword));
        }

        if idx + 1 < keywords.len() {
            pause(&config.keyword_pause_ms).await;
        }
    }

    info!(records = batch.total_records(), "Search complete");
    write_platform_files(batch, &config.output_dir)
}

/// Deduplicate each platform's sections and write `<dir>/<stem>.txt`.
pub fn write_platform_files(batch: PlatformBatch, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for (source, sections) in batch.into_deduplicated() {
        let path = output_dir.join(format!("{}.txt", source.file_stem()));
        let mut w = BufWriter::new(File::create(&path)?);
        write_platform_catalog(&mut w, source.display_name(), &sections)?;
        w.flush()?;

        info!(platform = %source, path = %path.display(), "Saved platform catalog");
        written.push(path);
    }
    Ok(written)
}

/// Merge every platform catalog in `input_dir` into the combined catalog.
///
/// Returns `None` when there is nothing to combine.
pub fn run_combine(config: &CombineConfig) -> Result<Option<CombineSummary>> {
    if !config.input_dir.is_dir() {
        warn!(dir = %config.input_dir.display(), "Input directory not found");
        return Ok(None);
    }

    let files = discover_platform_files(&config.input_dir, &config.output_file)?;
    if files.is_empty() {
        warn!(dir = %config.input_dir.display(), "No platform files to combine");
        return Ok(None);
    }

    let mut records = Vec::new();
    let mut processed = 0;
    for path in &files {
        let platform = match platform_from_path(path) {
            Ok(platform) => platform,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping platform file with unusable name");
                continue;
            }
        };
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable platform file");
                continue;
            }
        };

        let before = records.len();
        for section in parse_catalog(&text) {
            for mut record in section.records {
                record.add_platform(&platform);
                records.push(record);
            }
        }
        processed += 1;
        info!(file = %path.display(), platform = %platform, records = records.len() - before, "Parsed platform file");
    }

    let records_before = records.len();
    let catalog = merge_all(records);
    let index = KeywordIndex::build(catalog.records());

    if let Some(parent) = config.output_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut w = BufWriter::new(File::create(&config.output_file)?);
    write_combined_catalog(&mut w, &index, processed)?;
    w.flush()?;

    info!(
        path = %config.output_file.display(),
        unique = index.total_records(),
        keywords = index.keyword_count(),
        "Saved combined catalog"
    );
    for (keyword, count) in index.counts() {
        debug!(keyword, count, "Articles per keyword");
    }

    if let Some(csv_path) = &config.csv {
        write_csv(csv_path, catalog.records())?;
    }

    Ok(Some(CombineSummary {
        files_processed: processed,
        records_before,
        unique_records: index.total_records(),
        keywords: index.keyword_count(),
        output_file: config.output_file.clone(),
    }))
}

/// `*.txt` files in `dir` other than the combined output, sorted by file name.
pub fn discover_platform_files(dir: &Path, output_file: &Path) -> Result<Vec<PathBuf>> {
    let excluded = output_file.file_name();

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .filter(|p| p.file_name() != excluded)
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Platform name for a catalog file, derived from its stem.
///
/// Known stems map to the source's display name; others are title-cased with
/// underscores as spaces.
pub fn platform_from_path(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_parse("Catalog file name is not valid UTF-8")?;

    Ok(match Source::from_file_stem(stem) {
        Some(source) => source.display_name().to_string(),
        None => title_case(&stem.replace('_', " ")),
    })
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

async fn pause(range_ms: &RangeInclusive<u64>) {
    if range_ms.is_empty() {
        return;
    }
    let delay = rand::thread_rng().gen_range(range_ms.clone());
    debug!(delay_ms = delay, "Pausing between keywords");
    tokio::time::sleep(Duration::from_millis(delay)).await;
}
