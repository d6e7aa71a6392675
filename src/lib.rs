//! # rustmultischolar
//!
//! Multi-platform CS literature aggregator: search six scholarly sources,
//! normalize their hits into one record shape, and merge duplicates across
//! platforms into a keyword-organized catalog.
//!
//! ## Modules
//!
//! - [`sources`] - DBLP, arXiv, Semantic Scholar, OpenAlex, Crossref and CORE adapters
//! - [`normalize`] - raw hit -> [`ArticleRecord`]
//! - [`bibtex`] - citation key and BibTeX synthesis
//! - [`dedup`] - first-occurrence filter within one platform
//! - [`merge`] - cross-source merge keyed by normalized title
//! - [`index`] - keyword grouping and recency ranking
//! - [`catalog`] - plain-text catalog writer and parser
//! - [`export`] - CSV export
//! - [`pipeline`] - search and combine runs
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustmultischolar::pipeline::{run_combine, CombineConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     if let Some(summary) = run_combine(&CombineConfig::default())? {
//!         println!("{} unique articles", summary.unique_records);
//!     }
//!     Ok(())
//! }
//! ```

pub mod bibtex;
pub mod catalog;
pub mod dedup;
pub mod error;
pub mod export;
pub mod index;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod sources;

pub use error::{Result, ScholarError};
pub use record::{ArticleRecord, TitleKey};
