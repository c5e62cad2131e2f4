//! # Paper Digest Library
//!
//! Splits an extracted research paper into Introduction, Methodology and
//! Conclusion page ranges by heading keywords, then condenses each range with
//! a length-bounded abstractive summarizer.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use paper_digest::{
//!     ContentFetcher, HttpSummarizer, PageParser, SectionSummarizer, Segmenter, SummarizerConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Pages separated by form feeds, e.g. `pdftotext paper.pdf paper.txt`
//!     let (content, metadata) = ContentFetcher::fetch_content("paper.txt").await?;
//!     let document = PageParser::new(None)?.parse_document(&content, metadata)?;
//!
//!     let sections = Segmenter::new()?.segment(&document);
//!
//!     let config = SummarizerConfig {
//!         api_token: std::env::var("HF_API_TOKEN").ok(),
//!         ..Default::default()
//!     };
//!     let summarizer = SectionSummarizer::new(HttpSummarizer::new(&config)?, config)?;
//!     let report = summarizer
//!         .summarize_document(&document.source, &document, &sections)
//!         .await;
//!
//!     for result in &report.results {
//!         if let Some(summary) = result.outcome.summary() {
//!             println!("{}: {}", result.section, summary);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod services;
pub mod types;

// Re-export main types and services for easier usage
pub use error::{DigestError, Result};
pub use services::{
    ContentFetcher, HttpSummarizer, PageParser, SectionHits, SectionRule, SectionSummarizer,
    Segmenter, SummarizationService,
};
pub use types::{
    DigestReport, DocumentMetadata, OmissionReason, PageTextSource, PaperDocument, PaperPage,
    SectionMap, SectionName, SectionOutcome, SectionRange, SectionReport, SourceType,
    SummarizerConfig,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fetch `source` and split it into pages. Any failure here is fatal to a run.
pub async fn load_document(source: &str, page_marker: Option<&str>) -> Result<PaperDocument> {
    let parser = PageParser::new(page_marker)?;
    let (content, metadata) = ContentFetcher::fetch_content(source).await?;
    parser.parse_document(&content, metadata)
}
