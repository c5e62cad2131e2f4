pub mod client;
pub mod fetcher;
pub mod parser;
pub mod segmenter;
pub mod summarizer;

pub use client::HttpSummarizer;
pub use fetcher::{ContentFetcher, DEFAULT_MAX_INPUT_BYTES};
pub use parser::PageParser;
pub use segmenter::{SectionHits, SectionRule, Segmenter};
pub use summarizer::{SectionSummarizer, SummarizationService};
