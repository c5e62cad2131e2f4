use clap::{Args, Parser, Subcommand};
use paper_digest::types::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "paper-digest")]
#[command(about = "Summarize the introduction, methodology and conclusion of a research paper")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect sections and summarize each one
    Summarize(SummarizeArgs),

    /// Detect sections without summarizing
    Sections(SectionsArgs),

    /// Validate input sources
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct SummarizeArgs {
    /// Extracted paper text (file path or URL), pages separated by form feeds
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Custom page break marker line instead of form feeds
    #[arg(long, value_name = "MARKER")]
    pub page_marker: Option<String>,

    /// Minimum summary length passed to the model
    #[arg(long, default_value = "60")]
    pub min_length: usize,

    /// Maximum summary length passed to the model
    #[arg(long, default_value = "400")]
    pub max_length: usize,

    /// Section text beyond this many characters is truncated
    #[arg(long, default_value = "4096")]
    pub max_input_chars: usize,

    /// Seconds to wait for each summary
    #[arg(long, default_value = "120")]
    pub timeout_secs: u64,

    /// Summarize the three sections concurrently
    #[arg(long)]
    pub concurrent: bool,

    /// Inference endpoint base URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Summarization model name
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Beam count for generation
    #[arg(long, default_value = "4")]
    pub num_beams: u32,

    /// Length penalty for beam search
    #[arg(long, default_value = "2.0")]
    pub length_penalty: f64,

    /// Never repeat n-grams of this size in a summary
    #[arg(long, default_value = "3")]
    pub no_repeat_ngram_size: u32,

    /// API token for the inference endpoint
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Write the full report to a JSON file
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,
}

#[derive(Args)]
pub struct SectionsArgs {
    /// Extracted paper text (file path or URL), pages separated by form feeds
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Custom page break marker line instead of form feeds
    #[arg(long, value_name = "MARKER")]
    pub page_marker: Option<String>,

    /// Output analysis to JSON file
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,

    /// Show every page that matched each section
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Input sources (file paths or URLs)
    #[arg(required = true, value_name = "SOURCE")]
    pub sources: Vec<String>,

    /// Check that sources can be read and split into pages
    #[arg(long)]
    pub check_access: bool,
}
