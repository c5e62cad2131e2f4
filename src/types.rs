use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Read-only access to the extracted text of an ordered sequence of pages.
pub trait PageTextSource {
    fn page_count(&self) -> usize;

    /// Text of page `index`. Pages without extractable text, and indices past
    /// the end, yield an empty string.
    fn page_text(&self, index: usize) -> &str;
}

impl<S: AsRef<str>> PageTextSource for [S] {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_text(&self, index: usize) -> &str {
        self.get(index).map(|s| s.as_ref()).unwrap_or("")
    }
}

impl<S: AsRef<str>> PageTextSource for Vec<S> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_text(&self, index: usize) -> &str {
        self.as_slice().page_text(index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperPage {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperDocument {
    pub source: String,
    pub pages: Vec<PaperPage>,
    pub metadata: DocumentMetadata,
}

impl PageTextSource for PaperDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> &str {
        self.pages.get(index).map(|p| p.text.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub filename: String,
    pub source_type: SourceType,
    pub created_at: String,
    pub total_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SourceType {
    LocalFile,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionName {
    Introduction,
    Methodology,
    Conclusion,
}

impl SectionName {
    /// All sections in document order.
    pub const ALL: [SectionName; 3] = [
        SectionName::Introduction,
        SectionName::Methodology,
        SectionName::Conclusion,
    ];

    /// The section whose start closes this one, if any.
    pub fn following(self) -> Option<SectionName> {
        match self {
            SectionName::Introduction => Some(SectionName::Methodology),
            SectionName::Methodology => Some(SectionName::Conclusion),
            SectionName::Conclusion => None,
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionName::Introduction => "Introduction",
            SectionName::Methodology => "Methodology",
            SectionName::Conclusion => "Conclusion",
        };
        f.write_str(name)
    }
}

/// First page of each section, or `None` when no page matched it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMap {
    pub introduction: Option<usize>,
    pub methodology: Option<usize>,
    pub conclusion: Option<usize>,
}

impl SectionMap {
    pub fn start(&self, section: SectionName) -> Option<usize> {
        match section {
            SectionName::Introduction => self.introduction,
            SectionName::Methodology => self.methodology,
            SectionName::Conclusion => self.conclusion,
        }
    }

    pub fn set_start(&mut self, section: SectionName, page: Option<usize>) {
        match section {
            SectionName::Introduction => self.introduction = page,
            SectionName::Methodology => self.methodology = page,
            SectionName::Conclusion => self.conclusion = page,
        }
    }

    /// Exclusive end boundary for `section`: the start of the section that
    /// follows it in the chain. `None` means "to the end of the document".
    pub fn end(&self, section: SectionName) -> Option<usize> {
        section.following().and_then(|next| self.start(next))
    }

    /// Resolve the page range for `section` against a document of `page_count` pages.
    pub fn range(&self, section: SectionName, page_count: usize) -> Option<SectionRange> {
        self.start(section)
            .map(|start| SectionRange::resolve(start, self.end(section), page_count))
    }

    pub fn is_empty(&self) -> bool {
        SectionName::ALL.iter().all(|s| self.start(*s).is_none())
    }
}

/// Half-open page interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRange {
    pub start: usize,
    pub end: usize,
}

impl SectionRange {
    /// Missing ends run to `page_count`; ends past the document are clamped.
    pub fn resolve(start: usize, end: Option<usize>, page_count: usize) -> Self {
        let end = end.unwrap_or(page_count).min(page_count);
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn pages(&self) -> std::ops::Range<usize> {
        self.start..self.end.max(self.start)
    }
}

impl fmt::Display for SectionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OmissionReason {
    NoSectionFound,
    EmptyRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome {
    Summarized {
        range: SectionRange,
        summary: String,
    },
    Omitted {
        reason: OmissionReason,
    },
    Failed {
        range: SectionRange,
        error: String,
    },
}

impl SectionOutcome {
    pub fn summary(&self) -> Option<&str> {
        match self {
            SectionOutcome::Summarized { summary, .. } => Some(summary.as_str()),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SectionOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionReport {
    pub section: SectionName,
    pub outcome: SectionOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestReport {
    pub source: String,
    pub total_pages: usize,
    pub sections: SectionMap,
    pub results: Vec<SectionReport>,
    pub generated_at: String,
}

impl DigestReport {
    pub fn outcome(&self, section: SectionName) -> Option<&SectionOutcome> {
        self.results
            .iter()
            .find(|r| r.section == section)
            .map(|r| &r.outcome)
    }

    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failure()).count()
    }
}

pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MODEL: &str = "facebook/bart-large-cnn";

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub min_length: usize,
    pub max_length: usize,
    /// Longer section text is truncated before it is sent.
    pub max_input_chars: usize,
    pub timeout: Duration,
    pub concurrent: bool,
    pub endpoint: String,
    pub model: String,
    pub api_token: Option<String>,
    /// Beam search settings forwarded to the model; `None` leaves the endpoint default.
    pub num_beams: Option<u32>,
    pub length_penalty: Option<f64>,
    pub no_repeat_ngram_size: Option<u32>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            min_length: 60,
            max_length: 400,
            max_input_chars: 4096,
            timeout: Duration::from_secs(120),
            concurrent: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_token: None,
            num_beams: Some(4),
            length_penalty: Some(2.0),
            no_repeat_ngram_size: Some(3),
        }
    }
}
