use crate::error::{DigestError, Result};
use crate::types::{DocumentMetadata, PaperDocument, PaperPage};
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info};

/// Splits extracted document text into pages.
///
/// By default pages are separated by form feeds, which is what `pdftotext`
/// writes between pages. A custom marker replaces that with a literal line.
pub struct PageParser {
    page_break: Regex,
}

impl PageParser {
    pub fn new(custom_page_marker: Option<&str>) -> Result<Self> {
        let page_break = match custom_page_marker {
            Some(marker) if marker.trim().is_empty() => {
                return Err(DigestError::Config {
                    reason: "Custom page marker cannot be empty".to_string(),
                });
            }
            Some(marker) => Regex::new(&format!(r"(?m)^[ \t]*{}[ \t]*(?:\r?\n|\z)", regex::escape(marker.trim())))
                .map_err(|e| DigestError::Config {
                    reason: format!("Invalid custom page marker: {}", e),
                })?,
            None => Regex::new(r"\x0C").map_err(|e| DigestError::Config {
                reason: format!("Invalid page break pattern: {}", e),
            })?,
        };

        Ok(Self { page_break })
    }

    pub fn parse_document(&self, content: &str, mut metadata: DocumentMetadata) -> Result<PaperDocument> {
        info!("Parsing document: {}", metadata.filename);

        let mut texts: Vec<&str> = self.page_break.split(content).collect();

        // A separator after the last page leaves one empty trailing chunk.
        if texts.len() > 1 && texts.last().is_some_and(|t| t.trim().is_empty()) {
            texts.pop();
        }

        if texts.iter().all(|t| t.trim().is_empty()) {
            return Err(DigestError::InputFailure {
                reason: format!("No extractable text found in '{}'", metadata.filename),
            });
        }

        let pages: Vec<PaperPage> = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| PaperPage {
                index,
                text: text.to_string(),
            })
            .collect();

        metadata.total_chars = pages.iter().map(|p| p.text.chars().count()).sum();
        debug!("Found {} pages in document", pages.len());

        Ok(PaperDocument {
            source: metadata.filename.clone(),
            pages,
            metadata,
        })
    }

    pub fn get_parsing_stats(&self, document: &PaperDocument) -> HashMap<String, serde_json::Value> {
        let mut stats = HashMap::new();

        let total_pages = document.pages.len();
        stats.insert("total_pages".to_string(), total_pages.into());
        stats.insert("total_chars".to_string(), document.metadata.total_chars.into());

        let empty_pages = document.pages.iter().filter(|p| p.text.trim().is_empty()).count();
        stats.insert("empty_pages".to_string(), empty_pages.into());

        let avg_chars_per_page = if total_pages > 0 {
            document.metadata.total_chars as f64 / total_pages as f64
        } else {
            0.0
        };
        stats.insert("avg_chars_per_page".to_string(), avg_chars_per_page.into());

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PageTextSource, SourceType};

    fn metadata() -> DocumentMetadata {
        DocumentMetadata {
            filename: "paper.txt".to_string(),
            source_type: SourceType::LocalFile,
            created_at: chrono::Utc::now().to_rfc3339(),
            total_chars: 0,
        }
    }

    #[test]
    fn splits_on_form_feed_and_drops_trailing_page() {
        let parser = PageParser::new(None).unwrap();
        let document = parser
            .parse_document("Title page\n\x0CIntroduction\nwe study X\n\x0C\x0CConclusion\n\x0C", metadata())
            .unwrap();

        assert_eq!(document.page_count(), 4);
        assert_eq!(document.page_text(0), "Title page\n");
        assert_eq!(document.page_text(2), "");
        assert_eq!(document.page_text(3), "Conclusion\n");
        assert_eq!(document.pages[3].index, 3);
    }

    #[test]
    fn text_without_separators_is_one_page() {
        let parser = PageParser::new(None).unwrap();
        let document = parser.parse_document("just one page", metadata()).unwrap();

        assert_eq!(document.page_count(), 1);
        assert_eq!(document.metadata.total_chars, 13);
    }

    #[test]
    fn custom_marker_is_matched_literally_on_its_own_line() {
        let parser = PageParser::new(Some("<!-- PAGE -->")).unwrap();
        let content = "first\n<!-- PAGE -->\nsecond\n  <!-- PAGE -->  \nthird";
        let document = parser.parse_document(content, metadata()).unwrap();

        assert_eq!(document.page_count(), 3);
        assert_eq!(document.page_text(1), "second\n");
        assert_eq!(document.page_text(2), "third");
    }

    #[test]
    fn marker_must_fill_the_whole_line() {
        let parser = PageParser::new(Some("Page")).unwrap();
        let content = "Intro\nPage\nPage numbering is hard\nSee the Page here\nMore";
        let document = parser.parse_document(content, metadata()).unwrap();

        assert_eq!(document.page_count(), 2);
        assert_eq!(document.page_text(0), "Intro\n");
        assert_eq!(
            document.page_text(1),
            "Page numbering is hard\nSee the Page here\nMore"
        );
    }

    #[test]
    fn marker_on_the_last_line_ends_the_document() {
        let parser = PageParser::new(Some("<!-- PAGE -->")).unwrap();
        let document = parser
            .parse_document("first\n<!-- PAGE -->\nsecond\n<!-- PAGE -->", metadata())
            .unwrap();

        assert_eq!(document.page_count(), 2);
        assert_eq!(document.page_text(1), "second\n");
    }

    #[test]
    fn blank_document_is_an_input_failure() {
        let parser = PageParser::new(None).unwrap();
        let err = parser.parse_document(" \n\x0C\t\x0C", metadata()).unwrap_err();

        assert!(matches!(err, DigestError::InputFailure { .. }));
    }

    #[test]
    fn empty_marker_is_rejected() {
        assert!(matches!(
            PageParser::new(Some("  ")),
            Err(DigestError::Config { .. })
        ));
    }

    #[test]
    fn stats_count_empty_pages() {
        let parser = PageParser::new(None).unwrap();
        let document = parser.parse_document("abcd\x0C\x0Cefgh", metadata()).unwrap();
        let stats = parser.get_parsing_stats(&document);

        assert_eq!(stats["total_pages"].as_u64(), Some(3));
        assert_eq!(stats["empty_pages"].as_u64(), Some(1));
        assert_eq!(stats["total_chars"].as_u64(), Some(8));
    }
}
