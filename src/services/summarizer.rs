use crate::error::{DigestError, Result};
use crate::types::{
    DigestReport, OmissionReason, PageTextSource, SectionMap, SectionName, SectionOutcome,
    SectionRange, SectionReport, SummarizerConfig,
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// An abstractive summarizer bounded by a minimum and maximum output length.
#[async_trait]
pub trait SummarizationService: Send + Sync {
    async fn summarize(&self, text: &str, min_length: usize, max_length: usize) -> Result<String>;
}

pub struct SectionSummarizer<S> {
    service: S,
    config: SummarizerConfig,
}

impl<S: SummarizationService> SectionSummarizer<S> {
    pub fn new(service: S, config: SummarizerConfig) -> Result<Self> {
        Self::validate_config(&config)?;
        Ok(Self { service, config })
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    pub fn validate_config(config: &SummarizerConfig) -> Result<()> {
        if config.max_length == 0 {
            return Err(DigestError::Config {
                reason: "Maximum summary length must be greater than 0".to_string(),
            });
        }

        if config.min_length > config.max_length {
            return Err(DigestError::Config {
                reason: format!(
                    "Minimum summary length ({}) cannot exceed maximum ({})",
                    config.min_length, config.max_length
                ),
            });
        }

        if config.max_input_chars == 0 {
            return Err(DigestError::Config {
                reason: "Maximum input size must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Summarize the pages in `[start_page, end_page)`.
    ///
    /// `Ok(None)` means there was nothing to summarize: no start page, or only
    /// blank text in the range. Service failures come back as `Err`.
    pub async fn summarize_section<P: PageTextSource + ?Sized>(
        &self,
        pages: &P,
        start_page: Option<usize>,
        end_page: Option<usize>,
    ) -> Result<Option<String>> {
        let Some(start) = start_page else {
            return Ok(None);
        };

        let range = SectionRange::resolve(start, end_page, pages.page_count());
        if range.is_empty() {
            debug!("Range {} is empty, skipping", range);
            return Ok(None);
        }

        let text = Self::collect_text(pages, range);

        if text.trim().is_empty() {
            debug!("Range {} has no text, skipping", range);
            return Ok(None);
        }

        self.summarize_text(&text).await.map(Some)
    }

    pub async fn summarize_document<P: PageTextSource + Sync + ?Sized>(
        &self,
        source: &str,
        pages: &P,
        sections: &SectionMap,
    ) -> DigestReport {
        info!(
            "Summarizing sections of '{}' ({})",
            source,
            if self.config.concurrent { "concurrent" } else { "sequential" }
        );

        let results = if self.config.concurrent {
            let (introduction, methodology, conclusion) = tokio::join!(
                self.section_outcome(pages, sections, SectionName::Introduction),
                self.section_outcome(pages, sections, SectionName::Methodology),
                self.section_outcome(pages, sections, SectionName::Conclusion),
            );
            vec![introduction, methodology, conclusion]
        } else {
            let mut results = Vec::with_capacity(SectionName::ALL.len());
            for section in SectionName::ALL {
                results.push(self.section_outcome(pages, sections, section).await);
            }
            results
        };

        DigestReport {
            source: source.to_string(),
            total_pages: pages.page_count(),
            sections: *sections,
            results,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    async fn section_outcome<P: PageTextSource + Sync + ?Sized>(
        &self,
        pages: &P,
        sections: &SectionMap,
        section: SectionName,
    ) -> SectionReport {
        let Some(range) = sections.range(section, pages.page_count()) else {
            debug!("No {} section found", section);
            return SectionReport {
                section,
                outcome: SectionOutcome::Omitted {
                    reason: OmissionReason::NoSectionFound,
                },
            };
        };

        let outcome = match self
            .summarize_section(pages, sections.start(section), sections.end(section))
            .await
        {
            Ok(Some(summary)) => {
                info!("Summarized {} over pages {}", section, range);
                SectionOutcome::Summarized { range, summary }
            }
            Ok(None) => SectionOutcome::Omitted {
                reason: OmissionReason::EmptyRange,
            },
            Err(e) => {
                warn!("Failed to summarize {} over pages {}: {}", section, range, e);
                SectionOutcome::Failed {
                    range,
                    error: e.to_string(),
                }
            }
        };

        SectionReport { section, outcome }
    }

    fn collect_text<P: PageTextSource + ?Sized>(pages: &P, range: SectionRange) -> String {
        range.pages().map(|index| pages.page_text(index)).collect()
    }

    async fn summarize_text(&self, text: &str) -> Result<String> {
        let input = truncate_chars(text, self.config.max_input_chars);
        if input.len() < text.len() {
            debug!(
                "Truncated section text from {} to {} bytes",
                text.len(),
                input.len()
            );
        }

        let call = self
            .service
            .summarize(input, self.config.min_length, self.config.max_length);

        let summary = match tokio::time::timeout(self.config.timeout, call).await {
            Ok(Ok(summary)) => summary,
            Ok(Err(e @ DigestError::Summarization { .. })) => return Err(e),
            Ok(Err(e)) => {
                return Err(DigestError::Summarization {
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(DigestError::Summarization {
                    reason: format!("no response within {:?}", self.config.timeout),
                })
            }
        };

        if summary.trim().is_empty() {
            return Err(DigestError::Summarization {
                reason: "service returned an empty summary".to_string(),
            });
        }

        Ok(summary.trim().to_string())
    }
}

/// Longest prefix of `text` with at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records every request and fails for any text containing a poisoned word.
    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<(String, usize, usize)>>,
        poisoned: HashSet<&'static str>,
    }

    impl RecordingService {
        fn failing_on(word: &'static str) -> Self {
            Self {
                poisoned: HashSet::from([word]),
                ..Default::default()
            }
        }

        fn texts(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|c| c.0.clone()).collect()
        }
    }

    #[async_trait]
    impl SummarizationService for RecordingService {
        async fn summarize(&self, text: &str, min_length: usize, max_length: usize) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), min_length, max_length));

            if self.poisoned.iter().any(|w| text.contains(w)) {
                return Err(DigestError::HttpStatus { status: 503 });
            }
            Ok(format!("summary of {}", text))
        }
    }

    #[async_trait]
    impl<'a> SummarizationService for &'a RecordingService {
        async fn summarize(&self, text: &str, min_length: usize, max_length: usize) -> Result<String> {
            (**self).summarize(text, min_length, max_length).await
        }
    }

    struct SlowService;

    #[async_trait]
    impl SummarizationService for SlowService {
        async fn summarize(&self, _text: &str, _min: usize, _max: usize) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    struct BlankService;

    #[async_trait]
    impl SummarizationService for BlankService {
        async fn summarize(&self, _text: &str, _min: usize, _max: usize) -> Result<String> {
            Ok("  \n".to_string())
        }
    }

    fn summarizer(service: &RecordingService) -> SectionSummarizer<&RecordingService> {
        SectionSummarizer::new(service, SummarizerConfig::default()).unwrap()
    }

    fn scenario_a() -> Vec<&'static str> {
        vec![
            "...",
            "Introduction: we study X",
            "more intro",
            "Methodology: we do Y",
            "Conclusion: Z",
        ]
    }

    fn scenario_a_map() -> SectionMap {
        SectionMap {
            introduction: Some(1),
            methodology: Some(3),
            conclusion: Some(4),
        }
    }

    #[tokio::test]
    async fn absent_start_never_calls_the_service() {
        let service = RecordingService::default();
        let result = summarizer(&service)
            .summarize_section(&scenario_a(), None, Some(3))
            .await
            .unwrap();

        assert_eq!(result, None);
        assert!(service.texts().is_empty());
    }

    #[tokio::test]
    async fn blank_range_never_calls_the_service() {
        let service = RecordingService::default();
        let pages = vec!["Introduction", "  ", "\n\t", "Conclusion"];
        let result = summarizer(&service)
            .summarize_section(&pages, Some(1), Some(3))
            .await
            .unwrap();

        assert_eq!(result, None);
        assert!(service.texts().is_empty());
    }

    #[tokio::test]
    async fn concatenates_range_without_separators() {
        let service = RecordingService::default();
        let result = summarizer(&service)
            .summarize_section(&scenario_a(), Some(1), Some(3))
            .await
            .unwrap();

        assert_eq!(
            result.as_deref(),
            Some("summary of Introduction: we study Xmore intro")
        );
        let calls = service.calls.lock().unwrap();
        assert_eq!(calls[0].1, 60);
        assert_eq!(calls[0].2, 400);
    }

    #[tokio::test]
    async fn missing_end_runs_to_the_last_page() {
        let service = RecordingService::default();
        summarizer(&service)
            .summarize_section(&scenario_a(), Some(3), None)
            .await
            .unwrap();

        assert_eq!(service.texts(), vec!["Methodology: we do YConclusion: Z"]);
    }

    #[tokio::test]
    async fn inverted_range_is_empty() {
        let service = RecordingService::default();
        let result = summarizer(&service)
            .summarize_section(&scenario_a(), Some(3), Some(1))
            .await
            .unwrap();

        assert_eq!(result, None);
        assert!(service.texts().is_empty());
    }

    #[tokio::test]
    async fn ranges_chain_without_gaps_or_overlaps() {
        let service = RecordingService::default();
        let pages = scenario_a();
        let report = summarizer(&service)
            .summarize_document("a.txt", &pages, &scenario_a_map())
            .await;

        let ranges: Vec<SectionRange> = report
            .results
            .iter()
            .map(|r| match &r.outcome {
                SectionOutcome::Summarized { range, .. } => *range,
                other => panic!("unexpected outcome {:?}", other),
            })
            .collect();

        assert_eq!(
            ranges,
            vec![
                SectionRange { start: 1, end: 3 },
                SectionRange { start: 3, end: 4 },
                SectionRange { start: 4, end: 5 },
            ]
        );
        assert_eq!(
            service.texts(),
            vec![
                "Introduction: we study Xmore intro",
                "Methodology: we do Y",
                "Conclusion: Z",
            ]
        );
    }

    #[tokio::test]
    async fn no_sections_means_no_calls_and_no_summaries() {
        let service = RecordingService::default();
        let pages = vec!["a", "b", "c"];
        let report = summarizer(&service)
            .summarize_document("b.txt", &pages, &SectionMap::default())
            .await;

        assert!(service.texts().is_empty());
        assert!(report.results.iter().all(|r| r.outcome
            == SectionOutcome::Omitted {
                reason: OmissionReason::NoSectionFound
            }));
    }

    #[tokio::test]
    async fn lone_conclusion_runs_to_the_end() {
        let service = RecordingService::default();
        let pages = vec!["p0", "p1", "Conclusion", "p3", "p4"];
        let map = SectionMap {
            conclusion: Some(2),
            ..Default::default()
        };

        let report = summarizer(&service)
            .summarize_document("c.txt", &pages, &map)
            .await;

        assert_eq!(service.texts(), vec!["Conclusionp3p4"]);
        assert_eq!(
            report.outcome(SectionName::Conclusion),
            Some(&SectionOutcome::Summarized {
                range: SectionRange { start: 2, end: 5 },
                summary: "summary of Conclusionp3p4".to_string(),
            })
        );
        assert!(report.outcome(SectionName::Introduction).unwrap().summary().is_none());
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_others() {
        let service = RecordingService::failing_on("Methodology");
        let pages = scenario_a();
        let report = summarizer(&service)
            .summarize_document("d.txt", &pages, &scenario_a_map())
            .await;

        assert_eq!(service.texts().len(), 3);
        assert!(report.outcome(SectionName::Introduction).unwrap().summary().is_some());
        assert!(report.outcome(SectionName::Conclusion).unwrap().summary().is_some());

        match report.outcome(SectionName::Methodology).unwrap() {
            SectionOutcome::Failed { range, error } => {
                assert_eq!(*range, SectionRange { start: 3, end: 4 });
                assert!(error.contains("503"));
            }
            other => panic!("expected a failure, got {:?}", other),
        }
        assert_eq!(report.failure_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_mode_matches_sequential_mode() {
        let service = RecordingService::failing_on("Methodology");
        let config = SummarizerConfig {
            concurrent: true,
            ..Default::default()
        };
        let pages = scenario_a();
        let report = SectionSummarizer::new(&service, config)
            .unwrap()
            .summarize_document("d.txt", &pages, &scenario_a_map())
            .await;

        let order: Vec<SectionName> = report.results.iter().map(|r| r.section).collect();
        assert_eq!(order, SectionName::ALL.to_vec());
        assert!(report.outcome(SectionName::Methodology).unwrap().is_failure());
        assert_eq!(report.failure_count(), 1);
    }

    #[tokio::test]
    async fn blank_summary_is_a_failure() {
        let summarizer = SectionSummarizer::new(BlankService, SummarizerConfig::default()).unwrap();
        let err = summarizer
            .summarize_section(&scenario_a(), Some(0), None)
            .await
            .unwrap_err();

        assert!(matches!(err, DigestError::Summarization { .. }));
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let config = SummarizerConfig {
            timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let summarizer = SectionSummarizer::new(SlowService, config).unwrap();
        let err = summarizer
            .summarize_section(&scenario_a(), Some(0), None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no response within"));
    }

    #[tokio::test]
    async fn long_input_is_truncated_on_a_char_boundary() {
        let service = RecordingService::default();
        let config = SummarizerConfig {
            max_input_chars: 5,
            ..Default::default()
        };
        let pages = vec!["héllo wörld"];
        SectionSummarizer::new(&service, config)
            .unwrap()
            .summarize_section(&pages, Some(0), None)
            .await
            .unwrap();

        assert_eq!(service.texts(), vec!["héllo"]);
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        let inverted = SummarizerConfig {
            min_length: 500,
            max_length: 400,
            ..Default::default()
        };
        assert!(SectionSummarizer::new(BlankService, inverted).is_err());

        let zero = SummarizerConfig {
            min_length: 0,
            max_length: 0,
            ..Default::default()
        };
        assert!(SectionSummarizer::new(BlankService, zero).is_err());
    }
}
