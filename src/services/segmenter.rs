use crate::error::{DigestError, Result};
use crate::types::{PageTextSource, SectionMap, SectionName};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One entry of the heading vocabulary: a page matching `pattern` starts `section`.
#[derive(Debug, Clone)]
pub struct SectionRule {
    pub section: SectionName,
    pub keywords: Vec<String>,
    pattern: Regex,
}

impl SectionRule {
    /// Builds a word-bounded alternation over `keywords`, matched against lower-cased text.
    pub fn new(section: SectionName, keywords: &[&str]) -> Result<Self> {
        if keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(DigestError::Config {
                reason: format!("Rule for {} needs at least one keyword", section),
            });
        }

        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();

        let alternation = keywords
            .iter()
            .map(|k| regex::escape(&k.to_lowercase()))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!(r"\b(?:{})\b", alternation)).map_err(|e| {
            DigestError::Config {
                reason: format!("Invalid keywords for {}: {}", section, e),
            }
        })?;

        Ok(Self {
            section,
            keywords,
            pattern,
        })
    }

    /// `text` is expected to be lower-cased already.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Every page index at which each section's rule fired, in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionHits {
    pub hits: BTreeMap<SectionName, Vec<usize>>,
}

impl SectionHits {
    pub fn pages(&self, section: SectionName) -> &[usize] {
        self.hits.get(&section).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn to_section_map(&self) -> SectionMap {
        let mut map = SectionMap::default();
        for section in SectionName::ALL {
            map.set_start(section, self.pages(section).iter().min().copied());
        }
        map
    }
}

/// Heading-keyword classifier over pages.
///
/// Rules are tried in list order and the first match claims the page, so a
/// page mentioning both "introduction" and "discussion" counts only towards
/// the Introduction.
pub struct Segmenter {
    rules: Vec<SectionRule>,
}

impl Segmenter {
    pub fn new() -> Result<Self> {
        Ok(Self::with_rules(Self::default_rules()?))
    }

    pub fn with_rules(rules: Vec<SectionRule>) -> Self {
        Self { rules }
    }

    pub fn default_rules() -> Result<Vec<SectionRule>> {
        Ok(vec![
            SectionRule::new(SectionName::Introduction, &["introduction", "abstract"])?,
            SectionRule::new(SectionName::Methodology, &["methods", "methodology"])?,
            SectionRule::new(
                SectionName::Conclusion,
                &["conclusion", "conclusions", "summary", "discussion"],
            )?,
        ])
    }

    pub fn rules(&self) -> &[SectionRule] {
        &self.rules
    }

    /// Keywords of every rule that can claim a page for `section`, in rule order.
    pub fn keywords(&self, section: SectionName) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.section == section)
            .flat_map(|rule| rule.keywords.iter().map(String::as_str))
            .collect()
    }

    /// The section claimed by a page, if any rule matches its text.
    pub fn classify_page(&self, text: &str) -> Option<SectionName> {
        if text.trim().is_empty() {
            return None;
        }

        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.section)
    }

    pub fn collect_hits<P: PageTextSource + ?Sized>(&self, pages: &P) -> SectionHits {
        let mut hits = SectionHits::default();

        for index in 0..pages.page_count() {
            if let Some(section) = self.classify_page(pages.page_text(index)) {
                debug!("Page {} classified as {}", index, section);
                hits.hits.entry(section).or_default().push(index);
            }
        }

        hits
    }

    pub fn segment<P: PageTextSource + ?Sized>(&self, pages: &P) -> SectionMap {
        let map = self.collect_hits(pages).to_section_map();

        info!(
            "Segmented {} pages: introduction={:?}, methodology={:?}, conclusion={:?}",
            pages.page_count(),
            map.introduction,
            map.methodology,
            map.conclusion
        );

        map
    }
}
