use crate::error::{DigestError, Result};
use crate::services::summarizer::SummarizationService;
use crate::types::SummarizerConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Summarization over a Hugging Face style inference endpoint.
pub struct HttpSummarizer {
    client: reqwest::Client,
    url: Url,
    api_token: Option<String>,
    generation: GenerationSettings,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
struct GenerationSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_beams: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    length_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    no_repeat_ngram_size: Option<u32>,
}

#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    inputs: &'a str,
    parameters: SummaryParameters,
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct SummaryParameters {
    min_length: usize,
    max_length: usize,
    #[serde(flatten)]
    generation: GenerationSettings,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpSummarizer {
    pub fn new(config: &SummarizerConfig) -> Result<Self> {
        let url = Self::model_url(&config.endpoint, &config.model)?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            url,
            api_token: config.api_token.clone(),
            generation: GenerationSettings {
                num_beams: config.num_beams,
                length_penalty: config.length_penalty,
                no_repeat_ngram_size: config.no_repeat_ngram_size,
            },
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn model_url(endpoint: &str, model: &str) -> Result<Url> {
        if model.trim().is_empty() {
            return Err(DigestError::Config {
                reason: "Model name cannot be empty".to_string(),
            });
        }

        let base = Url::parse(&format!("{}/", endpoint.trim_end_matches('/')))?;
        Ok(base.join(&format!("models/{}", model.trim()))?)
    }
}

#[async_trait]
impl SummarizationService for HttpSummarizer {
    async fn summarize(&self, text: &str, min_length: usize, max_length: usize) -> Result<String> {
        let request = SummaryRequest {
            inputs: text,
            parameters: SummaryParameters {
                min_length,
                max_length,
                generation: self.generation,
            },
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        debug!("POST {} ({} chars)", self.url, text.chars().count());

        let mut builder = self.client.post(self.url.clone()).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(DigestError::Summarization {
                reason: format!("service answered {}: {}", status.as_u16(), detail.trim()),
            });
        }

        parse_summary_response(&body)
    }
}

/// Extract the summary from a `[{"summary_text": ...}]` response body.
fn parse_summary_response(body: &str) -> Result<String> {
    if let Ok(error) = serde_json::from_str::<ErrorBody>(body) {
        return Err(DigestError::Summarization {
            reason: error.error,
        });
    }

    let items: Vec<SummaryItem> =
        serde_json::from_str(body).map_err(|e| DigestError::Summarization {
            reason: format!("unexpected response shape: {}", e),
        })?;

    items
        .into_iter()
        .next()
        .and_then(|item| item.summary_text)
        .ok_or_else(|| DigestError::Summarization {
            reason: "response did not contain a summary_text".to_string(),
        })
}
