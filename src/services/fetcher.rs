use crate::error::{DigestError, Result};
use crate::types::{DocumentMetadata, SourceType};
use std::path::Path;
use tokio::fs;
use tracing::info;
use url::Url;

/// Inputs above 20 MB are refused.
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 20 * 1024 * 1024;

pub struct ContentFetcher;

impl ContentFetcher {
    pub async fn fetch_content(source: &str) -> Result<(String, DocumentMetadata)> {
        Self::fetch_content_with_limit(source, DEFAULT_MAX_INPUT_BYTES).await
    }

    pub async fn fetch_content_with_limit(
        source: &str,
        max_input_bytes: u64,
    ) -> Result<(String, DocumentMetadata)> {
        if Self::is_url(source) {
            Self::fetch_from_url(source, max_input_bytes).await
        } else {
            Self::fetch_from_file(source, max_input_bytes).await
        }
    }

    async fn fetch_from_url(url: &str, max_input_bytes: u64) -> Result<(String, DocumentMetadata)> {
        info!("Fetching document from URL: {}", url);

        let parsed_url = Url::parse(url)?;
        let response = reqwest::Client::new().get(url).send().await?;

        if !response.status().is_success() {
            return Err(DigestError::HttpStatus {
                status: response.status().as_u16(),
            });
        }

        if let Some(length) = response.content_length() {
            Self::check_size(length, max_input_bytes, url)?;
        }

        let bytes = response.bytes().await?;
        Self::check_size(bytes.len() as u64, max_input_bytes, url)?;
        let content = Self::decode(&bytes, url)?;

        let metadata = DocumentMetadata {
            filename: Self::extract_filename_from_url(&parsed_url),
            source_type: SourceType::Url,
            created_at: chrono::Utc::now().to_rfc3339(),
            total_chars: 0, // Filled in by the parser
        };

        Ok((content, metadata))
    }

    async fn fetch_from_file(file_path: &str, max_input_bytes: u64) -> Result<(String, DocumentMetadata)> {
        info!("Reading file: {}", file_path);

        let path = Path::new(file_path);

        if !path.is_file() {
            return Err(DigestError::FileNotFound {
                path: file_path.to_string(),
            });
        }

        let size = fs::metadata(path).await?.len();
        Self::check_size(size, max_input_bytes, file_path)?;

        let bytes = fs::read(path).await?;
        let content = Self::decode(&bytes, file_path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let metadata = DocumentMetadata {
            filename,
            source_type: SourceType::LocalFile,
            created_at: chrono::Utc::now().to_rfc3339(),
            total_chars: 0,
        };

        Ok((content, metadata))
    }

    fn check_size(size: u64, max_input_bytes: u64, source: &str) -> Result<()> {
        if size > max_input_bytes {
            return Err(DigestError::InputFailure {
                reason: format!(
                    "'{}' is {} bytes, over the {} byte limit",
                    source, size, max_input_bytes
                ),
            });
        }
        Ok(())
    }

    /// Page text must already be extracted; raw PDF bytes are rejected.
    fn decode(bytes: &[u8], source: &str) -> Result<String> {
        if bytes.starts_with(b"%PDF-") {
            return Err(DigestError::InputFailure {
                reason: format!(
                    "'{}' is a PDF; extract its text first (e.g. `pdftotext {} -`)",
                    source, source
                ),
            });
        }

        String::from_utf8(bytes.to_vec()).map_err(|e| DigestError::InputFailure {
            reason: format!("'{}' is not valid UTF-8 text: {}", source, e),
        })
    }

    fn is_url(source: &str) -> bool {
        source.starts_with("http://") || source.starts_with("https://")
    }

    fn extract_filename_from_url(url: &Url) -> String {
        url.path_segments()
            .and_then(|segments| segments.last())
            .and_then(|name| if name.is_empty() { None } else { Some(name) })
            .unwrap_or("downloaded.txt")
            .to_string()
    }

    pub async fn validate_sources(sources: &[String]) -> Result<Vec<String>> {
        let mut validated = Vec::new();

        for source in sources {
            if Self::is_url(source) {
                Url::parse(source)?;
                validated.push(source.clone());
            } else if Path::new(source).is_file() {
                validated.push(source.clone());
            } else {
                return Err(DigestError::FileNotFound {
                    path: source.clone(),
                });
            }
        }

        Ok(validated)
    }
}
