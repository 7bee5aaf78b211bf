//! Document loading.
//!
//! Loads raw tagging documents for the CLI from a local path or an
//! HTTP(S) URL. Parsing itself never touches the filesystem or network;
//! this module is the caller side of that boundary.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::config::FetchConfig;
use crate::parse::DocumentFormat;

/// Errors that can occur while loading a document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Content too large: {size} bytes (max {max_size})")]
    ContentTooLarge { size: usize, max_size: usize },

    #[error("Document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Path(PathBuf),
    Url(Url),
}

impl DocumentSource {
    /// Interpret a CLI argument: `http(s)://` is a URL, anything else a path.
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        let lower = input.trim().to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url =
                Url::parse(input.trim()).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
            Ok(DocumentSource::Url(url))
        } else {
            Ok(DocumentSource::Path(PathBuf::from(input)))
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Path(path) => write!(f, "{}", path.display()),
            DocumentSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// A document read into memory.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub source: DocumentSource,
    pub content: String,

    /// Format implied by the file extension or `Content-Type`
    pub format_hint: Option<DocumentFormat>,
}

impl LoadedDocument {
    /// Hinted format, else sniffed from the content.
    pub fn format(&self) -> Option<DocumentFormat> {
        self.format_hint
            .or_else(|| DocumentFormat::detect(&self.content))
    }
}

/// Configuration for the document fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Maximum content size to load (default 50MB)
    pub max_content_size: usize,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for FetcherConfig {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_content_size: config.max_content_bytes,
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Loads documents from disk or over HTTP.
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("gaa-stats")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Load a document from any source.
    pub async fn load(&self, source: &DocumentSource) -> Result<LoadedDocument, FetchError> {
        match source {
            DocumentSource::Path(path) => self.load_path(path).await,
            DocumentSource::Url(url) => self.load_url(url).await,
        }
    }

    /// Read a local file.
    pub async fn load_path(&self, path: &Path) -> Result<LoadedDocument, FetchError> {
        let size = fs::metadata(path).await?.len() as usize;
        self.check_size(size)?;

        let content = fs::read_to_string(path).await?;
        debug!("Read {} bytes from {}", content.len(), path.display());

        Ok(LoadedDocument {
            source: DocumentSource::Path(path.to_path_buf()),
            content,
            format_hint: DocumentFormat::from_extension(path),
        })
    }

    /// Download a document.
    pub async fn load_url(&self, url: &Url) -> Result<LoadedDocument, FetchError> {
        info!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        if let Some(length) = response.content_length() {
            self.check_size(length as usize)?;
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response.bytes().await?;
        self.check_size(bytes.len())?;
        let content = String::from_utf8(bytes.to_vec())?;

        let format_hint = content_type
            .as_deref()
            .and_then(DocumentFormat::from_content_type)
            .or_else(|| DocumentFormat::from_extension(Path::new(url.path())));

        Ok(LoadedDocument {
            source: DocumentSource::Url(url.clone()),
            content,
            format_hint,
        })
    }

    fn check_size(&self, size: usize) -> Result<(), FetchError> {
        if size > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge {
                size,
                max_size: self.config.max_content_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config() -> FetcherConfig {
        FetcherConfig {
            max_content_size: 1024,
            timeout: Duration::from_secs(10),
            user_agent: "test-agent".to_string(),
        }
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            DocumentSource::parse("matches/final.xml").unwrap(),
            DocumentSource::Path(PathBuf::from("matches/final.xml"))
        );

        match DocumentSource::parse("HTTPS://example.com/tags/final.json").unwrap() {
            DocumentSource::Url(url) => assert_eq!(url.path(), "/tags/final.json"),
            other => panic!("expected URL, got {:?}", other),
        }

        assert!(matches!(
            DocumentSource::parse("http://"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_source_display() {
        let source = DocumentSource::parse("https://example.com/a.xml").unwrap();
        assert_eq!(source.to_string(), "https://example.com/a.xml");
    }

    #[test]
    fn test_loaded_document_format() {
        let hinted = LoadedDocument {
            source: DocumentSource::Path(PathBuf::from("a.json")),
            content: "<file/>".to_string(),
            format_hint: Some(DocumentFormat::Json),
        };
        assert_eq!(hinted.format(), Some(DocumentFormat::Json));

        let sniffed = LoadedDocument {
            format_hint: None,
            ..hinted
        };
        assert_eq!(sniffed.format(), Some(DocumentFormat::Xml));
    }

    #[test]
    fn test_fetcher_config_default() {
        let config = FetcherConfig::default();

        assert_eq!(config.max_content_size, 50 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("gaa-stats/"));
    }

    #[tokio::test]
    async fn test_load_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("final.xml");
        std::fs::write(&path, "<file><ALL_INSTANCES/></file>").unwrap();

        let fetcher = Fetcher::new(test_config()).unwrap();
        let doc = fetcher
            .load(&DocumentSource::Path(path.clone()))
            .await
            .unwrap();

        assert_eq!(doc.source, DocumentSource::Path(path));
        assert_eq!(doc.format_hint, Some(DocumentFormat::Xml));
        assert!(doc.content.starts_with("<file>"));
    }

    #[tokio::test]
    async fn test_load_path_too_large() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("huge.json");
        std::fs::write(&path, vec![b' '; 2048]).unwrap();

        let fetcher = Fetcher::new(test_config()).unwrap();
        let result = fetcher.load_path(&path).await;

        assert!(matches!(
            result,
            Err(FetchError::ContentTooLarge { size: 2048, max_size: 1024 })
        ));
    }

    #[tokio::test]
    async fn test_load_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = Fetcher::new(test_config()).unwrap();

        let result = fetcher.load_path(&temp_dir.path().join("absent.xml")).await;
        assert!(matches!(result, Err(FetchError::Io(_))));
    }
}
