//! Tagging document parsing.
//!
//! Reads a match-tagging export into normalized [`MatchEvent`]s and folds
//! them into [`GameStatistics`]:
//! - **xml**: Sportscode-style exports built from `<instance>` elements
//! - **json**: an event array, or an object with an `events` array
//!
//! Only structural problems are errors. Unknown codes and labels are
//! carried through and simply don't land in any statistic bucket.

mod json;
mod xml;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::aggregate;
use crate::models::{GameStatistics, MatchEvent};

/// Errors that can occur while parsing a tagging document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Event {event}: missing {field}")]
    MissingField { event: usize, field: &'static str },

    #[error("Event {event}: {field} is not a number: {value:?}")]
    InvalidNumber {
        event: usize,
        field: &'static str,
        value: String,
    },

    #[error("Could not detect document format (expected XML or JSON)")]
    UnknownFormat,

    #[error("Unknown format name: {0}")]
    UnknownFormatName(String),
}

/// Supported tagging document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Xml,
    Json,
}

impl DocumentFormat {
    /// Sniff the format from the first significant character.
    pub fn detect(document: &str) -> Option<Self> {
        let trimmed = document.trim_start_matches('\u{feff}').trim_start();
        match trimmed.chars().next()? {
            '<' => Some(DocumentFormat::Xml),
            '[' | '{' => Some(DocumentFormat::Json),
            _ => None,
        }
    }

    /// Format implied by a file extension, case-insensitive.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xml" => Some(DocumentFormat::Xml),
            "json" => Some(DocumentFormat::Json),
            _ => None,
        }
    }

    /// Format implied by an HTTP `Content-Type` header.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.to_ascii_lowercase();
        if mime.contains("json") {
            Some(DocumentFormat::Json)
        } else if mime.contains("xml") {
            Some(DocumentFormat::Xml)
        } else {
            None
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Xml => write!(f, "xml"),
            DocumentFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(DocumentFormat::Xml),
            "json" => Ok(DocumentFormat::Json),
            other => Err(ParseError::UnknownFormatName(other.to_string())),
        }
    }
}

/// Parse a tagging document, detecting its format.
pub fn parse(document: &str) -> Result<GameStatistics, ParseError> {
    let format = DocumentFormat::detect(document).ok_or(ParseError::UnknownFormat)?;
    parse_as(document, format)
}

/// Parse a tagging document in a declared format.
pub fn parse_as(document: &str, format: DocumentFormat) -> Result<GameStatistics, ParseError> {
    let events = read_events(document, format)?;
    debug!("Read {} events from {} document", events.len(), format);
    Ok(aggregate::aggregate(events))
}

/// Read the events of a document without aggregating them.
pub fn read_events(document: &str, format: DocumentFormat) -> Result<Vec<MatchEvent>, ParseError> {
    let document = document.trim_start_matches('\u{feff}');
    match format {
        DocumentFormat::Xml => xml::read_events(document),
        DocumentFormat::Json => json::read_events(document),
    }
}

/// A time value as it appeared in the document.
#[derive(Debug, Clone)]
enum RawTime {
    Seconds(f64),
    Text(String),
}

/// Field values collected for one event before validation.
#[derive(Debug, Default)]
struct RawEvent {
    id: Option<String>,
    start: Option<RawTime>,
    end: Option<RawTime>,
    code: Option<String>,
    labels: Vec<String>,
}

impl RawEvent {
    /// Validate fields and build the event. `position` is 1-based.
    fn into_event(self, position: usize) -> Result<MatchEvent, ParseError> {
        let code = self
            .code
            .filter(|c| !c.is_empty())
            .ok_or(ParseError::MissingField {
                event: position,
                field: "code",
            })?;

        let start = self.start.ok_or(ParseError::MissingField {
            event: position,
            field: "start",
        })?;
        let start_time = seconds(start, position, "start")?;
        let end_time = match self.end {
            Some(end) => seconds(end, position, "end")?,
            None => start_time,
        };

        let id = self
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| position.to_string());

        let labels = self
            .labels
            .into_iter()
            .filter(|label| !label.is_empty())
            .collect::<Vec<_>>();

        Ok(MatchEvent::new(id, start_time, end_time, code).with_labels(labels))
    }
}

fn seconds(raw: RawTime, position: usize, field: &'static str) -> Result<f64, ParseError> {
    let invalid = |value: String| ParseError::InvalidNumber {
        event: position,
        field,
        value,
    };

    let value = match raw {
        RawTime::Seconds(value) => value,
        RawTime::Text(text) => match text.trim().parse::<f64>() {
            Ok(value) => value,
            Err(_) => return Err(invalid(text)),
        },
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(value.to_string()))
    }
}
