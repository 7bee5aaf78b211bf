//! Match report model written by batch runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntityId, GameStatistics, MatchId};
use crate::parse::DocumentFormat;

/// Parsed statistics for one source document, plus where they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    /// Content hash of the source document
    pub id: MatchId,

    /// Path or URL the document was loaded from
    pub source: String,

    /// Format the document was parsed as
    pub format: DocumentFormat,

    /// When the report was produced
    pub generated_at: DateTime<Utc>,

    /// Aggregated statistics
    pub statistics: GameStatistics,
}

impl MatchReport {
    /// Create a report for a parsed document.
    pub fn new(
        document: &str,
        source: String,
        format: DocumentFormat,
        statistics: GameStatistics,
    ) -> Self {
        Self {
            id: EntityId::for_document(document),
            source,
            format,
            generated_at: Utc::now(),
            statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_id_from_document() {
        let doc = r#"[{"code":"Shot Own","time":3}]"#;
        let a = MatchReport::new(
            doc,
            "a.json".to_string(),
            DocumentFormat::Json,
            GameStatistics::default(),
        );
        let b = MatchReport::new(
            doc,
            "copy-of-a.json".to_string(),
            DocumentFormat::Json,
            GameStatistics::default(),
        );

        assert_eq!(a.id, b.id);
        assert_eq!(a.id, EntityId::for_document(doc));
    }

    #[test]
    fn test_report_serialization() {
        let report = MatchReport::new(
            "<file/>",
            "match.xml".to_string(),
            DocumentFormat::Xml,
            GameStatistics::default(),
        );

        let json = serde_json::to_string(&report).unwrap();
        let parsed: MatchReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, report.id);
        assert_eq!(parsed.format, DocumentFormat::Xml);
        assert_eq!(parsed.statistics, report.statistics);
        assert!(json.contains("\"format\":\"xml\""));
    }
}
