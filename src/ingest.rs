//! Ingestion pipeline.
//!
//! Loads tagging documents, parses them into [`MatchReport`]s and runs
//! batches concurrently. Each document is independent, so a batch is a
//! bounded fan-out of load + parse tasks; one bad file never stops the rest.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::fetch::{DocumentSource, FetchError, Fetcher, LoadedDocument};
use crate::models::{GameStatistics, MatchReport};
use crate::parse::{self, DocumentFormat, ParseError};

/// Errors from loading or parsing one document.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Load failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Successful reports, in input order
    pub reports: Vec<MatchReport>,

    /// Failures as (source, message), in input order
    pub errors: Vec<(String, String)>,
}

/// Parse a loaded document into a report.
///
/// `format` overrides the document's hinted or sniffed format.
pub fn build_report(
    document: &LoadedDocument,
    format: Option<DocumentFormat>,
) -> Result<MatchReport, ParseError> {
    let format = format
        .or_else(|| document.format())
        .ok_or(ParseError::UnknownFormat)?;
    let statistics = parse::parse_as(&document.content, format)?;

    Ok(MatchReport::new(
        &document.content,
        document.source.to_string(),
        format,
        statistics,
    ))
}

/// Load and parse a single document.
///
/// Parsing runs on the blocking pool; large exports are CPU-bound.
pub async fn ingest_one(
    fetcher: &Fetcher,
    source: &DocumentSource,
    format: Option<DocumentFormat>,
) -> Result<MatchReport, IngestError> {
    let document = fetcher.load(source).await?;
    let report = tokio::task::spawn_blocking(move || build_report(&document, format)).await??;

    info!(
        "Parsed {} ({} events, {} codes)",
        report.source,
        report.statistics.total_events,
        report.statistics.events_by_code.len()
    );
    Ok(report)
}

/// Load and parse many documents, at most `max_concurrent` at a time.
pub async fn ingest_batch(
    fetcher: Arc<Fetcher>,
    sources: Vec<DocumentSource>,
    max_concurrent: usize,
) -> BatchResult {
    run_batch(sources, max_concurrent, move |source| {
        let fetcher = fetcher.clone();
        async move { ingest_one(&fetcher, &source, None).await }
    })
    .await
}

/// Run `work` over every source with bounded concurrency.
///
/// Each unit runs in its own task, so a panic is reported against its
/// source in `errors` instead of disappearing from the batch.
async fn run_batch<F, Fut>(
    sources: Vec<DocumentSource>,
    max_concurrent: usize,
    work: F,
) -> BatchResult
where
    F: Fn(DocumentSource) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<MatchReport, IngestError>> + Send + 'static,
{
    let work = Arc::new(work);
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = JoinSet::new();

    for (index, source) in sources.into_iter().enumerate() {
        let work = work.clone();
        let semaphore = semaphore.clone();
        tasks.spawn(async move {
            // The semaphore is never closed
            let _permit = semaphore.acquire_owned().await.ok();
            let outcome = match tokio::spawn(work(source.clone())).await {
                Ok(outcome) => outcome,
                Err(e) => Err(IngestError::Task(e)),
            };
            (index, source, outcome)
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => error!("Batch task failed: {}", e),
        }
    }
    outcomes.sort_by_key(|(index, _, _)| *index);

    let mut result = BatchResult::default();
    for (_, source, outcome) in outcomes {
        match outcome {
            Ok(report) => result.reports.push(report),
            Err(e) => {
                warn!("Skipping {}: {}", source, e);
                result.errors.push((source.to_string(), e.to_string()));
            }
        }
    }

    info!(
        "Batch complete: {} parsed, {} failed",
        result.reports.len(),
        result.errors.len()
    );
    result
}

/// Expand a glob pattern into sorted file paths.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, IngestError> {
    let mut paths = Vec::new();
    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => warn!("Unreadable path in glob: {}", e),
        }
    }
    paths.sort();
    Ok(paths)
}

/// Sum every report's statistics into season totals.
pub fn season_totals<'a, I>(reports: I) -> GameStatistics
where
    I: IntoIterator<Item = &'a MatchReport>,
{
    let mut totals = GameStatistics::default();
    for report in reports {
        totals.absorb(&report.statistics);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetcherConfig;
    use crate::models::EntityId;
    use tempfile::TempDir;

    const XML_MATCH: &str = "<file><ALL_INSTANCES>\
        <instance><ID>1</ID><start>598</start><end>652</end><code>Possession Own</code></instance>\
        <instance><ID>2</ID><start>650</start><end>651</end><code>Shot Own</code>\
        <label><text>From Play</text></label><label><text>Goal</text></label></instance>\
        </ALL_INSTANCES></file>";

    const JSON_MATCH: &str = r#"{"events": [
        {"id": 1, "startTime": 652, "endTime": 660, "code": "Possession Opp"},
        {"id": 2, "time": 700, "code": "Kickout Opp", "labels": ["Short", "Lost"]}
    ]}"#;

    fn fetcher() -> Arc<Fetcher> {
        Arc::new(Fetcher::new(FetcherConfig::default()).unwrap())
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_build_report_sniffs_format() {
        let document = LoadedDocument {
            source: DocumentSource::Path(PathBuf::from("export.dat")),
            content: JSON_MATCH.to_string(),
            format_hint: None,
        };

        let report = build_report(&document, None).unwrap();
        assert_eq!(report.format, DocumentFormat::Json);
        assert_eq!(report.source, "export.dat");
        assert_eq!(report.id, EntityId::for_document(JSON_MATCH));
        assert_eq!(report.statistics.kickouts.away.lost, 1);
    }

    #[test]
    fn test_build_report_format_override() {
        let document = LoadedDocument {
            source: DocumentSource::Path(PathBuf::from("export.json")),
            content: XML_MATCH.to_string(),
            format_hint: Some(DocumentFormat::Json),
        };

        // The hint is wrong; JSON parsing of XML fails structurally
        assert!(build_report(&document, None).is_err());

        let report = build_report(&document, Some(DocumentFormat::Xml)).unwrap();
        assert_eq!(report.statistics.shots.home.goals, 1);
    }

    #[test]
    fn test_build_report_unknown_format() {
        let document = LoadedDocument {
            source: DocumentSource::Path(PathBuf::from("notes.txt")),
            content: "Possession Own, 598, 652".to_string(),
            format_hint: None,
        };

        assert!(matches!(
            build_report(&document, None),
            Err(ParseError::UnknownFormat)
        ));
    }

    #[tokio::test]
    async fn test_ingest_batch_keeps_order_and_errors() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.xml", XML_MATCH);
        let b = write(&dir, "b.json", "[{\"code\": \"Shot Own\"");
        let c = write(&dir, "c.json", JSON_MATCH);

        let sources = vec![
            DocumentSource::Path(a),
            DocumentSource::Path(b.clone()),
            DocumentSource::Path(c),
        ];
        let result = ingest_batch(fetcher(), sources, 2).await;

        assert_eq!(result.reports.len(), 2);
        assert_eq!(result.reports[0].format, DocumentFormat::Xml);
        assert_eq!(result.reports[1].format, DocumentFormat::Json);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].0, b.display().to_string());
    }

    #[tokio::test]
    async fn test_batch_reports_panicked_task() {
        let sources = vec![
            DocumentSource::Path(PathBuf::from("a.json")),
            DocumentSource::Path(PathBuf::from("crash.json")),
            DocumentSource::Path(PathBuf::from("c.json")),
        ];

        let result = run_batch(sources, 2, |source| async move {
            if source.to_string() == "crash.json" {
                panic!("loader crashed");
            }
            let document = LoadedDocument {
                source,
                content: JSON_MATCH.to_string(),
                format_hint: None,
            };
            build_report(&document, None).map_err(IngestError::from)
        })
        .await;

        assert_eq!(result.reports.len(), 2);
        assert_eq!(result.reports[0].source, "a.json");
        assert_eq!(result.reports[1].source, "c.json");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].0, "crash.json");
        assert!(result.errors[0].1.contains("Task failed"));
    }

    #[tokio::test]
    async fn test_ingest_one_missing_file() {
        let dir = TempDir::new().unwrap();
        let source = DocumentSource::Path(dir.path().join("absent.xml"));

        let result = ingest_one(&fetcher(), &source, None).await;
        assert!(matches!(result, Err(IngestError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_season_totals() {
        let dir = TempDir::new().unwrap();
        let sources = vec![
            DocumentSource::Path(write(&dir, "a.xml", XML_MATCH)),
            DocumentSource::Path(write(&dir, "c.json", JSON_MATCH)),
        ];
        let result = ingest_batch(fetcher(), sources, 4).await;

        let totals = season_totals(&result.reports);
        assert_eq!(totals.total_events, 4);
        assert_eq!(totals.possession.home.duration, 54.0);
        assert_eq!(totals.possession.away.duration, 8.0);
        assert_eq!(totals.shots.home.goals, 1);
        assert_eq!(totals.kickouts.away.total, 1);
    }

    #[test]
    fn test_expand_glob() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b.xml", XML_MATCH);
        write(&dir, "a.xml", XML_MATCH);
        write(&dir, "notes.txt", "");
        std::fs::create_dir(dir.path().join("sub.xml")).unwrap();

        let pattern = format!("{}/*.xml", dir.path().display());
        let paths = expand_glob(&pattern).unwrap();

        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.xml", "b.xml"]);
    }

    #[test]
    fn test_expand_glob_bad_pattern() {
        assert!(matches!(
            expand_glob("[unclosed"),
            Err(IngestError::Pattern(_))
        ));
    }
}
