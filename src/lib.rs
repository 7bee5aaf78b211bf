//! # GAA Stats
//!
//! Turns GAA match-tagging exports into per-team match statistics.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (events, statistics groups, reports)
//! - **parse**: XML and JSON tagging document readers
//! - **aggregate**: The event classification fold
//! - **calculate**: Derived metrics (score, conversion, shares)
//! - **fetch**: Document loading from files and URLs
//! - **ingest**: Single-document and concurrent batch pipelines
//! - **storage**: JSONL report files
//! - **config**: Configuration loading and validation
//!
//! ```
//! let stats = gaa_stats::parse(
//!     r#"[{"time": 598, "endTime": 652, "code": "Possession Own"}]"#,
//! )
//! .unwrap();
//! assert_eq!(stats.possession.home.duration, 54.0);
//! ```

pub mod aggregate;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod ingest;
pub mod models;
pub mod parse;
pub mod storage;

pub use models::*;
pub use parse::{parse, parse_as, DocumentFormat, ParseError};
