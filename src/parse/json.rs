//! JSON event reader.

use serde::Deserialize;
use serde_json::Value;

use super::{ParseError, RawEvent, RawTime};
use crate::models::MatchEvent;

/// One event as exported by JSON tagging tools. Field names vary between
/// tools and some exports carry more than one spelling of the same field,
/// so every spelling is read separately and the first present one wins.
#[derive(Debug, Deserialize)]
struct JsonEvent {
    #[serde(default)]
    id: Option<Id>,

    #[serde(default, rename = "ID")]
    id_upper: Option<Id>,

    #[serde(default, rename = "startTime")]
    start_time: Option<Scalar>,

    #[serde(default)]
    start: Option<Scalar>,

    #[serde(default)]
    time: Option<Scalar>,

    #[serde(default, rename = "endTime")]
    end_time: Option<Scalar>,

    #[serde(default)]
    end: Option<Scalar>,

    #[serde(default)]
    code: Option<String>,

    #[serde(default)]
    labels: Option<Labels>,

    #[serde(default)]
    label: Option<Labels>,
}

/// Event identifier. Integers are kept exact so large ids stay distinct.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Id {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        match id {
            Id::Unsigned(n) => n.to_string(),
            Id::Signed(n) => n.to_string(),
            Id::Float(n) => n.to_string(),
            Id::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Labels {
    One(String),
    Many(Vec<Label>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Label {
    Text(String),
    Tagged { text: String },
}

impl From<Scalar> for RawTime {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Number(n) => RawTime::Seconds(n),
            Scalar::Text(s) => RawTime::Text(s),
        }
    }
}

impl JsonEvent {
    fn into_raw(self) -> RawEvent {
        let labels = match self.labels.or(self.label) {
            None => Vec::new(),
            Some(Labels::One(label)) => vec![label],
            Some(Labels::Many(labels)) => labels
                .into_iter()
                .map(|label| match label {
                    Label::Text(text) | Label::Tagged { text } => text,
                })
                .collect(),
        };

        RawEvent {
            id: self.id.or(self.id_upper).map(String::from),
            start: self
                .start_time
                .or(self.start)
                .or(self.time)
                .map(RawTime::from),
            end: self.end_time.or(self.end).map(RawTime::from),
            code: self.code,
            labels,
        }
    }
}

pub(super) fn read_events(document: &str) -> Result<Vec<MatchEvent>, ParseError> {
    let root: Value = serde_json::from_str(document)?;

    let items = match root {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("events") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(ParseError::InvalidDocument(
                    "\"events\" must be an array".to_string(),
                ))
            }
            None => {
                return Err(ParseError::InvalidDocument(
                    "expected an \"events\" array".to_string(),
                ))
            }
        },
        _ => {
            return Err(ParseError::InvalidDocument(
                "expected an array of events".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let event: JsonEvent = serde_json::from_value(item)?;
            event.into_raw().into_event(i + 1)
        })
        .collect()
}
