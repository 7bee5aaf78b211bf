//! Sportscode-style XML reader.
//!
//! Every `<instance>` element is one event:
//!
//! ```xml
//! <instance>
//!   <ID>12</ID>
//!   <start>598.2</start>
//!   <end>652.0</end>
//!   <code>Shot Own</code>
//!   <label><group>Outcome</group><text>Point</text></label>
//! </instance>
//! ```
//!
//! Everything outside instances (session info, row colours) is skipped.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{ParseError, RawEvent, RawTime};
use crate::models::MatchEvent;

const INSTANCE: &str = "instance";
const LABEL: &str = "label";

pub(super) fn read_events(document: &str) -> Result<Vec<MatchEvent>, ParseError> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    // Open element names, innermost last
    let mut stack: Vec<String> = Vec::new();
    let mut seen_root = false;
    let mut current: Option<RawEvent> = None;
    let mut text = String::new();
    let mut events = Vec::new();

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if seen_root && stack.is_empty() {
                    return Err(after_root(position, "element"));
                }
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == INSTANCE && current.is_none() {
                    current = Some(RawEvent::default());
                }
                seen_root = true;
                text.clear();
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                if seen_root && stack.is_empty() {
                    return Err(after_root(position, "element"));
                }
                seen_root = true;
                // A self-closed instance has no fields; let validation report it.
                if e.name().as_ref() == INSTANCE.as_bytes() && current.is_none() {
                    let position = events.len() + 1;
                    events.push(RawEvent::default().into_event(position)?);
                }
            }
            Ok(Event::Text(t)) => {
                let unescaped = t.unescape().map_err(|e| xml_error(position, e))?;
                if stack.is_empty() && !unescaped.trim().is_empty() {
                    return Err(after_root(position, "text"));
                }
                text.push_str(&unescaped);
            }
            Ok(Event::CData(c)) => {
                if stack.is_empty() {
                    return Err(after_root(position, "CDATA"));
                }
                text.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                // The reader rejects mismatched and unopened end tags itself
                stack.pop();

                let value = text.trim().to_string();
                text.clear();

                if name == INSTANCE && !stack.iter().any(|n| n == INSTANCE) {
                    if let Some(raw) = current.take() {
                        let position = events.len() + 1;
                        events.push(raw.into_event(position)?);
                    }
                    continue;
                }

                if let Some(raw) = current.as_mut() {
                    assign_field(raw, &stack, &name, value);
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctype
            Ok(_) => {}
            Err(e) => return Err(xml_error(reader.buffer_position() as u64, e)),
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Xml {
            position: reader.buffer_position() as u64,
            message: format!("unclosed <{}>", open),
        });
    }
    if !seen_root {
        return Err(ParseError::Xml {
            position: 0,
            message: "document has no root element".to_string(),
        });
    }

    Ok(events)
}

fn after_root(position: u64, what: &str) -> ParseError {
    ParseError::Xml {
        position,
        message: format!("{} outside the root element", what),
    }
}

/// Store a closed element's text on the event under construction.
///
/// `parents` is the stack of still-open elements after `name` was closed.
fn assign_field(raw: &mut RawEvent, parents: &[String], name: &str, value: String) {
    let parent = parents.last().map(String::as_str);
    let grandparent = parents
        .len()
        .checked_sub(2)
        .and_then(|i| parents.get(i))
        .map(String::as_str);

    match (grandparent, parent, name) {
        (_, Some(INSTANCE), "ID") => raw.id = Some(value),
        (_, Some(INSTANCE), "start") => raw.start = Some(RawTime::Text(value)),
        (_, Some(INSTANCE), "end") => raw.end = Some(RawTime::Text(value)),
        (_, Some(INSTANCE), "code") => raw.code = Some(value),
        (Some(INSTANCE), Some(LABEL), "text") => raw.labels.push(value),
        _ => {}
    }
}

fn xml_error(position: u64, err: impl std::fmt::Display) -> ParseError {
    ParseError::Xml {
        position,
        message: err.to_string(),
    }
}
