//! Tagged match event model.

use serde::{Deserialize, Serialize};

/// Side marker meaning the home team in a tagging code.
pub const HOME_MARKER: &str = "Own";

/// Side marker meaning the away team in a tagging code.
pub const AWAY_MARKER: &str = "Opp";

/// Team attribution for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Home,
    Away,
}

impl Team {
    /// Resolve the team from a code's side marker.
    ///
    /// `"Own"` wins if a malformed code carries both markers.
    pub fn from_code(code: &str) -> Option<Self> {
        if code.contains(HOME_MARKER) {
            Some(Team::Home)
        } else if code.contains(AWAY_MARKER) {
            Some(Team::Away)
        } else {
            None
        }
    }
}

/// A single tagged action from a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEvent {
    /// Identifier, unique within a match
    pub id: String,

    /// Offset from match start, in seconds
    pub start_time: f64,

    /// Offset from match start, in seconds
    pub end_time: f64,

    /// Action family plus side marker, e.g. "Shot Own"
    pub code: String,

    /// Free-text qualifiers, e.g. "Goal", "From Play"
    #[serde(default)]
    pub labels: Vec<String>,

    /// Resolved attribution, `None` when the code has no side marker
    #[serde(default)]
    pub team: Option<Team>,
}

impl MatchEvent {
    /// Create an event and resolve its team from the code.
    pub fn new(
        id: impl Into<String>,
        start_time: f64,
        end_time: f64,
        code: impl Into<String>,
    ) -> Self {
        let code = code.into();
        let team = Team::from_code(&code);
        Self {
            id: id.into(),
            start_time,
            end_time,
            code,
            labels: Vec::new(),
            team,
        }
    }

    /// Builder method to set labels.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// `end_time - start_time`. Not clamped.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Exact, case-sensitive label lookup.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Case-sensitive substring match against the code.
    pub fn code_contains(&self, needle: &str) -> bool {
        self.code.contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_from_code() {
        assert_eq!(Team::from_code("Shot Own"), Some(Team::Home));
        assert_eq!(Team::from_code("Kickout Opp"), Some(Team::Away));
        assert_eq!(Team::from_code("Hot Ball"), None);
    }

    #[test]
    fn test_team_from_code_is_case_sensitive() {
        assert_eq!(Team::from_code("shot own"), None);
        // "Won" is not the home marker
        assert_eq!(Team::from_code("Turnover Won"), None);
    }

    #[test]
    fn test_event_creation_resolves_team() {
        let event = MatchEvent::new("1", 598.0, 652.0, "Possession Own");
        assert_eq!(event.team, Some(Team::Home));
        assert_eq!(event.duration(), 54.0);
        assert!(event.labels.is_empty());
    }

    #[test]
    fn test_event_labels() {
        let event =
            MatchEvent::new("7", 10.0, 10.0, "Shot Opp").with_labels(["From Play", "Point"]);
        assert!(event.has_label("Point"));
        assert!(event.has_label("From Play"));
        assert!(!event.has_label("point"));
        assert!(!event.has_label("From"));
        assert_eq!(event.duration(), 0.0);
    }

    #[test]
    fn test_event_serialization() {
        let event = MatchEvent::new("3", 1.5, 4.0, "Kickout Own").with_labels(["Long"]);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["startTime"], 1.5);
        assert_eq!(json["endTime"], 4.0);
        assert_eq!(json["team"], "home");

        let unattributed = MatchEvent::new("4", 0.0, 0.0, "Hot Ball");
        let json = serde_json::to_value(&unattributed).unwrap();
        assert!(json["team"].is_null());
    }
}
