//! Per-match statistics models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{MatchEvent, Team};

/// A pair of independent home/away values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSplit<T> {
    pub home: T,
    pub away: T,
}

impl<T> TeamSplit<T> {
    /// Borrow one side.
    pub fn get(&self, team: Team) -> &T {
        match team {
            Team::Home => &self.home,
            Team::Away => &self.away,
        }
    }

    /// Mutably borrow one side.
    pub fn get_mut(&mut self, team: Team) -> &mut T {
        match team {
            Team::Home => &mut self.home,
            Team::Away => &mut self.away,
        }
    }
}

/// Possession spells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PossessionStats {
    pub count: u32,
    /// Cumulative seconds
    pub duration: f64,
}

/// Shot totals with outcome and type breakdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotStats {
    pub total: u32,

    // Outcome
    pub goals: u32,
    pub points: u32,
    pub wides: u32,
    pub short_keeper: u32,
    pub saved: u32,
    #[serde(alias = "45m")]
    pub m45: u32,
    pub rebound_post: u32,
    pub other: u32,

    // Type
    pub from_play: u32,
    pub from_free: u32,
}

/// Kickout totals with distance, direction and outcome breakdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KickoutStats {
    pub total: u32,
    pub long: u32,
    pub short: u32,
    pub mid: u32,
    pub left: u32,
    pub centre: u32,
    pub right: u32,
    pub won: u32,
    pub lost: u32,
}

/// Turnover totals with cause and pitch-zone breakdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnoverStats {
    pub total: u32,
    pub forced: u32,
    pub unforced: u32,
    pub d1: u32,
    pub d2: u32,
    pub d3: u32,
    pub m1: u32,
    pub m2: u32,
    pub m3: u32,
    pub a1: u32,
    pub a2: u32,
    pub a3: u32,
}

/// Foul counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoulStats {
    pub conceded: u32,
    pub scoreable: u32,
    pub awarded: u32,
}

/// Statistics for one match, built by a single fold over its events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatistics {
    pub total_events: u64,
    pub events_by_code: BTreeMap<String, u64>,
    pub events: Vec<MatchEvent>,
    pub possession: TeamSplit<PossessionStats>,
    pub shots: TeamSplit<ShotStats>,
    pub kickouts: TeamSplit<KickoutStats>,
    pub turnovers: TeamSplit<TurnoverStats>,
    pub fouls: TeamSplit<FoulStats>,
}

impl GameStatistics {
    /// Add another match's counters into this one.
    ///
    /// Used for season totals; events are appended in order.
    pub fn absorb(&mut self, other: &GameStatistics) {
        self.total_events += other.total_events;
        for (code, count) in &other.events_by_code {
            *self.events_by_code.entry(code.clone()).or_insert(0) += count;
        }
        self.events.extend(other.events.iter().cloned());

        for team in [Team::Home, Team::Away] {
            self.possession
                .get_mut(team)
                .absorb(other.possession.get(team));
            self.shots.get_mut(team).absorb(other.shots.get(team));
            self.kickouts.get_mut(team).absorb(other.kickouts.get(team));
            self.turnovers
                .get_mut(team)
                .absorb(other.turnovers.get(team));
            self.fouls.get_mut(team).absorb(other.fouls.get(team));
        }
    }
}

impl PossessionStats {
    fn absorb(&mut self, other: &Self) {
        self.count += other.count;
        self.duration += other.duration;
    }
}

impl ShotStats {
    fn absorb(&mut self, other: &Self) {
        self.total += other.total;
        self.goals += other.goals;
        self.points += other.points;
        self.wides += other.wides;
        self.short_keeper += other.short_keeper;
        self.saved += other.saved;
        self.m45 += other.m45;
        self.rebound_post += other.rebound_post;
        self.other += other.other;
        self.from_play += other.from_play;
        self.from_free += other.from_free;
    }
}

impl KickoutStats {
    fn absorb(&mut self, other: &Self) {
        self.total += other.total;
        self.long += other.long;
        self.short += other.short;
        self.mid += other.mid;
        self.left += other.left;
        self.centre += other.centre;
        self.right += other.right;
        self.won += other.won;
        self.lost += other.lost;
    }
}

impl TurnoverStats {
    fn absorb(&mut self, other: &Self) {
        self.total += other.total;
        self.forced += other.forced;
        self.unforced += other.unforced;
        self.d1 += other.d1;
        self.d2 += other.d2;
        self.d3 += other.d3;
        self.m1 += other.m1;
        self.m2 += other.m2;
        self.m3 += other.m3;
        self.a1 += other.a1;
        self.a2 += other.a2;
        self.a3 += other.a3;
    }
}

impl FoulStats {
    fn absorb(&mut self, other: &Self) {
        self.conceded += other.conceded;
        self.scoreable += other.scoreable;
        self.awarded += other.awarded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> GameStatistics {
        let mut stats = GameStatistics {
            total_events: 2,
            ..Default::default()
        };
        stats.events_by_code.insert("Shot Own".to_string(), 1);
        stats.events_by_code.insert("Hot Ball".to_string(), 1);
        stats.events.push(MatchEvent::new("1", 0.0, 1.0, "Shot Own"));
        stats.events.push(MatchEvent::new("2", 5.0, 5.0, "Hot Ball"));
        stats.shots.home.total = 1;
        stats.shots.home.points = 1;
        stats.possession.away = PossessionStats {
            count: 1,
            duration: 8.0,
        };
        stats
    }

    #[test]
    fn test_team_split_access() {
        let mut split: TeamSplit<FoulStats> = TeamSplit::default();
        split.get_mut(Team::Home).conceded += 2;

        assert_eq!(split.get(Team::Home).conceded, 2);
        assert_eq!(split.get(Team::Away).conceded, 0);
    }

    #[test]
    fn test_absorb_sums_counters() {
        let mut totals = sample();
        totals.absorb(&sample());

        assert_eq!(totals.total_events, 4);
        assert_eq!(totals.events_by_code["Shot Own"], 2);
        assert_eq!(totals.events.len(), 4);
        assert_eq!(totals.shots.home.points, 2);
        assert_eq!(totals.possession.away.count, 2);
        assert_eq!(totals.possession.away.duration, 16.0);
        assert_eq!(totals.shots.away, ShotStats::default());
    }

    #[test]
    fn test_absorb_into_empty_is_identity() {
        let mut totals = GameStatistics::default();
        totals.absorb(&sample());
        assert_eq!(totals, sample());
    }

    #[test]
    fn test_serialization_field_names() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["totalEvents"], 2);
        assert_eq!(json["eventsByCode"]["Shot Own"], 1);
        assert_eq!(json["shots"]["home"]["shortKeeper"], 0);
        assert_eq!(json["shots"]["home"]["fromPlay"], 0);
        assert_eq!(json["shots"]["home"]["m45"], 0);
        assert_eq!(json["possession"]["away"]["duration"], 8.0);
        assert_eq!(json["turnovers"]["home"]["d1"], 0);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let stats = sample();
        let json = serde_json::to_string(&stats).unwrap();
        let parsed: GameStatistics = serde_json::from_str(&json).unwrap();
        assert_eq!(stats, parsed);
    }
}
