//! Event classification and aggregation.
//!
//! A single linear fold over a match's events. Each event is classified by
//! substrings of its code and by exact label matches:
//! - **Possession**: count and cumulative duration
//! - **Shot**: total, outcome and type breakdowns
//! - **Kickout**: total, distance, direction and outcome
//! - **Turnover**: total, cause and pitch zone
//! - **Foul**: conceded, scoreable and awarded
//!
//! Possession, shots and kickouts are attributed from the code's
//! `Own`/`Opp` marker. Turnovers are attributed from `Won` in the code, and
//! fouls always land on the home side.

use tracing::warn;

use crate::models::{
    FoulStats, GameStatistics, KickoutStats, MatchEvent, ShotStats, Team, TurnoverStats,
};

// Code families
const POSSESSION: &str = "Possession";
const SHOT: &str = "Shot";
const KICKOUT: &str = "Kickout";
const TURNOVER: &str = "Turnover";
const FOUL: &str = "Foul";

// Code qualifiers
const TURNOVER_WON: &str = "Won";
const FOUL_CONCEDED: &str = "Conceded";
const FOUL_AWARDED: &str = "Awarded";

const SCOREABLE: &str = "Scoreable";

/// Builds a [`GameStatistics`] one event at a time.
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    stats: GameStatistics,
}

impl StatsAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the running totals.
    pub fn record(&mut self, mut event: MatchEvent) {
        let duration = event.duration();
        if duration < 0.0 {
            warn!(
                "Event {} ({}) ends before it starts: {}s",
                event.id, event.code, duration
            );
        }

        let team = Team::from_code(&event.code);
        event.team = team;

        self.stats.total_events += 1;
        *self
            .stats
            .events_by_code
            .entry(event.code.clone())
            .or_insert(0) += 1;

        if let Some(team) = team {
            if event.code_contains(POSSESSION) {
                let possession = self.stats.possession.get_mut(team);
                possession.count += 1;
                possession.duration += duration;
            }

            if event.code_contains(SHOT) {
                record_shot(self.stats.shots.get_mut(team), &event);
            }

            if event.code_contains(KICKOUT) {
                record_kickout(self.stats.kickouts.get_mut(team), &event);
            }
        }

        if event.code_contains(TURNOVER) {
            let side = if event.code_contains(TURNOVER_WON) {
                Team::Home
            } else {
                Team::Away
            };
            record_turnover(self.stats.turnovers.get_mut(side), &event);
        }

        if event.code_contains(FOUL) {
            record_foul(&mut self.stats.fouls.home, &event);
        }

        self.stats.events.push(event);
    }

    /// Finish the fold.
    pub fn finish(self) -> GameStatistics {
        self.stats
    }
}

/// Fold a full event list into match statistics.
pub fn aggregate<I>(events: I) -> GameStatistics
where
    I: IntoIterator<Item = MatchEvent>,
{
    let mut acc = StatsAccumulator::new();
    for event in events {
        acc.record(event);
    }
    acc.finish()
}

/// Increment `counter` when `event` carries `label`.
fn tally(counter: &mut u32, event: &MatchEvent, label: &str) {
    if event.has_label(label) {
        *counter += 1;
    }
}

fn record_shot(shots: &mut ShotStats, event: &MatchEvent) {
    shots.total += 1;

    tally(&mut shots.goals, event, "Goal");
    tally(&mut shots.points, event, "Point");
    tally(&mut shots.wides, event, "Wide");
    tally(&mut shots.short_keeper, event, "Short Keeper");
    tally(&mut shots.saved, event, "Saved");
    tally(&mut shots.m45, event, "45M");
    tally(&mut shots.rebound_post, event, "Rebound Post");
    tally(&mut shots.other, event, "Pass / Other");

    tally(&mut shots.from_play, event, "From Play");
    tally(&mut shots.from_free, event, "From Free");
}

fn record_kickout(kickouts: &mut KickoutStats, event: &MatchEvent) {
    kickouts.total += 1;

    tally(&mut kickouts.long, event, "Long");
    tally(&mut kickouts.short, event, "Short");
    tally(&mut kickouts.mid, event, "Mid");

    tally(&mut kickouts.left, event, "Left");
    tally(&mut kickouts.centre, event, "Centre");
    tally(&mut kickouts.right, event, "Right");

    tally(&mut kickouts.won, event, "Won");
    tally(&mut kickouts.lost, event, "Lost");
}

fn record_turnover(turnovers: &mut TurnoverStats, event: &MatchEvent) {
    turnovers.total += 1;

    tally(&mut turnovers.forced, event, "Forced");
    tally(&mut turnovers.unforced, event, "Unforced");

    tally(&mut turnovers.d1, event, "D1");
    tally(&mut turnovers.d2, event, "D2");
    tally(&mut turnovers.d3, event, "D3");
    tally(&mut turnovers.m1, event, "M1");
    tally(&mut turnovers.m2, event, "M2");
    tally(&mut turnovers.m3, event, "M3");
    tally(&mut turnovers.a1, event, "A1");
    tally(&mut turnovers.a2, event, "A2");
    tally(&mut turnovers.a3, event, "A3");
}

fn record_foul(fouls: &mut FoulStats, event: &MatchEvent) {
    if event.code_contains(FOUL_CONCEDED) {
        fouls.conceded += 1;
        tally(&mut fouls.scoreable, event, SCOREABLE);
    } else if event.code_contains(FOUL_AWARDED) {
        fouls.awarded += 1;
    }
}
