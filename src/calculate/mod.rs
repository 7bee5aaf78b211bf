//! Derived metrics over finished match statistics.
//!
//! Computes the numbers a match summary shows alongside the raw counters:
//! - Score (goals and points) and shot conversion
//! - Kickout retention
//! - Possession share by time
//! - Turnover balance

use serde::Serialize;

use crate::models::{
    GameStatistics, KickoutStats, PossessionStats, ShotStats, Team, TeamSplit, TurnoverStats,
};

/// Points value of a goal.
pub const GOAL_VALUE: u32 = 3;

/// A team's score from its shot outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub goals: u32,
    pub points: u32,
}

impl Score {
    /// Total in points.
    pub fn total(&self) -> u32 {
        self.goals * GOAL_VALUE + self.points
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02} ({})", self.goals, self.points, self.total())
    }
}

/// Score from shot outcomes.
pub fn total_score(shots: &ShotStats) -> Score {
    Score {
        goals: shots.goals,
        points: shots.points,
    }
}

/// Scores (goals + points) per shot taken.
pub fn conversion_rate(shots: &ShotStats) -> f64 {
    if shots.total == 0 {
        0.0
    } else {
        (shots.goals + shots.points) as f64 / shots.total as f64
    }
}

/// Kickouts won as a share of kickouts with a recorded outcome.
pub fn kickout_retention(kickouts: &KickoutStats) -> f64 {
    let contested = kickouts.won + kickouts.lost;
    if contested == 0 {
        0.0
    } else {
        kickouts.won as f64 / contested as f64
    }
}

/// Home and away share of total possession time.
pub fn possession_share(possession: &TeamSplit<PossessionStats>) -> (f64, f64) {
    let total = possession.home.duration + possession.away.duration;
    if total <= 0.0 {
        return (0.0, 0.0);
    }

    (
        possession.home.duration / total,
        possession.away.duration / total,
    )
}

/// Home turnovers minus away turnovers.
pub fn turnover_balance(turnovers: &TeamSplit<TurnoverStats>) -> i64 {
    turnovers.home.total as i64 - turnovers.away.total as i64
}

/// Headline numbers for one side.
#[derive(Debug, Clone, Serialize)]
pub struct TeamSummary {
    pub team: Team,
    pub score: Score,
    pub shots: u32,
    pub conversion_rate: f64,
    pub kickouts: u32,
    pub kickout_retention: f64,
    pub possessions: u32,
    pub possession_seconds: f64,
    pub possession_share: f64,
    pub turnovers: u32,
}

/// Headline numbers for a match (or a season of absorbed matches).
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub total_events: u64,
    pub distinct_codes: usize,
    pub home: TeamSummary,
    pub away: TeamSummary,
    pub turnover_balance: i64,
    pub fouls_conceded: u32,
    pub fouls_scoreable: u32,
    pub fouls_awarded: u32,
}

impl MatchSummary {
    /// Summarize finished statistics.
    pub fn from_statistics(stats: &GameStatistics) -> Self {
        let (home_share, away_share) = possession_share(&stats.possession);
        let team_summary = |team: Team, share: f64| {
            let shots = stats.shots.get(team);
            let kickouts = stats.kickouts.get(team);
            let possession = stats.possession.get(team);
            TeamSummary {
                team,
                score: total_score(shots),
                shots: shots.total,
                conversion_rate: conversion_rate(shots),
                kickouts: kickouts.total,
                kickout_retention: kickout_retention(kickouts),
                possessions: possession.count,
                possession_seconds: possession.duration,
                possession_share: share,
                turnovers: stats.turnovers.get(team).total,
            }
        };

        Self {
            total_events: stats.total_events,
            distinct_codes: stats.events_by_code.len(),
            home: team_summary(Team::Home, home_share),
            away: team_summary(Team::Away, away_share),
            turnover_balance: turnover_balance(&stats.turnovers),
            fouls_conceded: stats.fouls.home.conceded,
            fouls_scoreable: stats.fouls.home.scoreable,
            fouls_awarded: stats.fouls.home.awarded,
        }
    }
}
