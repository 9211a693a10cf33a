//! Match metrics collection.
//!
//! Every tick's [`TickEvents`] are folded into a [`MatchReport`]; a batch
//! of reports reduces to a [`BatchSummary`].

use serde::{Deserialize, Serialize};

use duel_core::combat::{HitOutcome, Terminal, TickEvents};
use duel_core::config::Area;
use duel_core::world::World;

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// The boss was defeated.
    StageClear,
    /// The active character was defeated.
    GameOver,
    /// The tick limit ran out first.
    #[default]
    Timeout,
}

/// Complete metrics for a single match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Random seed used.
    pub seed: u64,
    /// Player strategy name.
    pub strategy: String,
    /// Total match duration in ticks.
    pub duration_ticks: u64,
    /// How the match ended.
    pub outcome: MatchOutcome,
    /// Areas entered, in order.
    pub areas: Vec<Area>,
    /// Swings by the roster that reached their hit frame.
    pub hits_landed: u32,
    /// Enemy swings that reached their hit frame.
    pub hits_taken: u32,
    /// Hit points the roster removed from enemies.
    pub damage_dealt: u32,
    /// Hit points the roster lost.
    pub damage_taken: u32,
    /// Enemy swings the roster parried.
    pub parries: u32,
    /// Enemy swings the roster guarded.
    pub guards: u32,
    /// Completed roster rotations.
    pub switches: u32,
    /// Chained roster rotations.
    pub chained_switches: u32,
    /// Enemies removed from the stage.
    pub enemies_defeated: u32,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl MatchReport {
    /// Create an empty report.
    #[must_use]
    pub fn new(seed: u64, strategy: impl Into<String>) -> Self {
        Self {
            seed,
            strategy: strategy.into(),
            ..Default::default()
        }
    }

    /// Fold one tick's events into the report.
    ///
    /// `world` is the state after the tick. Hits are attributed by the
    /// attacker's roster membership.
    pub fn record(&mut self, world: &World, events: &TickEvents) {
        for hit in &events.hits {
            let by_roster = world.team_member(hit.attacker).is_some();
            let damage = u32::from(hit.damage);
            if by_roster {
                self.hits_landed += 1;
                self.damage_dealt += damage;
            } else {
                self.hits_taken += 1;
                self.damage_taken += damage;
                match hit.outcome {
                    HitOutcome::Parried => self.parries += 1,
                    HitOutcome::Guarded => self.guards += 1,
                    HitOutcome::Clean | HitOutcome::Fatal => {}
                }
            }
        }

        for switch in &events.switches {
            self.switches += 1;
            if switch.chained {
                self.chained_switches += 1;
            }
        }

        // A defeated player character ends the match instead of being removed.
        if events.removed.is_some() || events.terminal == Some(Terminal::BossDefeated) {
            self.enemies_defeated += 1;
        }
    }

    /// Record entry into a new area.
    pub fn enter_area(&mut self, area: Area) {
        self.areas.push(area);
    }

    /// Finalize the match.
    pub fn finalize(&mut self, duration: u64, outcome: MatchOutcome, final_state_hash: u64) {
        self.duration_ticks = duration;
        self.outcome = outcome;
        self.final_state_hash = final_state_hash;
    }
}

/// Aggregate statistics across a batch of matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches played.
    pub total_matches: u32,
    /// Matches that ended with the boss defeated.
    pub stage_clears: u32,
    /// Matches that ended with the active character defeated.
    pub game_overs: u32,
    /// Matches that hit the tick limit.
    pub timeouts: u32,
    /// Fraction of matches cleared.
    pub clear_rate: f64,
    /// Average match length in ticks.
    pub avg_duration: f64,
    /// Shortest match in ticks.
    pub min_duration: u64,
    /// Longest match in ticks.
    pub max_duration: u64,
    /// Average hit points dealt per match.
    pub avg_damage_dealt: f64,
    /// Average hit points taken per match.
    pub avg_damage_taken: f64,
    /// Average enemies defeated per match.
    pub avg_enemies_defeated: f64,
}

impl BatchSummary {
    /// Calculate summary from a list of match reports.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn from_reports(reports: &[MatchReport]) -> Self {
        if reports.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_matches: reports.len() as u32,
            min_duration: u64::MAX,
            ..Default::default()
        };

        let mut duration_sum = 0u64;
        let mut dealt_sum = 0u64;
        let mut taken_sum = 0u64;
        let mut defeated_sum = 0u64;

        for report in reports {
            match report.outcome {
                MatchOutcome::StageClear => summary.stage_clears += 1,
                MatchOutcome::GameOver => summary.game_overs += 1,
                MatchOutcome::Timeout => summary.timeouts += 1,
            }
            duration_sum += report.duration_ticks;
            summary.min_duration = summary.min_duration.min(report.duration_ticks);
            summary.max_duration = summary.max_duration.max(report.duration_ticks);
            dealt_sum += u64::from(report.damage_dealt);
            taken_sum += u64::from(report.damage_taken);
            defeated_sum += u64::from(report.enemies_defeated);
        }

        let n = reports.len() as f64;
        summary.clear_rate = f64::from(summary.stage_clears) / n;
        summary.avg_duration = duration_sum as f64 / n;
        summary.avg_damage_dealt = dealt_sum as f64 / n;
        summary.avg_damage_taken = taken_sum as f64 / n;
        summary.avg_enemies_defeated = defeated_sum as f64 / n;
        summary
    }
}
