//! Stage configuration.
//!
//! A stage is described by a small RON document:
//!
//! ```ron
//! (
//!     enemies: 12,
//!     allies: 2,
//!     boss_hit_points: 25,
//!     player_hit_points: 25,
//!     difficulty: Hard,
//!     area_gates: [
//!         (slot: 7, area: Courtyard),
//!         (slot: 3, area: GreatHall),
//!     ],
//! )
//! ```
//!
//! Every field is optional and falls back to [`StageConfig::default`]. An
//! omitted `area_gates` list keeps only the default gates that fit the
//! enemy count, so `(enemies: 5)` gets just the Great Hall gate at slot 3.
//! Configs built in code are validated as written.

use serde::{Deserialize, Serialize};

use crate::ai::Difficulty;
use crate::components::{Slot, ENTITY_COUNT, MAX_HIT_POINTS};
use crate::error::{DuelError, Result};

/// Largest roster the player can bring into a stage.
pub const MAX_ALLIES: u8 = 4;

/// Backdrop of a stage section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Area {
    /// Opening area.
    #[default]
    Forest,
    /// Second area.
    Courtyard,
    /// Final area, where the boss waits.
    GreatHall,
}

/// An enemy whose defeat moves the fight into a new area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AreaGate {
    /// Enemy slot guarding the gate.
    pub slot: Slot,
    /// Area entered once it falls.
    pub area: Area,
}

/// Layout and tuning of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StageDocument")]
pub struct StageConfig {
    /// Number of enemies, including the boss in slot 0.
    pub enemies: u8,
    /// Number of roster members.
    pub allies: u8,
    /// Hit points of the boss.
    pub boss_hit_points: u8,
    /// Hit points of every roster member.
    pub player_hit_points: u8,
    /// Opponent difficulty.
    pub difficulty: Difficulty,
    /// Area transitions along the stage.
    pub area_gates: Vec<AreaGate>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            enemies: 12,
            allies: 1,
            boss_hit_points: 25,
            player_hit_points: 25,
            difficulty: Difficulty::Normal,
            area_gates: Self::default_area_gates(12),
        }
    }
}

/// Stage text as written; an omitted gate list falls back to the default
/// gates that fit the enemy count.
#[derive(Deserialize)]
#[serde(default)]
struct StageDocument {
    enemies: u8,
    allies: u8,
    boss_hit_points: u8,
    player_hit_points: u8,
    difficulty: Difficulty,
    area_gates: Option<Vec<AreaGate>>,
}

impl Default for StageDocument {
    fn default() -> Self {
        let config = StageConfig::default();
        Self {
            enemies: config.enemies,
            allies: config.allies,
            boss_hit_points: config.boss_hit_points,
            player_hit_points: config.player_hit_points,
            difficulty: config.difficulty,
            area_gates: None,
        }
    }
}

impl From<StageDocument> for StageConfig {
    fn from(doc: StageDocument) -> Self {
        Self {
            area_gates: doc
                .area_gates
                .unwrap_or_else(|| Self::default_area_gates(doc.enemies)),
            enemies: doc.enemies,
            allies: doc.allies,
            boss_hit_points: doc.boss_hit_points,
            player_hit_points: doc.player_hit_points,
            difficulty: doc.difficulty,
        }
    }
}

impl StageConfig {
    /// The standard Courtyard (slot 7) and Great Hall (slot 3) gates, keeping
    /// only those that guard a regular enemy slot of an `enemies`-strong stage.
    #[must_use]
    pub fn default_area_gates(enemies: u8) -> Vec<AreaGate> {
        [(7, Area::Courtyard), (3, Area::GreatHall)]
            .into_iter()
            .filter(|&(slot, _)| slot < usize::from(enemies))
            .filter_map(|(slot, area)| Slot::new(slot).map(|slot| AreaGate { slot, area }))
            .collect()
    }

    /// Parse and validate a configuration from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`DuelError::ConfigParse`] for malformed text and
    /// [`DuelError::InvalidConfig`] for an inconsistent stage.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron).map_err(|e| DuelError::ConfigParse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON.
    ///
    /// # Errors
    ///
    /// Returns [`DuelError::InvalidConfig`] if the value cannot be encoded.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| DuelError::InvalidConfig(e.to_string()))
    }

    /// Check that the stage fits the entity store and the health range.
    ///
    /// # Errors
    ///
    /// Returns [`DuelError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.enemies == 0 {
            return Err(DuelError::InvalidConfig("a stage needs at least one enemy".into()));
        }
        if !(1..=MAX_ALLIES).contains(&self.allies) {
            return Err(DuelError::InvalidConfig(format!(
                "allies must be between 1 and {MAX_ALLIES}, got {}",
                self.allies
            )));
        }
        let total = usize::from(self.enemies) + usize::from(self.allies);
        if total > ENTITY_COUNT {
            return Err(DuelError::InvalidConfig(format!(
                "{total} characters do not fit {ENTITY_COUNT} slots"
            )));
        }
        for (name, points) in [
            ("boss_hit_points", self.boss_hit_points),
            ("player_hit_points", self.player_hit_points),
        ] {
            if points == 0 || points > MAX_HIT_POINTS {
                return Err(DuelError::InvalidConfig(format!(
                    "{name} must be between 1 and {MAX_HIT_POINTS}, got {points}"
                )));
            }
        }
        for gate in &self.area_gates {
            if gate.slot == Slot::BOSS || gate.slot.index() >= usize::from(self.enemies) {
                return Err(DuelError::InvalidConfig(format!(
                    "area gate {} is not a regular enemy slot",
                    gate.slot
                )));
            }
        }
        Ok(())
    }

    /// Slot of the first roster member.
    #[must_use]
    pub fn first_ally_slot(&self) -> usize {
        usize::from(self.enemies)
    }
}
