//! Stage setup and progression.
//!
//! A stage lines every enemy up in the low slots, boss first, followed by the
//! player's roster. The fight works its way down the enemy slots; defeating a
//! gate enemy moves the fight into a new area, defeating the boss clears the
//! stage, and losing the active character ends the game.

use serde::{Deserialize, Serialize};

use crate::combat::{Terminal, TickEvents};
use crate::components::{Slot, SpriteSheet};
use crate::config::{Area, StageConfig};
use crate::error::Result;
use crate::world::World;

/// Populate the world with a fresh stage.
///
/// Every existing entity is destroyed first.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the roster does not
/// fit in the store.
pub fn setup_stage(world: &mut World, config: &StageConfig) -> Result<()> {
    config.validate()?;
    world.destroy_all();

    for _ in 0..config.enemies {
        world.create_enemy(SpriteSheet::Enemy)?;
    }
    world.reset_health(Slot::BOSS, config.boss_hit_points);

    for ordinal in 0..config.allies {
        let sprite = if ordinal % 2 == 0 {
            SpriteSheet::PlayerBlue
        } else {
            SpriteSheet::PlayerGreen
        };
        let slot = world.create_player(sprite, ordinal)?;
        world.reset_health(slot, config.player_hit_points);
    }

    tracing::debug!(
        enemies = config.enemies,
        allies = config.allies,
        difficulty = ?config.difficulty,
        "Stage set up"
    );
    Ok(())
}

/// What the surrounding game loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Progression {
    /// Keep fighting.
    Continue,
    /// The active character is dead.
    GameOver,
    /// The boss is dead.
    StageClear,
    /// A gate enemy is dead; move the fight into a new area.
    EnterArea(Area),
}

impl Progression {
    /// Map a tick's events to the stage flow signal they trigger.
    #[must_use]
    pub fn evaluate(events: &TickEvents, config: &StageConfig) -> Self {
        match events.terminal {
            Some(Terminal::PlayerDefeated(_)) => return Self::GameOver,
            Some(Terminal::BossDefeated) => return Self::StageClear,
            None => {}
        }

        events
            .removed
            .and_then(|slot| config.area_gates.iter().find(|gate| gate.slot == slot))
            .map_or(Self::Continue, |gate| Self::EnterArea(gate.area))
    }

    /// Check if the stage is over.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::GameOver | Self::StageClear)
    }
}
