//! Opponent controller.
//!
//! The opponent of the active player is driven by a small reactive policy.
//! Difficulty does not change what the opponent chooses, only how often it
//! gets to choose: a rate is added to an accumulator every tick and the
//! policy runs once the accumulator reaches [`ACTIVATION_THRESHOLD`].
//! A decision is always sensible for the situation; a weak opponent simply
//! reacts late or not at all.

use serde::{Deserialize, Serialize};

use crate::actions::{self, Action};
use crate::combat::{TickEvents, ATTACK_FRAMES, PARRY_FRAMES};
use crate::components::{AttackType, Slot};
use crate::world::World;

/// Accumulator value at which the opponent acts.
pub const ACTIVATION_THRESHOLD: u16 = 100;

/// How many frames before a hit lands the opponent starts to react.
pub const COUNTER_LEAD_FRAMES: u16 = 4;

/// Opponent difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    /// Never acts. Useful for scripted runs and tests.
    Dormant,
    /// Reacts rarely.
    Easy,
    /// Default stage difficulty.
    #[default]
    Normal,
    /// Reacts often.
    Hard,
    /// Reacts most ticks.
    Nightmare,
    /// Reacts almost every tick.
    Perfect,
    /// Explicit accumulator rate.
    Custom(u16),
}

impl Difficulty {
    /// Selectable levels in menu order.
    pub const LEVELS: [Self; 5] = [
        Self::Easy,
        Self::Normal,
        Self::Hard,
        Self::Nightmare,
        Self::Perfect,
    ];

    /// Accumulator increase per tick.
    #[must_use]
    pub const fn rate(self) -> u16 {
        match self {
            Self::Dormant => 0,
            Self::Easy => 3,
            Self::Normal => 8,
            Self::Hard => 11,
            Self::Nightmare => 23,
            Self::Perfect => 97,
            Self::Custom(rate) => rate,
        }
    }
}

/// Difficulty-gated opponent policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct OpponentController {
    accumulator: u16,
    difficulty: Difficulty,
}

impl OpponentController {
    /// Create a controller with an empty accumulator.
    #[must_use]
    pub const fn new(difficulty: Difficulty) -> Self {
        Self {
            accumulator: 0,
            difficulty,
        }
    }

    /// Current difficulty.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Change the difficulty, keeping accumulated progress.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// Current accumulator value.
    #[must_use]
    pub const fn accumulator(&self) -> u16 {
        self.accumulator
    }

    /// Advance the accumulator and, if it is full, act for the opponent.
    ///
    /// `random` is a fresh random value for this tick. Returns the action
    /// attempted, if any.
    pub fn step(&mut self, world: &mut World, events: &mut TickEvents, random: u16) -> Option<Action> {
        self.accumulator = self.accumulator.saturating_add(self.difficulty.rate());
        if self.accumulator < ACTIVATION_THRESHOLD {
            return None;
        }

        let player = world.active_player()?;
        let opponent = world.facing(player);
        let roll = random % 3;

        if world.kind(player) == AttackType::Dying || world.kind(opponent) == AttackType::Dying {
            self.accumulator = 0;
            return None;
        }

        let action = decide(world, player, opponent, roll != 0);
        if let Some(action) = action {
            tracing::trace!(%opponent, ?action, accumulator = self.accumulator, "Opponent acts");
            actions::perform(world, events, opponent, action);
        }

        let acc = u32::from(self.accumulator);
        self.accumulator = u16::try_from((acc + u32::from(roll) * acc) % 100).unwrap_or_default();
        action
    }
}

/// Pick the opponent's response to the current pairing.
fn decide(world: &World, player: Slot, opponent: Slot, coin: bool) -> Option<Action> {
    let player_move = world.kind(player);

    if player_move == AttackType::Staggered {
        return Some(if coin {
            Action::SpecialAttack
        } else {
            Action::BasicAttack
        });
    }
    // A guard held past the parry window leaves the opponent open.
    if world.kind(opponent) == AttackType::Guarding && world.frames(opponent) > PARRY_FRAMES {
        return Some(Action::Idle);
    }
    if player_move.is_attack() {
        if world.frames(player) >= ATTACK_FRAMES - COUNTER_LEAD_FRAMES {
            return Some(if coin { Action::Parry } else { Action::Guard });
        }
        return None;
    }
    if player_move == AttackType::Guarding {
        return Some(Action::SpecialAttack);
    }
    Some(if coin {
        Action::BasicAttack
    } else {
        Action::Guard
    })
}
