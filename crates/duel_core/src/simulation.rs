//! Frame orchestration.
//!
//! One call to [`Simulation::advance`] is one tick. Systems run in a fixed
//! order:
//! 1. Input mapping for the active player
//! 2. Opponent controller
//! 3. Combat resolution for every occupied slot
//! 4. Output rendering
//!
//! # Determinism
//!
//! The simulation never reads a clock or a system random source. Given the
//! same starting world, the same input stream and the same random stream, it
//! produces the same output events and the same [`Simulation::state_hash`].
//!
//! # Example
//!
//! ```
//! use duel_core::config::StageConfig;
//! use duel_core::input::{Button, InputEvent};
//! use duel_core::simulation::Simulation;
//!
//! let mut sim = Simulation::from_stage(&StageConfig::default()).unwrap();
//! let output = sim.advance(InputEvent::held(Button::A), 0).unwrap();
//! assert_eq!(output.sound_id(), 66);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::ai::{Difficulty, OpponentController};
use crate::combat::{combat_system, TickEvents};
use crate::config::StageConfig;
use crate::error::{DuelError, Result};
use crate::input::{input_system, InputEvent};
use crate::render::{render, OutputEvent};
use crate::stage::setup_stage;
use crate::world::World;

/// A running duel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulation {
    tick: u64,
    world: World,
    opponent: OpponentController,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(World::new(), Difficulty::Dormant)
    }
}

impl Simulation {
    /// Wrap an already populated world.
    #[must_use]
    pub fn new(world: World, difficulty: Difficulty) -> Self {
        Self {
            tick: 0,
            world,
            opponent: OpponentController::new(difficulty),
        }
    }

    /// Set up a stage and start a simulation on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage configuration is invalid.
    pub fn from_stage(config: &StageConfig) -> Result<Self> {
        let mut world = World::new();
        setup_stage(&mut world, config)?;
        Ok(Self::new(world, config.difficulty))
    }

    /// Ticks advanced so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The entity store.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the entity store, for setup and scripted tests.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The opponent controller.
    #[must_use]
    pub const fn opponent(&self) -> &OpponentController {
        &self.opponent
    }

    /// Mutable access to the opponent controller.
    pub fn opponent_mut(&mut self) -> &mut OpponentController {
        &mut self.opponent
    }

    /// Advance one tick.
    ///
    /// `random` is a fresh random value used by the opponent controller.
    ///
    /// # Errors
    ///
    /// Returns [`DuelError::NoActivePlayer`] if the world has no active
    /// player character. The world is left untouched in that case.
    pub fn advance(&mut self, input: InputEvent, random: u16) -> Result<OutputEvent> {
        self.advance_with_events(input, random).map(|(output, _)| output)
    }

    /// Advance one tick and also return everything that happened during it.
    ///
    /// # Errors
    ///
    /// Returns [`DuelError::NoActivePlayer`] if the world has no active
    /// player character.
    pub fn advance_with_events(
        &mut self,
        input: InputEvent,
        random: u16,
    ) -> Result<(OutputEvent, TickEvents)> {
        if self.world.active_player().is_none() {
            return Err(DuelError::NoActivePlayer);
        }

        let mut events = TickEvents::default();
        input_system(&mut self.world, &mut events, input);
        self.opponent.step(&mut self.world, &mut events, random);
        combat_system(&mut self.world, &mut events);

        #[cfg(feature = "debug-validation")]
        if let Err(violation) = self.world.validate() {
            panic!("World invariant violated at tick {}: {violation}", self.tick);
        }

        let output = render(&self.world, &events).ok_or(DuelError::NoActivePlayer)?;
        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        Ok((output, events))
    }

    /// Calculate a hash of the current simulation state.
    ///
    /// Two simulations with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.world.hash(&mut hasher);
        self.opponent.hash(&mut hasher);
        hasher.finish()
    }

    /// Encode the simulation state for replay comparison.
    ///
    /// # Errors
    ///
    /// Returns [`DuelError::Snapshot`] if encoding fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| DuelError::Snapshot(e.to_string()))
    }

    /// Decode a state produced by [`Simulation::serialize`].
    ///
    /// # Errors
    ///
    /// Returns [`DuelError::Snapshot`] if the bytes are not a valid state.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| DuelError::Snapshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{Sound, ATTACK_FRAMES};
    use crate::components::{AttackType, Slot, SpriteSheet};
    use crate::input::Button;

    fn duel() -> Simulation {
        let mut world = World::new();
        world.create_enemy(SpriteSheet::Enemy).unwrap();
        world.create_player(SpriteSheet::PlayerBlue, 0).unwrap();
        Simulation::new(world, Difficulty::Dormant)
    }

    #[test]
    fn test_advance_without_player_fails() {
        let mut world = World::new();
        world.create_enemy(SpriteSheet::Enemy).unwrap();
        let mut sim = Simulation::new(world, Difficulty::Normal);

        let result = sim.advance(InputEvent::default(), 0);

        assert!(matches!(result, Err(DuelError::NoActivePlayer)));
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.opponent().accumulator(), 0);
    }

    #[test]
    fn test_idle_tick_renders_pairing() {
        let mut sim = duel();
        let output = sim.advance(InputEvent::default(), 0).unwrap();

        assert_eq!(output.active_sprite, SpriteSheet::PlayerBlue);
        assert_eq!(output.opponent_sprite, SpriteSheet::Enemy);
        assert_eq!(output.active_move, AttackType::Idling);
        assert_eq!(output.sound_id(), 0);
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn test_sound_does_not_leak_across_ticks() {
        let mut sim = duel();
        let (first, first_events) = sim
            .advance_with_events(InputEvent::held(Button::A), 0)
            .unwrap();
        let (second, second_events) = sim
            .advance_with_events(InputEvent::held(Button::A), 0)
            .unwrap();

        assert_eq!(first.sound, Some(Sound::Swing));
        assert_eq!(first_events.sound, Some(Sound::Swing));
        assert_eq!(second.sound, None);
        assert_eq!(second_events.sound, None);
        assert_eq!(first.active_move, AttackType::BasicCombo1);
    }

    #[test]
    fn test_held_attack_lands_after_attack_frames() {
        let mut sim = duel();
        let enemy = Slot::BOSS;

        let mut hit_tick = None;
        for tick in 0..=ATTACK_FRAMES {
            let (_, events) = sim
                .advance_with_events(InputEvent::held(Button::A), 0)
                .unwrap();
            if !events.hits.is_empty() {
                hit_tick = Some(tick);
                break;
            }
        }

        assert_eq!(hit_tick, Some(ATTACK_FRAMES - 1));
        assert_eq!(sim.world().health(enemy).points, 6);
    }

    #[test]
    fn test_state_hash_tracks_progress() {
        let mut a = duel();
        let mut b = duel();
        assert_eq!(a.state_hash(), b.state_hash());

        a.advance(InputEvent::held(Button::A), 0).unwrap();
        assert_ne!(a.state_hash(), b.state_hash());

        b.advance(InputEvent::held(Button::A), 0).unwrap();
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_serialize_round_trip_preserves_hash() {
        let mut sim = Simulation::from_stage(&StageConfig::default()).unwrap();
        for random in 0..50 {
            sim.advance(InputEvent::held(Button::A), random).unwrap();
        }

        let bytes = sim.serialize().unwrap();
        let restored = Simulation::deserialize(&bytes).unwrap();

        assert_eq!(restored, sim);
        assert_eq!(restored.state_hash(), sim.state_hash());
    }

    #[test]
    fn test_corrupt_snapshot_is_rejected() {
        assert!(matches!(
            Simulation::deserialize(&[1, 2, 3]),
            Err(DuelError::Snapshot(_))
        ));
    }
}
