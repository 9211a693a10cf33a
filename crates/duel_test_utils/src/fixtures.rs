//! Test fixtures and helpers.
//!
//! Pre-built duels and tick drivers for consistent testing.

use duel_core::ai::Difficulty;
use duel_core::combat::TickEvents;
use duel_core::components::{Slot, SpriteSheet};
use duel_core::input::{Button, InputEvent};
use duel_core::render::OutputEvent;
use duel_core::simulation::Simulation;
use duel_core::world::World;
use serde::{Deserialize, Serialize};

/// One tick of scripted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScriptedTick {
    /// Controller state.
    pub input: InputEvent,
    /// Random value handed to the opponent controller.
    pub random: u16,
}

impl ScriptedTick {
    /// A tick with the given controller state and a zero random value.
    #[must_use]
    pub const fn input(input: InputEvent) -> Self {
        Self { input, random: 0 }
    }
}

/// Slots of a fixture duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuelSlots {
    /// The single enemy, which is also the boss.
    pub enemy: Slot,
    /// The active player character.
    pub player: Slot,
}

/// One enemy against one player character, opponent dormant.
#[must_use]
pub fn duel() -> (Simulation, DuelSlots) {
    let mut world = World::new();
    let enemy = world.create_enemy(SpriteSheet::Enemy).expect("empty store");
    let player = world
        .create_player(SpriteSheet::PlayerBlue, 0)
        .expect("empty store");
    (Simulation::new(world, Difficulty::Dormant), DuelSlots { enemy, player })
}

/// One enemy against a roster of `allies` characters, opponent dormant.
///
/// Returns the roster slots in party order.
///
/// # Panics
///
/// Panics if the roster does not fit in the store.
#[must_use]
pub fn roster(allies: u8) -> (Simulation, Slot, Vec<Slot>) {
    let mut world = World::new();
    let enemy = world.create_enemy(SpriteSheet::Enemy).expect("empty store");
    let members = (0..allies)
        .map(|ordinal| {
            let sprite = if ordinal % 2 == 0 {
                SpriteSheet::PlayerBlue
            } else {
                SpriteSheet::PlayerGreen
            };
            world.create_player(sprite, ordinal).expect("roster fits")
        })
        .collect();
    (Simulation::new(world, Difficulty::Dormant), enemy, members)
}

/// Controller state with `button` held down.
#[must_use]
pub const fn held(button: Button) -> InputEvent {
    InputEvent::held(button)
}

/// Controller state with `button` released.
#[must_use]
pub const fn released(button: Button) -> InputEvent {
    InputEvent::released(button)
}

/// Advance `ticks` times with the same controller state.
///
/// # Panics
///
/// Panics if the simulation has no active player.
pub fn run_ticks(sim: &mut Simulation, input: InputEvent, ticks: usize) -> Vec<(OutputEvent, TickEvents)> {
    (0..ticks)
        .map(|_| {
            sim.advance_with_events(input, 0)
                .expect("simulation has an active player")
        })
        .collect()
}

/// Advance once with the given controller state.
///
/// # Panics
///
/// Panics if the simulation has no active player.
pub fn step(sim: &mut Simulation, input: InputEvent) -> (OutputEvent, TickEvents) {
    sim.advance_with_events(input, 0)
        .expect("simulation has an active player")
}

/// Play a script, returning every output event.
///
/// # Panics
///
/// Panics if the simulation has no active player.
pub fn replay(sim: &mut Simulation, script: &[ScriptedTick]) -> Vec<OutputEvent> {
    script
        .iter()
        .map(|tick| {
            sim.advance(tick.input, tick.random)
                .expect("simulation has an active player")
        })
        .collect()
}

/// Parse a RON list of scripted ticks.
///
/// # Errors
///
/// Returns the RON error if the text is malformed.
pub fn script_from_ron(text: &str) -> Result<Vec<ScriptedTick>, ron::error::SpannedError> {
    ron::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duel_fixture_pairs_slots() {
        let (sim, slots) = duel();
        assert_eq!(sim.world().active_player(), Some(slots.player));
        assert_eq!(sim.world().facing(slots.player), slots.enemy);
        assert_eq!(sim.world().facing(slots.enemy), slots.player);
    }

    #[test]
    fn test_roster_fixture_orders_members() {
        let (sim, enemy, members) = roster(3);
        assert_eq!(members.len(), 3);
        assert_eq!(sim.world().active_player(), Some(members[0]));
        assert!(members.iter().all(|&m| sim.world().facing(m) == enemy));
    }

    #[test]
    fn test_script_from_ron() {
        let script = script_from_ron(
            "[(input: (button_held: true, last_pressed: A), random: 7), (input: (button_held: false, last_pressed: A), random: 0)]",
        )
        .unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script[0].input, held(Button::A));
        assert_eq!(script[0].random, 7);
        assert_eq!(script[1].input, released(Button::A));
    }
}
