//! Scripted player strategies.
//!
//! A strategy stands in for the person holding the controller. It sees the
//! same world the renderer would show and answers with one controller state
//! per tick.
//!
//! # Example
//!
//! ```
//! use duel_headless::strategies::PlayerStrategy;
//!
//! let strategy = PlayerStrategy::from_name("counter").unwrap();
//! assert_eq!(strategy.name(), "counter");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use duel_core::combat::{ATTACK_FRAMES, PARRY_FRAMES};
use duel_core::components::AttackType;
use duel_core::input::{Button, InputEvent};
use duel_core::world::World;

use crate::error::{read_file, HeadlessError, Result};
use crate::rng::FrameRng;

/// Opponent frame count at which the counter strategy presses parry.
///
/// Pressing here leaves the parry well inside its window when the swing lands.
pub const PARRY_PRESS_FRAME: u16 = ATTACK_FRAMES - PARRY_FRAMES + 2;

/// Buttons the mash strategy picks from.
const MASH_BUTTONS: [Button; 5] = [Button::A, Button::B, Button::C, Button::Up, Button::Down];

/// How the headless player drives the controller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerStrategy {
    /// Never touches the controller.
    #[default]
    Idle,
    /// Holds a random combat button every tick.
    Mash,
    /// Parries incoming swings and punishes openings.
    Counter,
    /// Replays a fixed input list, looping when it runs out.
    Scripted(Vec<InputEvent>),
}

impl PlayerStrategy {
    /// Built-in strategy names accepted by [`PlayerStrategy::from_name`].
    pub const NAMES: [&'static str; 3] = ["idle", "mash", "counter"];

    /// Look up a built-in strategy by name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "mash" => Ok(Self::Mash),
            "counter" => Ok(Self::Counter),
            _ => Err(HeadlessError::UnknownStrategy(name.to_string())),
        }
    }

    /// Load a scripted strategy from a RON list of controller states.
    pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = read_file(path.as_ref())?;
        Self::script_from_ron_str(&contents)
    }

    /// Parse a scripted strategy from a RON list of controller states.
    pub fn script_from_ron_str(ron: &str) -> Result<Self> {
        let script: Vec<InputEvent> = ron::from_str(ron)?;
        Ok(Self::Scripted(script))
    }

    /// Short name for reports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Mash => "mash",
            Self::Counter => "counter",
            Self::Scripted(_) => "scripted",
        }
    }

    /// Controller state for `tick`.
    pub fn input(&self, tick: u64, world: &World, rng: &mut FrameRng) -> InputEvent {
        match self {
            Self::Idle => InputEvent::default(),
            Self::Mash => InputEvent::held(MASH_BUTTONS[rng.next_index(MASH_BUTTONS.len())]),
            Self::Counter => counter(world),
            Self::Scripted(script) => {
                if script.is_empty() {
                    return InputEvent::default();
                }
                let len = script.len() as u64;
                usize::try_from(tick % len)
                    .ok()
                    .and_then(|i| script.get(i))
                    .copied()
                    .unwrap_or_default()
            }
        }
    }
}

fn counter(world: &World) -> InputEvent {
    let Some(player) = world.active_player() else {
        return InputEvent::default();
    };
    let opponent = world.facing(player);
    let ours = world.kind(player);
    let theirs = world.kind(opponent);

    match theirs {
        _ if theirs.is_attack() => {
            if ours == AttackType::Idling && world.frames(opponent) >= PARRY_PRESS_FRAME {
                InputEvent::held(Button::Up)
            } else {
                InputEvent::released(Button::Up)
            }
        }
        // Keep pressing into an open opponent; the combo chains on its own.
        AttackType::Staggered => InputEvent::held(Button::A),
        AttackType::Guarding => InputEvent::held(Button::B),
        _ => InputEvent::released(Button::A),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_core::components::SpriteSheet;

    fn duel() -> World {
        let mut world = World::new();
        world.create_enemy(SpriteSheet::Enemy).unwrap();
        world.create_player(SpriteSheet::PlayerBlue, 0).unwrap();
        world
    }

    #[test]
    fn test_from_name() {
        for name in PlayerStrategy::NAMES {
            assert_eq!(PlayerStrategy::from_name(name).unwrap().name(), name);
        }
        assert_eq!(PlayerStrategy::from_name("COUNTER").unwrap(), PlayerStrategy::Counter);
        assert!(matches!(
            PlayerStrategy::from_name("turtle"),
            Err(HeadlessError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_idle_never_presses() {
        let world = duel();
        let mut rng = FrameRng::new(0);
        for tick in 0..10 {
            assert_eq!(
                PlayerStrategy::Idle.input(tick, &world, &mut rng),
                InputEvent::default()
            );
        }
    }

    #[test]
    fn test_mash_holds_combat_buttons() {
        let world = duel();
        let mut rng = FrameRng::new(9);
        for tick in 0..100 {
            let input = PlayerStrategy::Mash.input(tick, &world, &mut rng);
            assert!(input.button_held);
            assert!(MASH_BUTTONS.contains(&input.last_pressed));
        }
    }

    #[test]
    fn test_script_loops() {
        let strategy = PlayerStrategy::script_from_ron_str(
            "[(button_held: true, last_pressed: A), (button_held: false, last_pressed: A)]",
        )
        .unwrap();
        let world = duel();
        let mut rng = FrameRng::new(0);

        assert_eq!(strategy.input(0, &world, &mut rng), InputEvent::held(Button::A));
        assert_eq!(strategy.input(1, &world, &mut rng), InputEvent::released(Button::A));
        assert_eq!(strategy.input(2, &world, &mut rng), InputEvent::held(Button::A));
        assert_eq!(
            PlayerStrategy::Scripted(Vec::new()).input(5, &world, &mut rng),
            InputEvent::default()
        );
    }

    #[test]
    fn test_counter_waits_then_parries() {
        let mut world = duel();
        let player = world.active_player().unwrap();
        let enemy = world.facing(player);
        world.start_move(enemy, AttackType::BasicCombo1);
        let mut rng = FrameRng::new(0);

        assert!(!PlayerStrategy::Counter.input(0, &world, &mut rng).button_held);

        world.timing_mut(enemy).frames = PARRY_PRESS_FRAME;
        assert_eq!(
            PlayerStrategy::Counter.input(0, &world, &mut rng),
            InputEvent::held(Button::Up)
        );
    }

    #[test]
    fn test_counter_punishes_openings() {
        let mut world = duel();
        let player = world.active_player().unwrap();
        let enemy = world.facing(player);
        let mut rng = FrameRng::new(0);

        world.set_kind(enemy, AttackType::Staggered);
        assert_eq!(
            PlayerStrategy::Counter.input(0, &world, &mut rng),
            InputEvent::held(Button::A)
        );

        world.set_kind(enemy, AttackType::Guarding);
        assert_eq!(
            PlayerStrategy::Counter.input(0, &world, &mut rng),
            InputEvent::held(Button::B)
        );
    }

    #[test]
    fn test_load_missing_script() {
        assert!(matches!(
            PlayerStrategy::load_script("/nonexistent/script.ron"),
            Err(HeadlessError::FileNotFound(_))
        ));
    }
}
