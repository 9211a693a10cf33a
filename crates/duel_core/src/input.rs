//! Player input mapping.
//!
//! The platform layer reports one controller edge per tick. At most one
//! [`Action`] is derived from it and issued for the active player.

use serde::{Deserialize, Serialize};

use crate::actions::{self, Action};
use crate::combat::TickEvents;
use crate::components::AttackType;
use crate::world::World;

/// Controller buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Button {
    /// No button.
    #[default]
    None,
    /// Basic attack.
    A,
    /// Special attack.
    B,
    /// Character switch.
    C,
    /// Parry.
    Up,
    /// Guard.
    Down,
    /// Unused in combat.
    Left,
    /// Unused in combat.
    Right,
    /// Unused in combat.
    Start,
    /// Unused in combat.
    Select,
}

/// Controller state for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct InputEvent {
    /// Whether `last_pressed` is still held down.
    pub button_held: bool,
    /// Most recent button edge.
    pub last_pressed: Button,
}

impl InputEvent {
    /// A button held down this tick.
    #[must_use]
    pub const fn held(button: Button) -> Self {
        Self {
            button_held: true,
            last_pressed: button,
        }
    }

    /// A button released before this tick.
    #[must_use]
    pub const fn released(button: Button) -> Self {
        Self {
            button_held: false,
            last_pressed: button,
        }
    }
}

/// Map a controller state to the action it requests, ignoring game state.
#[must_use]
pub const fn action_for(input: InputEvent) -> Option<Action> {
    if !input.button_held {
        return None;
    }
    match input.last_pressed {
        Button::A => Some(Action::BasicAttack),
        Button::B => Some(Action::SpecialAttack),
        Button::C => Some(Action::CharacterSwitch),
        Button::Up => Some(Action::Parry),
        Button::Down => Some(Action::Guard),
        Button::None | Button::Left | Button::Right | Button::Start | Button::Select => None,
    }
}

/// Issue the action requested by the controller for the active player.
///
/// Input is ignored while either side of the active pairing is dying.
/// Releasing the controller drops a raised guard.
pub fn input_system(world: &mut World, events: &mut TickEvents, input: InputEvent) {
    let Some(player) = world.active_player() else {
        return;
    };
    let opponent = world.facing(player);
    if world.kind(player) == AttackType::Dying || world.kind(opponent) == AttackType::Dying {
        return;
    }

    if let Some(action) = action_for(input) {
        actions::perform(world, events, player, action);
    } else if !input.button_held && world.kind(player) == AttackType::Guarding {
        actions::idle(world, player);
    }
}
