//! Output event handed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::combat::{Sound, TickEvents};
use crate::components::{AttackType, SpriteSheet};
use crate::world::World;

/// What the sprite and audio layers need to draw and play one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputEvent {
    /// Sheet of the active player character.
    pub active_sprite: SpriteSheet,
    /// Sheet of its opponent.
    pub opponent_sprite: SpriteSheet,
    /// Move of the active player character.
    pub active_move: AttackType,
    /// Move of its opponent.
    pub opponent_move: AttackType,
    /// Sound queued this tick.
    pub sound: Option<Sound>,
}

impl OutputEvent {
    /// Sound identifier, or 0 for silence.
    #[must_use]
    pub fn sound_id(&self) -> u8 {
        self.sound.map_or(0, Sound::id)
    }
}

/// Build the output event for the active pairing, carrying the tick's sound.
///
/// Returns `None` if the world has no active player.
pub fn render(world: &World, events: &TickEvents) -> Option<OutputEvent> {
    let player = world.active_player()?;
    let opponent = world.facing(player);
    let active = world.move_of(player);
    let other = world.move_of(opponent);

    Some(OutputEvent {
        active_sprite: active.sprite,
        opponent_sprite: other.sprite,
        active_move: active.kind,
        opponent_move: other.kind,
        sound: events.sound,
    })
}
