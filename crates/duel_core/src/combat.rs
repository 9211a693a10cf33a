//! Frame-stepped combat resolution.
//!
//! Every tick, each occupied slot advances through its move in ascending
//! slot order:
//! - Stagger countdown ticks down
//! - Finished swings, parries and staggers fall back to idle
//! - Non-idle moves advance their frame counter
//! - A swing lands exactly on [`ATTACK_FRAMES`] against the facing opponent
//! - A finished death animation removes the slot or raises a terminal signal
//!
//! Slot order is part of the rules: an opponent processed earlier in the tick
//! has already advanced its own frame counter when a later slot's swing
//! lands. At most one death is completed per tick; processing stops there.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use crate::actions;
use crate::components::{AttackType, Slot};
use crate::world::World;

/// Ticks between animation frames on the sprite sheets.
pub const ANIMATION_SPEED: u16 = 5;

/// Frames before a swing lands.
pub const ATTACK_FRAMES: u16 = 4 * ANIMATION_SPEED;

/// Frames of recovery after a swing lands; also the chain window.
pub const FOLLOWUP_FRAMES: u16 = 2 * ANIMATION_SPEED;

/// Frames a parry can catch a swing.
pub const PARRY_FRAMES: u16 = 2 * ANIMATION_SPEED;

/// Ticks a character stays staggered after a clean hit.
pub const STAGGERED_FRAMES: u8 = (3 * ANIMATION_SPEED) as u8;

/// Ticks an attacker stays staggered after being parried.
pub const PARRIED_STAGGER_FRAMES: u8 = STAGGERED_FRAMES + 8;

/// Frames for a death animation to play out.
pub const DEATH_FRAMES: u16 = 6 * ANIMATION_SPEED;

/// Damage of a clean hit.
pub const CLEAN_HIT_DAMAGE: u8 = 4;

/// Damage a swing chips through a held guard.
pub const GUARD_CHIP_DAMAGE: u8 = 1;

/// Damage a heavy special chips through a held guard.
pub const HEAVY_GUARD_CHIP_DAMAGE: u8 = 2;

/// Sound effect queued for the audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    /// A clean hit connected.
    Hit,
    /// A swing met a guard or a parry.
    ParryGuard,
    /// A swing started.
    Swing,
}

impl Sound {
    /// Identifier of the sound effect; zero is reserved for silence.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Hit => 64,
            Self::ParryGuard => 65,
            Self::Swing => 66,
        }
    }
}

/// How a landed swing was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitOutcome {
    /// Defender took the full blow and is staggered.
    Clean,
    /// Defender took the full blow and is dying.
    Fatal,
    /// Defender's guard absorbed the blow, possibly chipping it.
    Guarded,
    /// Defender parried; the attacker is staggered.
    Parried,
}

/// A swing that reached its hit frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitEvent {
    /// Slot that swung.
    pub attacker: Slot,
    /// Slot the swing was aimed at.
    pub defender: Slot,
    /// Move that landed.
    pub attack: AttackType,
    /// How the defender received it.
    pub outcome: HitOutcome,
    /// Hit points the defender actually lost.
    pub damage: u8,
}

/// A completed roster rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwitchEvent {
    /// Character leaving the fight.
    pub from: Slot,
    /// Character entering the fight.
    pub to: Slot,
    /// Whether the switch was chained off a special attack.
    pub chained: bool,
}

/// A finished death that the surrounding game loop must act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terminal {
    /// The active player character finished dying.
    PlayerDefeated(Slot),
    /// The boss finished dying.
    BossDefeated,
}

/// Events generated during a tick.
///
/// The game layer uses these to trigger sounds, animations and stage flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Sound to play this tick; the latest queued sound wins.
    pub sound: Option<Sound>,
    /// Swings that reached their hit frame.
    pub hits: Vec<HitEvent>,
    /// Roster rotations.
    pub switches: Vec<SwitchEvent>,
    /// Slot removed after its death animation.
    pub removed: Option<Slot>,
    /// Terminal death, if one finished this tick.
    pub terminal: Option<Terminal>,
}

impl TickEvents {
    /// Queue a sound, replacing any sound queued earlier this tick.
    pub fn queue_sound(&mut self, sound: Sound) {
        self.sound = Some(sound);
    }
}

/// Advance every occupied slot by one tick.
pub fn combat_system(world: &mut World, events: &mut TickEvents) {
    for slot in Slot::all() {
        if !world.is_occupied(slot) {
            continue;
        }
        if advance_slot(world, events, slot).is_break() {
            break;
        }
    }
}

fn advance_slot(world: &mut World, events: &mut TickEvents, slot: Slot) -> ControlFlow<()> {
    let health = world.health_mut(slot);
    if health.staggered > 0 {
        health.staggered -= 1;
    }

    let frames = world.frames(slot);
    if world.kind(slot).is_attack() && frames > ATTACK_FRAMES + FOLLOWUP_FRAMES {
        actions::idle(world, slot);
    }
    if world.kind(slot) == AttackType::Parrying && frames > PARRY_FRAMES + FOLLOWUP_FRAMES {
        actions::idle(world, slot);
    }
    if world.kind(slot) == AttackType::Staggered && world.health(slot).staggered == 0 {
        actions::idle(world, slot);
    }

    if matches!(world.kind(slot), AttackType::Idling | AttackType::Staggered) {
        return ControlFlow::Continue(());
    }

    let timing = world.timing_mut(slot);
    timing.frames = timing.frames.saturating_add(1);
    let frames = timing.frames;

    if frames == ATTACK_FRAMES && world.kind(slot).is_attack() {
        resolve_hit(world, events, slot);
        return ControlFlow::Continue(());
    }

    if world.kind(slot) == AttackType::Dying && frames == DEATH_FRAMES {
        finish_death(world, events, slot);
        return ControlFlow::Break(());
    }

    ControlFlow::Continue(())
}

fn resolve_hit(world: &mut World, events: &mut TickEvents, attacker: Slot) {
    let defender = world.facing(attacker);
    let attack = world.kind(attacker);
    let points_before = world.health(defender).points;

    let outcome = match world.kind(defender) {
        AttackType::Guarding => {
            events.queue_sound(Sound::ParryGuard);
            // A freshly raised guard blocks everything.
            if world.frames(defender) > PARRY_FRAMES / 2 {
                let chip = if attack == AttackType::SpecialHeavy {
                    HEAVY_GUARD_CHIP_DAMAGE
                } else {
                    GUARD_CHIP_DAMAGE
                };
                world.health_mut(defender).apply_damage(chip, false);
            }
            HitOutcome::Guarded
        }
        AttackType::Parrying if world.frames(defender) < PARRY_FRAMES => {
            events.queue_sound(Sound::ParryGuard);
            world.health_mut(attacker).staggered = PARRIED_STAGGER_FRAMES;
            world.start_move(attacker, AttackType::Staggered);
            HitOutcome::Parried
        }
        _ => {
            world.health_mut(defender).apply_damage(CLEAN_HIT_DAMAGE, true);
            events.queue_sound(Sound::Hit);
            if world.health(defender).is_depleted() {
                world.start_move(defender, AttackType::Dying);
                HitOutcome::Fatal
            } else {
                world.set_kind(defender, AttackType::Staggered);
                world.health_mut(defender).staggered = STAGGERED_FRAMES;
                HitOutcome::Clean
            }
        }
    };

    let damage = points_before.saturating_sub(world.health(defender).points);
    tracing::debug!(%attacker, %defender, ?attack, ?outcome, damage, "Swing landed");
    events.hits.push(HitEvent {
        attacker,
        defender,
        attack,
        outcome,
        damage,
    });
}

fn finish_death(world: &mut World, events: &mut TickEvents, slot: Slot) {
    if world.active_player() == Some(slot) {
        tracing::debug!(%slot, "Active player defeated");
        events.terminal = Some(Terminal::PlayerDefeated(slot));
        return;
    }
    if slot == Slot::BOSS {
        tracing::debug!(%slot, "Boss defeated");
        events.terminal = Some(Terminal::BossDefeated);
        return;
    }

    let was_opponent = world.active_opponent() == Some(slot);
    world.destroy(slot);
    events.removed = Some(slot);
    tracing::debug!(%slot, "Removed defeated character");

    if !was_opponent {
        return;
    }
    let Some(player) = world.active_player() else {
        return;
    };
    match next_opponent_below(world, slot) {
        Some(next) => {
            world.timing_mut(player).facing = next;
            actions::idle(world, next);
            world.timing_mut(next).facing = player;
            tracing::debug!(%player, opponent = %next, "Next opponent steps in");
        }
        None => tracing::warn!(%player, "No opponent left below {slot}"),
    }
}

/// Nearest occupied non-roster slot below `slot`.
fn next_opponent_below(world: &World, slot: Slot) -> Option<Slot> {
    Slot::all()
        .take(slot.index())
        .rev()
        .find(|&candidate| world.is_occupied(candidate) && world.team_member(candidate).is_none())
}
