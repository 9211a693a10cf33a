//! Action issuance.
//!
//! Player input and the opponent controller both act on the world through
//! [`perform`], so the same guard conditions apply to either side. An action
//! whose guard condition fails is silently ignored: mistimed or repeated
//! input never errors and never corrupts state.

use serde::{Deserialize, Serialize};

use crate::combat::{
    Sound, SwitchEvent, TickEvents, ATTACK_FRAMES, FOLLOWUP_FRAMES, STAGGERED_FRAMES,
};
use crate::components::{AttackType, Slot};
use crate::world::World;

/// Something a character can attempt this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Start or continue the basic combo.
    BasicAttack,
    /// Start a heavy special or chain a special off the basic combo.
    SpecialAttack,
    /// Rotate to the next roster member.
    CharacterSwitch,
    /// Raise a guard.
    Guard,
    /// Attempt a parry.
    Parry,
    /// Drop whatever the character is doing.
    Idle,
}

/// Attempt an action for a slot.
pub fn perform(world: &mut World, events: &mut TickEvents, slot: Slot, action: Action) {
    match action {
        Action::BasicAttack => basic_attack(world, events, slot),
        Action::SpecialAttack => special_attack(world, events, slot),
        Action::CharacterSwitch => character_switch(world, events, slot),
        Action::Guard => guard(world, slot),
        Action::Parry => parry(world, slot),
        Action::Idle => idle(world, slot),
    }
}

/// Check if a swing is inside its chain window.
///
/// The window opens after the hit frame and closes before recovery ends.
#[must_use]
pub fn chain_window_open(world: &World, slot: Slot) -> bool {
    let frames = world.frames(slot);
    ATTACK_FRAMES < frames && frames < ATTACK_FRAMES + FOLLOWUP_FRAMES
}

/// Return a character to idle.
pub fn idle(world: &mut World, slot: Slot) {
    world.start_move(slot, AttackType::Idling);
}

/// Start or escalate the basic combo: 1 → 2 → 3 → 1.
pub fn basic_attack(world: &mut World, events: &mut TickEvents, slot: Slot) {
    let next = match world.kind(slot) {
        AttackType::Idling => Some(AttackType::BasicCombo1),
        kind if chain_window_open(world, slot) => match kind {
            AttackType::BasicCombo1 => Some(AttackType::BasicCombo2),
            AttackType::BasicCombo2 => Some(AttackType::BasicCombo3),
            AttackType::BasicCombo3 => Some(AttackType::BasicCombo1),
            _ => None,
        },
        _ => None,
    };

    if let Some(next) = next {
        world.start_move(slot, next);
        events.queue_sound(Sound::Swing);
    }
}

/// Start a heavy special, or chain a special off the active basic stage.
///
/// A press inside the chain window of any swing plays the swing sound, even
/// when the current move has nothing to chain into.
pub fn special_attack(world: &mut World, events: &mut TickEvents, slot: Slot) {
    let kind = world.kind(slot);
    let timed = kind.is_attack() && chain_window_open(world, slot);
    if timed {
        events.queue_sound(Sound::Swing);
    }

    let next = match kind {
        AttackType::Idling => Some(AttackType::SpecialHeavy),
        kind if timed => match kind {
            AttackType::BasicCombo1 => Some(AttackType::SpecialChain),
            AttackType::BasicCombo2 => Some(AttackType::SpecialFinisher),
            AttackType::BasicCombo3 => Some(AttackType::SpecialHeavy),
            _ => None,
        },
        _ => None,
    };

    if let Some(next) = next {
        world.start_move(slot, next);
        events.queue_sound(Sound::Swing);
    }
}

/// Raise a guard. Only possible from idle.
pub fn guard(world: &mut World, slot: Slot) {
    if world.kind(slot) == AttackType::Idling {
        world.start_move(slot, AttackType::Guarding);
    }
}

/// Attempt a parry. Only possible from idle.
pub fn parry(world: &mut World, slot: Slot) {
    if world.kind(slot) == AttackType::Idling {
        world.start_move(slot, AttackType::Parrying);
    }
}

/// Rotate the fight to the next roster member.
///
/// From idle the incoming character steps in briefly staggered. Inside the
/// chain window of a chained special the incoming character enters swinging
/// the third basic attack. Any other state rejects the switch.
pub fn character_switch(world: &mut World, events: &mut TickEvents, slot: Slot) {
    let Some(incoming) = next_teammate(world, slot) else {
        return;
    };

    let chained = match world.kind(slot) {
        AttackType::Idling => {
            idle(world, incoming);
            world.health_mut(incoming).staggered = STAGGERED_FRAMES;
            world.set_kind(incoming, AttackType::Staggered);
            false
        }
        AttackType::SpecialChain if chain_window_open(world, slot) => {
            world.set_kind(incoming, AttackType::BasicCombo3);
            true
        }
        _ => return,
    };

    if let Some(member) = world.team_member_mut(slot) {
        member.is_active = false;
    }
    if let Some(member) = world.team_member_mut(incoming) {
        member.is_active = true;
    }

    let opponent = world.facing(slot);
    let timing = world.timing_mut(incoming);
    timing.frames = 0;
    timing.facing = opponent;
    world.timing_mut(opponent).facing = incoming;
    world.set_active_player(incoming);

    tracing::debug!(from = %slot, to = %incoming, chained, "Character switch");
    events.switches.push(SwitchEvent {
        from: slot,
        to: incoming,
        chained,
    });
}

/// Find the roster member a switch from `slot` rotates to.
///
/// Prefers the next party ordinal, otherwise wraps to the lowest ordinal.
/// Returns `None` when `slot` is not a roster member or has no teammate.
#[must_use]
pub fn next_teammate(world: &World, slot: Slot) -> Option<Slot> {
    let ordinal = world.team_member(slot)?.ordinal;

    if let Some(successor) = ordinal.checked_add(1) {
        if let Some((next, _)) = world
            .roster()
            .find(|(_, member)| member.ordinal == successor)
        {
            return Some(next);
        }
    }

    let (lead, _) = world.roster().min_by_key(|(_, member)| member.ordinal)?;
    (lead != slot).then_some(lead)
}
