//! Component definitions.
//!
//! Components are pure data with no behavior. Every entity in the duel is
//! composed of a fixed, small set of these components, flagged present by a
//! [`ComponentMask`] in its slot.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of entities in the world.
pub const ENTITY_COUNT: usize = 20;

/// Highest representable hit point value.
pub const MAX_HIT_POINTS: u8 = 31;

/// Hit points of a freshly created character template.
pub const DEFAULT_HIT_POINTS: u8 = 10;

// ============================================================================
// Slot
// ============================================================================

/// Error returned when converting an out-of-range index into a [`Slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Slot index {0} is outside the entity store (capacity {ENTITY_COUNT})")]
pub struct InvalidSlot(pub usize);

/// Index of an entity in the fixed-capacity store.
///
/// A `Slot` is always in `0..ENTITY_COUNT`; the only ways to obtain one are
/// checked constructors, so indexing component arrays with it cannot go out
/// of bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Slot(u8);

impl Slot {
    /// Slot reserved for the stage's final enemy.
    pub const BOSS: Self = Self(0);

    /// Create a slot, returning `None` if the index is out of range.
    #[must_use]
    pub const fn new(index: usize) -> Option<Self> {
        if index < ENTITY_COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// The array index of this slot.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The slot directly above this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        Self::new(self.index() + 1)
    }

    /// The slot directly below this one, if any.
    #[must_use]
    pub const fn prev(self) -> Option<Self> {
        match self.0 {
            0 => None,
            n => Some(Self(n - 1)),
        }
    }

    /// Iterate over every slot in ascending order.
    pub fn all() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (0..ENTITY_COUNT as u8).map(Self)
    }
}

impl TryFrom<u8> for Slot {
    type Error = InvalidSlot;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value as usize).ok_or(InvalidSlot(value as usize))
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Component mask
// ============================================================================

bitflags! {
    /// Set of components present on a slot. Empty means the slot is free.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ComponentMask: u16 {
        /// [`Health`] component.
        const HEALTH = 1 << 0;
        /// [`Timing`] component.
        const TIMING = 1 << 1;
        /// Sprite sheet part of [`Move`].
        const SPRITE = 1 << 2;
        /// [`Move`] component.
        const MOVE = 1 << 3;
        /// [`TeamMember`] component.
        const TEAM_MEMBER = 1 << 4;

        /// Components every combatant carries.
        const COMBATANT = Self::HEALTH.bits()
            | Self::TIMING.bits()
            | Self::SPRITE.bits()
            | Self::MOVE.bits();
        /// Components of a playable roster member.
        const PLAYER = Self::COMBATANT.bits() | Self::TEAM_MEMBER.bits();
    }
}

// ============================================================================
// Move identity
// ============================================================================

/// Sprite sheet a character is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SpriteSheet {
    /// Blue player character.
    #[default]
    PlayerBlue,
    /// Green player character.
    PlayerGreen,
    /// Red enemy character.
    Enemy,
}

impl SpriteSheet {
    /// Numeric identifier handed to the sprite layer.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::PlayerBlue => 0,
            Self::PlayerGreen => 1,
            Self::Enemy => 2,
        }
    }
}

/// Move a character is executing, ordered like the animations on a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AttackType {
    /// Standing idle.
    #[default]
    Idling,
    /// First basic attack.
    BasicCombo1,
    /// Second basic attack.
    BasicCombo2,
    /// Third basic attack.
    BasicCombo3,
    /// Heavy special attack; chips harder through a guard.
    SpecialHeavy,
    /// Special chained off the first basic attack.
    SpecialChain,
    /// Special chained off the second basic attack.
    SpecialFinisher,
    /// Guarding stance.
    Guarding,
    /// Parrying.
    Parrying,
    /// Recovering from a hit or a parried swing.
    Staggered,
    /// Death animation; terminal until the slot is removed.
    Dying,
}

impl AttackType {
    /// Animation identifier handed to the sprite layer.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Check if this move is a swing that can land a hit.
    #[must_use]
    pub const fn is_attack(self) -> bool {
        !matches!(
            self,
            Self::Idling | Self::Guarding | Self::Parrying | Self::Staggered | Self::Dying
        )
    }
}

// ============================================================================
// Components
// ============================================================================

/// Hit points and stagger state.
///
/// `staggered` counts the ticks the character remains unable to act;
/// zero means not staggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current hit points.
    pub points: u8,
    /// Species maximum; `points` never exceeds it.
    pub max: u8,
    /// Ticks remaining staggered.
    pub staggered: u8,
}

impl Health {
    /// Create full health, clamped to [`MAX_HIT_POINTS`].
    #[must_use]
    pub const fn new(points: u8) -> Self {
        let points = if points > MAX_HIT_POINTS {
            MAX_HIT_POINTS
        } else {
            points
        };
        Self {
            points,
            max: points,
            staggered: 0,
        }
    }

    /// Remove hit points.
    ///
    /// A blow that would take the character to zero or below leaves it at
    /// 0 if `fatal`, or at 1 otherwise.
    pub fn apply_damage(&mut self, amount: u8, fatal: bool) {
        if self.points > amount {
            self.points -= amount;
        } else {
            self.points = u8::from(!fatal);
        }
    }

    /// Check if hit points are exhausted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.points == 0
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(DEFAULT_HIT_POINTS)
    }
}

/// Progress through the current move and the current opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Timing {
    /// Ticks the current move has played for. Zero while idle.
    pub frames: u16,
    /// Slot of the opponent this character interacts with.
    pub facing: Slot,
}

impl Default for Slot {
    fn default() -> Self {
        Self::BOSS
    }
}

/// Current move and the sheet it is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Move {
    /// Sprite sheet of the character.
    pub sprite: SpriteSheet,
    /// Move being executed.
    pub kind: AttackType,
}

/// Roster membership of a playable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TeamMember {
    /// Whether the player controls this character right now.
    pub is_active: bool,
    /// Bench order; 0 is the starting lead.
    pub ordinal: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_range_checked() {
        assert_eq!(Slot::new(0), Some(Slot::BOSS));
        assert!(Slot::new(ENTITY_COUNT - 1).is_some());
        assert!(Slot::new(ENTITY_COUNT).is_none());
        assert_eq!(Slot::try_from(20u8), Err(InvalidSlot(20)));
    }

    #[test]
    fn test_slot_neighbours() {
        let last = Slot::new(ENTITY_COUNT - 1).unwrap();
        assert!(last.next().is_none());
        assert!(Slot::BOSS.prev().is_none());
        assert_eq!(Slot::new(3).unwrap().prev(), Slot::new(2));
        assert_eq!(Slot::all().count(), ENTITY_COUNT);
    }

    #[test]
    fn test_slots_below_walk_downwards() {
        assert_eq!(Slot::all().len(), ENTITY_COUNT);
        let below: Vec<usize> = Slot::all().take(4).rev().map(Slot::index).collect();
        assert_eq!(below, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_health_clamped_to_field_range() {
        let health = Health::new(200);
        assert_eq!(health.points, MAX_HIT_POINTS);
        assert_eq!(health.max, MAX_HIT_POINTS);
    }

    #[test]
    fn test_fatal_damage_reaches_zero() {
        let mut health = Health::new(10);
        health.apply_damage(4, true);
        assert_eq!(health.points, 6);
        health.apply_damage(8, true);
        assert_eq!(health.points, 0);
        assert!(health.is_depleted());
    }

    #[test]
    fn test_non_fatal_damage_leaves_one_point() {
        let mut health = Health::new(2);
        health.apply_damage(2, false);
        assert_eq!(health.points, 1);
        health.apply_damage(1, false);
        assert_eq!(health.points, 1);
    }

    #[test]
    fn test_attack_classification() {
        assert!(AttackType::BasicCombo1.is_attack());
        assert!(AttackType::SpecialFinisher.is_attack());
        assert!(!AttackType::Guarding.is_attack());
        assert!(!AttackType::Dying.is_attack());
        assert_eq!(AttackType::Dying.id(), 10);
    }

    #[test]
    fn test_player_mask_contains_combatant() {
        assert!(ComponentMask::PLAYER.contains(ComponentMask::COMBATANT));
        assert!(!ComponentMask::COMBATANT.contains(ComponentMask::TEAM_MEMBER));
    }
}
