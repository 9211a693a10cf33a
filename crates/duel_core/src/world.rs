//! Entity store and character factory.
//!
//! The world is a struct-of-arrays keyed by [`Slot`]. A slot exists iff its
//! [`ComponentMask`] is non-empty; creating or destroying an entity writes the
//! mask and every component together, so partially initialised entities
//! cannot be observed.

use serde::{Deserialize, Serialize};

use crate::components::{
    AttackType, ComponentMask, Health, Move, Slot, SpriteSheet, TeamMember, Timing,
    DEFAULT_HIT_POINTS, ENTITY_COUNT,
};
use crate::error::{DuelError, Result};

/// Storage for every entity in the duel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct World {
    mask: [ComponentMask; ENTITY_COUNT],
    health: [Health; ENTITY_COUNT],
    timing: [Timing; ENTITY_COUNT],
    moves: [Move; ENTITY_COUNT],
    team: [TeamMember; ENTITY_COUNT],
    /// The roster member the player currently controls.
    active_player: Option<Slot>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mask: [ComponentMask::empty(); ENTITY_COUNT],
            health: [Health::default(); ENTITY_COUNT],
            timing: [Timing::default(); ENTITY_COUNT],
            moves: [Move::default(); ENTITY_COUNT],
            team: [TeamMember::default(); ENTITY_COUNT],
            active_player: None,
        }
    }

    // ------------------------------------------------------------------------
    // Store
    // ------------------------------------------------------------------------

    /// Find the lowest unused slot.
    #[must_use]
    pub fn find_free_slot(&self) -> Option<Slot> {
        Slot::all().find(|&slot| self.mask[slot.index()].is_empty())
    }

    /// Free a slot, resetting all of its components.
    pub fn destroy(&mut self, slot: Slot) {
        let i = slot.index();
        self.mask[i] = ComponentMask::empty();
        self.health[i] = Health::default();
        self.timing[i] = Timing::default();
        self.moves[i] = Move::default();
        self.team[i] = TeamMember::default();
        if self.active_player == Some(slot) {
            self.active_player = None;
        }
    }

    /// Free every slot.
    pub fn destroy_all(&mut self) {
        *self = Self::new();
    }

    /// Check if a slot holds an entity.
    #[must_use]
    pub fn is_occupied(&self, slot: Slot) -> bool {
        !self.mask[slot.index()].is_empty()
    }

    /// Components present on a slot.
    #[must_use]
    pub fn mask(&self, slot: Slot) -> ComponentMask {
        self.mask[slot.index()]
    }

    /// Occupied slots in ascending order.
    pub fn occupied(&self) -> impl Iterator<Item = Slot> + '_ {
        Slot::all().filter(|&slot| self.is_occupied(slot))
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupied().count()
    }

    /// Check if no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied().next().is_none()
    }

    // ------------------------------------------------------------------------
    // Factory
    // ------------------------------------------------------------------------

    /// Create an enemy character.
    ///
    /// The enemy faces the slot above it, which is where the active player
    /// lands when every enemy of a stage is created before the roster.
    pub fn create_enemy(&mut self, sprite: SpriteSheet) -> Result<Slot> {
        let slot = self.allocate()?;
        let i = slot.index();

        self.mask[i] = ComponentMask::COMBATANT;
        self.health[i] = Health::new(DEFAULT_HIT_POINTS);
        self.timing[i] = Timing {
            frames: 0,
            facing: slot.next().unwrap_or(slot),
        };
        self.moves[i] = Move {
            sprite,
            kind: AttackType::Idling,
        };
        self.team[i] = TeamMember::default();

        tracing::trace!(%slot, ?sprite, "Created enemy");
        Ok(slot)
    }

    /// Create a playable roster member.
    ///
    /// Ordinal 0 becomes the active player and faces the most recently
    /// created enemy. Bench members face the active player's opponent.
    pub fn create_player(&mut self, sprite: SpriteSheet, ordinal: u8) -> Result<Slot> {
        let slot = self.allocate()?;
        let i = slot.index();
        let is_active = ordinal == 0;

        let facing = match self.active_player {
            Some(active) if !is_active => self.timing[active.index()].facing,
            _ => slot.prev().unwrap_or(slot),
        };

        self.mask[i] = ComponentMask::PLAYER;
        self.health[i] = Health::new(DEFAULT_HIT_POINTS);
        self.timing[i] = Timing { frames: 0, facing };
        self.moves[i] = Move {
            sprite,
            kind: AttackType::Idling,
        };
        self.team[i] = TeamMember { is_active, ordinal };

        if is_active {
            self.active_player = Some(slot);
        }

        tracing::trace!(%slot, ?sprite, ordinal, is_active, "Created player");
        Ok(slot)
    }

    fn allocate(&self) -> Result<Slot> {
        self.find_free_slot().ok_or(DuelError::StoreFull {
            capacity: ENTITY_COUNT,
        })
    }

    // ------------------------------------------------------------------------
    // Component access
    // ------------------------------------------------------------------------

    /// The character the player currently controls.
    #[must_use]
    pub const fn active_player(&self) -> Option<Slot> {
        self.active_player
    }

    /// Move the active-player reference.
    pub(crate) fn set_active_player(&mut self, slot: Slot) {
        self.active_player = Some(slot);
    }

    /// The opponent of the active player.
    #[must_use]
    pub fn active_opponent(&self) -> Option<Slot> {
        self.active_player.map(|slot| self.facing(slot))
    }

    /// Health of a slot.
    #[must_use]
    pub fn health(&self, slot: Slot) -> &Health {
        &self.health[slot.index()]
    }

    /// Mutable health of a slot.
    pub fn health_mut(&mut self, slot: Slot) -> &mut Health {
        &mut self.health[slot.index()]
    }

    /// Replace a character's hit points and species maximum.
    pub fn reset_health(&mut self, slot: Slot, points: u8) {
        self.health[slot.index()] = Health::new(points);
    }

    /// Timing of a slot.
    #[must_use]
    pub fn timing(&self, slot: Slot) -> &Timing {
        &self.timing[slot.index()]
    }

    /// Mutable timing of a slot.
    pub fn timing_mut(&mut self, slot: Slot) -> &mut Timing {
        &mut self.timing[slot.index()]
    }

    /// Frame counter of a slot.
    #[must_use]
    pub fn frames(&self, slot: Slot) -> u16 {
        self.timing[slot.index()].frames
    }

    /// Opponent of a slot.
    #[must_use]
    pub fn facing(&self, slot: Slot) -> Slot {
        self.timing[slot.index()].facing
    }

    /// Move component of a slot.
    #[must_use]
    pub fn move_of(&self, slot: Slot) -> &Move {
        &self.moves[slot.index()]
    }

    /// Current move of a slot.
    #[must_use]
    pub fn kind(&self, slot: Slot) -> AttackType {
        self.moves[slot.index()].kind
    }

    /// Set the move of a slot without touching its frame counter.
    pub fn set_kind(&mut self, slot: Slot, kind: AttackType) {
        self.moves[slot.index()].kind = kind;
    }

    /// Start a move from its first frame.
    pub fn start_move(&mut self, slot: Slot, kind: AttackType) {
        self.moves[slot.index()].kind = kind;
        self.timing[slot.index()].frames = 0;
    }

    /// Roster membership of a slot, if it is a playable character.
    #[must_use]
    pub fn team_member(&self, slot: Slot) -> Option<&TeamMember> {
        self.mask[slot.index()]
            .contains(ComponentMask::TEAM_MEMBER)
            .then(|| &self.team[slot.index()])
    }

    pub(crate) fn team_member_mut(&mut self, slot: Slot) -> Option<&mut TeamMember> {
        if self.mask[slot.index()].contains(ComponentMask::TEAM_MEMBER) {
            Some(&mut self.team[slot.index()])
        } else {
            None
        }
    }

    /// Occupied roster members with their membership, in slot order.
    pub fn roster(&self) -> impl Iterator<Item = (Slot, &TeamMember)> + '_ {
        self.occupied()
            .filter_map(|slot| self.team_member(slot).map(|member| (slot, member)))
    }

    /// Check if a slot is the active player or its current opponent.
    #[must_use]
    pub fn is_in_active_pairing(&self, slot: Slot) -> bool {
        self.active_player == Some(slot) || self.active_opponent() == Some(slot)
    }

    /// Check the structural invariants of the store.
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let active: Vec<Slot> = self
            .roster()
            .filter(|(_, member)| member.is_active)
            .map(|(slot, _)| slot)
            .collect();

        if self.roster().next().is_some() && active.len() != 1 {
            return Err(format!("expected one active roster member, found {}", active.len()));
        }
        if let Some(&slot) = active.first() {
            if self.active_player != Some(slot) {
                return Err(format!(
                    "active member {slot} does not match active player {:?}",
                    self.active_player
                ));
            }
        }

        for slot in self.occupied() {
            let health = self.health(slot);
            if health.points > health.max {
                return Err(format!("{slot} has {} of {} hit points", health.points, health.max));
            }
            if !self.mask(slot).contains(ComponentMask::COMBATANT) {
                return Err(format!("{slot} is missing combatant components"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(i: usize) -> Slot {
        Slot::new(i).unwrap()
    }

    #[test]
    fn test_empty_world_has_no_entities() {
        let world = World::new();
        assert!(world.is_empty());
        assert_eq!(world.find_free_slot(), Some(Slot::BOSS));
        assert_eq!(world.active_player(), None);
    }

    #[test]
    fn test_create_enemy_template() {
        let mut world = World::new();
        let enemy = world.create_enemy(SpriteSheet::Enemy).unwrap();

        assert_eq!(enemy, Slot::BOSS);
        assert_eq!(world.mask(enemy), ComponentMask::COMBATANT);
        assert_eq!(world.health(enemy).points, 10);
        assert_eq!(world.health(enemy).staggered, 0);
        assert_eq!(world.frames(enemy), 0);
        assert_eq!(world.facing(enemy), slot(1));
        assert_eq!(world.kind(enemy), AttackType::Idling);
        assert!(world.team_member(enemy).is_none());
    }

    #[test]
    fn test_create_player_links_to_last_enemy() {
        let mut world = World::new();
        world.create_enemy(SpriteSheet::Enemy).unwrap();
        let enemy = world.create_enemy(SpriteSheet::Enemy).unwrap();
        let player = world.create_player(SpriteSheet::PlayerBlue, 0).unwrap();

        assert_eq!(world.active_player(), Some(player));
        assert_eq!(world.facing(player), enemy);
        assert_eq!(world.facing(enemy), player);
        assert!(world.team_member(player).unwrap().is_active);
    }

    #[test]
    fn test_bench_member_faces_active_opponent() {
        let mut world = World::new();
        let enemy = world.create_enemy(SpriteSheet::Enemy).unwrap();
        let lead = world.create_player(SpriteSheet::PlayerBlue, 0).unwrap();
        let bench = world.create_player(SpriteSheet::PlayerGreen, 1).unwrap();

        assert_eq!(world.active_player(), Some(lead));
        assert_eq!(world.facing(bench), enemy);
        let member = world.team_member(bench).unwrap();
        assert!(!member.is_active);
        assert_eq!(member.ordinal, 1);
    }

    #[test]
    fn test_full_store_reports_no_slot() {
        let mut world = World::new();
        for _ in 0..ENTITY_COUNT {
            world.create_enemy(SpriteSheet::Enemy).unwrap();
        }

        assert_eq!(world.find_free_slot(), None);
        assert!(matches!(
            world.create_enemy(SpriteSheet::Enemy),
            Err(DuelError::StoreFull { capacity: ENTITY_COUNT })
        ));
    }

    #[test]
    fn test_last_slot_enemy_faces_itself() {
        let mut world = World::new();
        let mut last = Slot::BOSS;
        for _ in 0..ENTITY_COUNT {
            last = world.create_enemy(SpriteSheet::Enemy).unwrap();
        }
        assert_eq!(world.facing(last), last);
    }

    #[test]
    fn test_destroy_resets_components() {
        let mut world = World::new();
        let enemy = world.create_enemy(SpriteSheet::Enemy).unwrap();
        world.health_mut(enemy).points = 3;
        world.start_move(enemy, AttackType::Dying);

        world.destroy(enemy);

        assert!(!world.is_occupied(enemy));
        assert_eq!(world.kind(enemy), AttackType::Idling);
        assert_eq!(world.find_free_slot(), Some(enemy));
    }

    #[test]
    fn test_destroy_all_clears_active_player() {
        let mut world = World::new();
        world.create_enemy(SpriteSheet::Enemy).unwrap();
        world.create_player(SpriteSheet::PlayerBlue, 0).unwrap();

        world.destroy_all();

        assert!(world.is_empty());
        assert_eq!(world.active_player(), None);
    }

    #[test]
    fn test_freed_slot_is_reused_first() {
        let mut world = World::new();
        let a = world.create_enemy(SpriteSheet::Enemy).unwrap();
        world.create_enemy(SpriteSheet::Enemy).unwrap();
        world.destroy(a);
        assert_eq!(world.create_enemy(SpriteSheet::Enemy).unwrap(), a);
    }

    #[test]
    fn test_validate_accepts_fresh_roster() {
        let mut world = World::new();
        world.create_enemy(SpriteSheet::Enemy).unwrap();
        world.create_player(SpriteSheet::PlayerBlue, 0).unwrap();
        world.create_player(SpriteSheet::PlayerGreen, 1).unwrap();
        assert_eq!(world.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_overhealed_entity() {
        let mut world = World::new();
        let enemy = world.create_enemy(SpriteSheet::Enemy).unwrap();
        world.health_mut(enemy).points = 20;
        assert!(world.validate().is_err());
    }
}
