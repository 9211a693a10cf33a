//! Property tests for combat resolution under random play.

use duel_core::ai::Difficulty;
use duel_core::combat::{
    HitOutcome, Sound, CLEAN_HIT_DAMAGE, GUARD_CHIP_DAMAGE, HEAVY_GUARD_CHIP_DAMAGE,
};
use duel_core::components::AttackType;
use duel_core::config::StageConfig;
use duel_core::simulation::Simulation;
use duel_test_utils::determinism::strategies::{arb_difficulty, arb_script};
use proptest::prelude::*;

fn full_roster(difficulty: Difficulty) -> Simulation {
    Simulation::from_stage(&StageConfig {
        allies: 4,
        difficulty,
        ..StageConfig::default()
    })
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_hit_damage_matches_outcome(
        difficulty in arb_difficulty(),
        script in arb_script(400),
    ) {
        let mut sim = full_roster(difficulty);
        for tick in &script {
            let (_, events) = sim.advance_with_events(tick.input, tick.random).unwrap();
            for hit in &events.hits {
                match hit.outcome {
                    HitOutcome::Clean | HitOutcome::Fatal => {
                        prop_assert!(hit.damage <= CLEAN_HIT_DAMAGE);
                    }
                    HitOutcome::Guarded => {
                        let cap = if hit.attack == AttackType::SpecialHeavy {
                            HEAVY_GUARD_CHIP_DAMAGE
                        } else {
                            GUARD_CHIP_DAMAGE
                        };
                        prop_assert!(hit.damage <= cap);
                    }
                    HitOutcome::Parried => prop_assert_eq!(hit.damage, 0),
                }
            }
        }
    }

    #[test]
    fn prop_one_death_completes_per_tick(script in arb_script(600)) {
        let mut sim = full_roster(Difficulty::Perfect);
        for tick in &script {
            let (_, events) = sim.advance_with_events(tick.input, tick.random).unwrap();
            prop_assert!(events.removed.is_none() || events.terminal.is_none());
        }
    }

    #[test]
    fn prop_output_mirrors_world(
        difficulty in arb_difficulty(),
        script in arb_script(300),
    ) {
        let mut sim = full_roster(difficulty);
        for tick in &script {
            let (output, events) = sim.advance_with_events(tick.input, tick.random).unwrap();
            let world = sim.world();
            let player = world.active_player().unwrap();

            prop_assert_eq!(output.active_move, world.kind(player));
            prop_assert_eq!(output.opponent_move, world.kind(world.facing(player)));
            prop_assert_eq!(output.sound, events.sound);
            prop_assert!([0, Sound::Hit.id(), Sound::ParryGuard.id(), Sound::Swing.id()]
                .contains(&output.sound_id()));
            prop_assert_eq!(world.roster().filter(|(_, m)| m.is_active).count(), 1);
            prop_assert_eq!(world.validate(), Ok(()));
        }
    }
}
