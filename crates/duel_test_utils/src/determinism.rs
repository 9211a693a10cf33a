//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the duel simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Scenario tests and headless batch reports are only meaningful if a run
//! can be reproduced tick for tick. Sources of non-determinism include:
//!
//! - **System randomness**: The opponent controller only ever sees the random
//!   value passed to [`Simulation::advance`]. Callers use seeded generators.
//!
//! - **Hidden session state**: The opponent accumulator and the active player
//!   live inside the [`Simulation`] value, so two simulations never share
//!   state.
//!
//! - **Iteration order**: Combat resolution visits slots in ascending order.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual system behavior (combat, actions, input)
//! 2. **Property tests**: Random input scripts must replay identically
//! 3. **Integration tests**: Full stage scenarios are reproducible
//! 4. **Parallel tests**: Running N simulations in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use duel_core::simulation::Simulation;

use crate::fixtures::ScriptedTick;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick, given the tick index
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use duel_test_utils::determinism::verify_determinism;
/// use duel_test_utils::fixtures::{duel, held};
/// use duel_core::input::Button;
///
/// let result = verify_determinism(
///     3,   // Run 3 times
///     100, // 100 ticks each
///     || duel().0,
///     |sim, _| {
///         sim.advance(held(Button::A), 0).unwrap();
///     },
///     |sim| sim.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for tick in 0..ticks {
            step(&mut state, tick);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Play a script on a simulation, stopping early if it has no active player.
fn play(sim: &mut Simulation, script: &[ScriptedTick]) {
    for tick in script {
        if sim.advance(tick.input, tick.random).is_err() {
            break;
        }
    }
}

/// Play the same script twice from identical setups and compare final hashes.
pub fn verify_script_determinism<F>(setup_fn: F, script: &[ScriptedTick]) -> bool
where
    F: Fn() -> Simulation,
{
    let result = verify_determinism(
        2,
        script.len() as u64,
        &setup_fn,
        |sim, tick| {
            let scripted = usize::try_from(tick).ok().and_then(|i| script.get(i));
            if let Some(scripted) = scripted {
                let _ = sim.advance(scripted.input, scripted.random);
            }
        },
        |sim| sim.state_hash(),
    );
    result.is_deterministic
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run N simulations of the same script on scoped threads.
///
/// Independent simulations share no state, so every thread must reach the
/// same final hash.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(
    setup_fn: F,
    script: &[ScriptedTick],
    num_sims: usize,
) -> ParallelSimResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    play(&mut sim, script);
                    sim.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelSimResult {
        hashes,
        ticks: script.len() as u64,
        num_sims,
    }
}

/// Compare two simulation runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if simulations are deterministic, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, script: &[ScriptedTick]) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for (tick, scripted) in (1u64..).zip(script) {
        let out1 = sim1.advance(scripted.input, scripted.random).ok();
        let out2 = sim2.advance(scripted.input, scripted.random).ok();

        if out1 != out2 || sim1.state_hash() != sim2.state_hash() {
            tracing::warn!(tick, "Simulations diverged");
            return Some(tick);
        }
    }

    None
}

/// Verify that an encode/decode round-trip preserves simulation state exactly.
pub fn verify_serialization_determinism<F>(setup_fn: F, script: &[ScriptedTick]) -> bool
where
    F: Fn() -> Simulation,
{
    let mut sim = setup_fn();
    play(&mut sim, script);

    let hash_before = sim.state_hash();

    let bytes = match sim.serialize() {
        Ok(b) => b,
        Err(_) => return false,
    };

    let restored = match Simulation::deserialize(&bytes) {
        Ok(s) => s,
        Err(_) => return false,
    };

    hash_before == restored.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible controller input for
/// property-based testing of the duel.
pub mod strategies {
    use duel_core::ai::Difficulty;
    use duel_core::config::StageConfig;
    use duel_core::input::{Button, InputEvent};
    use proptest::prelude::*;

    use crate::fixtures::ScriptedTick;

    /// Generate any controller button.
    pub fn arb_button() -> impl Strategy<Value = Button> {
        prop_oneof![
            Just(Button::None),
            Just(Button::A),
            Just(Button::B),
            Just(Button::C),
            Just(Button::Up),
            Just(Button::Down),
            Just(Button::Left),
            Just(Button::Right),
            Just(Button::Start),
            Just(Button::Select),
        ]
    }

    /// Generate a controller state.
    pub fn arb_input_event() -> impl Strategy<Value = InputEvent> {
        (any::<bool>(), arb_button()).prop_map(|(button_held, last_pressed)| InputEvent {
            button_held,
            last_pressed,
        })
    }

    /// Generate one scripted tick.
    pub fn arb_scripted_tick() -> impl Strategy<Value = ScriptedTick> {
        (arb_input_event(), any::<u16>()).prop_map(|(input, random)| ScriptedTick { input, random })
    }

    /// Generate a script of up to `max_len` ticks.
    pub fn arb_script(max_len: usize) -> impl Strategy<Value = Vec<ScriptedTick>> {
        proptest::collection::vec(arb_scripted_tick(), 0..max_len)
    }

    /// Generate an opponent difficulty, including custom rates.
    pub fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
        prop_oneof![
            Just(Difficulty::Dormant),
            proptest::sample::select(Difficulty::LEVELS.to_vec()),
            (0u16..200).prop_map(Difficulty::Custom),
        ]
    }

    /// Generate a valid stage configuration with the default area gates.
    pub fn arb_stage_config() -> impl Strategy<Value = StageConfig> {
        (8u8..=15, 1u8..=4, 1u8..=31, 1u8..=31, arb_difficulty()).prop_map(
            |(enemies, allies, boss_hit_points, player_hit_points, difficulty)| StageConfig {
                enemies,
                allies,
                boss_hit_points,
                player_hit_points,
                difficulty,
                ..StageConfig::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_core::ai::Difficulty;
    use duel_core::config::StageConfig;
    use duel_core::input::Button;
    use proptest::prelude::*;

    use crate::fixtures::{duel, held, released, roster};

    fn mash_script(len: usize) -> Vec<ScriptedTick> {
        let buttons = [Button::A, Button::B, Button::Down, Button::Up, Button::C];
        (0..len)
            .map(|i| ScriptedTick {
                input: if i % 7 == 6 {
                    released(buttons[i % buttons.len()])
                } else {
                    held(buttons[i % buttons.len()])
                },
                random: (i as u16).wrapping_mul(31),
            })
            .collect()
    }

    fn stage(difficulty: Difficulty) -> impl Fn() -> Simulation {
        move || {
            Simulation::from_stage(&StageConfig {
                allies: 3,
                difficulty,
                ..StageConfig::default()
            })
            .unwrap()
        }
    }

    // =========================================================================
    // Basic determinism tests
    // =========================================================================

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n, _| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_unique_hashes_reports_divergence() {
        let result = DeterminismResult {
            is_deterministic: false,
            hashes: vec![3, 1, 3],
            ticks: 10,
        };
        assert_eq!(result.unique_hashes(), vec![1, 3]);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_deterministic_panics_on_divergence() {
        DeterminismResult {
            is_deterministic: false,
            hashes: vec![1, 2],
            ticks: 1,
        }
        .assert_deterministic();
    }

    #[test]
    fn test_idle_duel_determinism() {
        let script = vec![ScriptedTick::default(); 200];
        assert!(verify_script_determinism(|| duel().0, &script));
    }

    #[test]
    fn test_mashing_stage_determinism() {
        let script = mash_script(600);
        assert!(verify_script_determinism(stage(Difficulty::Perfect), &script));
        assert_eq!(find_first_divergence(stage(Difficulty::Hard), &script), None);
    }

    #[test]
    fn test_roster_rotation_determinism() {
        let script: Vec<_> = (0..300)
            .map(|i| ScriptedTick::input(if i % 20 == 0 { held(Button::C) } else { held(Button::A) }))
            .collect();
        assert!(verify_script_determinism(|| roster(4).0, &script));
    }

    #[test]
    fn test_serialization_preserves_stage() {
        assert!(verify_serialization_determinism(
            stage(Difficulty::Nightmare),
            &mash_script(250)
        ));
    }

    #[test]
    fn test_parallel_stage_simulations() {
        let script = mash_script(400);
        let result = run_parallel_simulations(stage(Difficulty::Normal), &script, 4);
        assert_eq!(result.hashes.len(), 4);
        result.assert_deterministic();
    }

    #[test]
    fn test_different_random_streams_can_diverge() {
        let calm: Vec<_> = (0..200).map(|_| ScriptedTick::default()).collect();
        let wild: Vec<_> = (0..200)
            .map(|i| ScriptedTick {
                random: i,
                ..ScriptedTick::default()
            })
            .collect();

        let mut a = stage(Difficulty::Perfect)();
        let mut b = stage(Difficulty::Perfect)();
        play(&mut a, &calm);
        play(&mut b, &wild);

        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_compute_hash_is_stable() {
        assert_eq!(compute_hash(&(1u8, "duel")), compute_hash(&(1u8, "duel")));
    }

    // =========================================================================
    // Property-based tests using proptest
    // =========================================================================

    proptest! {
        /// Any input script replays to the same final state.
        #[test]
        fn prop_scripts_are_replayable(script in strategies::arb_script(300)) {
            prop_assert!(verify_script_determinism(stage(Difficulty::Hard), &script));
        }

        /// Any valid stage configuration sets up and runs deterministically.
        #[test]
        fn prop_stage_configs_are_deterministic(
            config in strategies::arb_stage_config(),
            script in strategies::arb_script(200),
        ) {
            let setup = move || Simulation::from_stage(&config).unwrap();
            prop_assert_eq!(find_first_divergence(setup, &script), None);
        }

        /// Hit points never exceed the health cap under random play.
        #[test]
        fn prop_health_never_exceeds_maximum(script in strategies::arb_script(400)) {
            let mut sim = stage(Difficulty::Perfect)();
            for tick in &script {
                if sim.advance(tick.input, tick.random).is_err() {
                    break;
                }
                let world = sim.world();
                for slot in world.occupied() {
                    let health = world.health(slot);
                    prop_assert!(health.points <= health.max);
                }
                prop_assert_eq!(world.validate(), Ok(()));
            }
        }
    }
}
