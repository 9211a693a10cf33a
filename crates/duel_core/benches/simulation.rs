//! Simulation benchmarks for duel_core.
//!
//! Run with: `cargo bench -p duel_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use duel_core::ai::Difficulty;
use duel_core::config::StageConfig;
use duel_core::input::{Button, InputEvent};
use duel_core::simulation::Simulation;

fn stage(difficulty: Difficulty) -> Simulation {
    Simulation::from_stage(&StageConfig {
        allies: 4,
        difficulty,
        ..StageConfig::default()
    })
    .unwrap()
}

/// Runs tick throughput benchmarks for the duel_core crate.
pub fn simulation_benchmark(c: &mut Criterion) {
    let buttons = [Button::A, Button::B, Button::C, Button::Up, Button::Down];

    c.bench_function("advance_idle_stage", |b| {
        let mut sim = stage(Difficulty::Dormant);
        b.iter(|| black_box(sim.advance(InputEvent::default(), 0)));
    });

    c.bench_function("advance_mashing_stage_1000_ticks", |b| {
        b.iter_batched(
            || stage(Difficulty::Perfect),
            |mut sim| {
                for tick in 0..1000u16 {
                    let button = buttons[usize::from(tick) % buttons.len()];
                    let _ = black_box(sim.advance(InputEvent::held(button), tick.wrapping_mul(7)));
                }
                sim.state_hash()
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("state_hash", |b| {
        let sim = stage(Difficulty::Normal);
        b.iter(|| black_box(sim.state_hash()));
    });
}

criterion_group!(benches, simulation_benchmark);
criterion_main!(benches);
