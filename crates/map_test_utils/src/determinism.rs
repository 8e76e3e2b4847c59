//! Determinism harness for the map scheduler.
//!
//! Lockstep peers and replays only agree when every grid operation is a
//! pure function of the grid, its inputs and the seeded random source.
//! Things that break this in practice:
//!
//! - a draw that bypasses [`map_core::random::RandomSource`]
//! - sweeps that do not visit cells in increasing index order
//! - speeds or distances computed in floating point
//!
//! The helpers here run the same setup several times and compare
//! [`MapScenario::state_hash`] values.

use std::sync::Arc;
use std::thread;

use map_core::map::{MapGrid, MapTickEvents};

use crate::fixtures::MapScenario;

/// Final hashes of repeated runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHashes {
    /// One hash per run, in run order.
    pub hashes: Vec<u64>,
    /// Ticks each run advanced.
    pub ticks: u64,
}

impl RunHashes {
    /// Whether every run ended in the same state.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.iter().all(|hash| Some(hash) == self.hashes.first())
    }

    /// Distinct hashes, sorted.
    #[must_use]
    pub fn distinct(&self) -> Vec<u64> {
        let mut distinct = self.hashes.clone();
        distinct.sort_unstable();
        distinct.dedup();
        distinct
    }

    /// # Panics
    ///
    /// Panics listing every hash when the runs disagree.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic(),
            "{} runs of {} ticks ended in {} different states: {:x?}",
            self.hashes.len(),
            self.ticks,
            self.distinct().len(),
            self.hashes
        );
    }
}

/// Build a state with `setup`, advance it `ticks` times with `step`, and
/// hash it; repeated `runs` times.
///
/// ```ignore
/// use map_test_utils::determinism::verify_determinism;
/// use map_test_utils::fixtures::{skirmish_scenario, MapScenario};
///
/// verify_determinism(3, 2000, || skirmish_scenario(42), |s| { s.tick(); }, MapScenario::state_hash)
///     .assert_deterministic();
/// ```
pub fn verify_determinism<S>(
    runs: usize,
    ticks: u64,
    setup: impl Fn() -> S,
    step: impl Fn(&mut S),
    hash: impl Fn(&S) -> u64,
) -> RunHashes {
    let hashes = (0..runs)
        .map(|_| {
            let mut state = setup();
            (0..ticks).for_each(|_| step(&mut state));
            hash(&state)
        })
        .collect();
    RunHashes { hashes, ticks }
}

fn run_scenario(mut scenario: MapScenario, ticks: u64) -> MapScenario {
    for _ in 0..ticks {
        scenario.tick();
    }
    scenario
}

/// Run the scenario on `threads` scoped threads at once.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn hash_scenarios_in_parallel(
    setup: impl Fn() -> MapScenario + Sync,
    threads: usize,
    ticks: u64,
) -> RunHashes {
    let setup = &setup;
    let hashes: Vec<u64> = thread::scope(|scope| {
        let workers: Vec<_> = (0..threads)
            .map(|_| scope.spawn(move || run_scenario(setup(), ticks).state_hash()))
            .collect();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect()
    });
    RunHashes { hashes, ticks }
}

/// First tick at which two runs of the same setup disagree, either in the
/// events the tick reported or in the resulting state. Tick 0 compares the
/// freshly built scenarios.
pub fn first_divergent_tick(setup: impl Fn() -> MapScenario, ticks: u64) -> Option<u64> {
    let mut left = setup();
    let mut right = setup();
    if left.state_hash() != right.state_hash() {
        return Some(0);
    }
    (1..=ticks).find(|_| {
        let (a, b): (MapTickEvents, MapTickEvents) = (left.tick(), right.tick());
        a != b || left.state_hash() != right.state_hash()
    })
}

/// Snapshot the grid after `ticks`, restore it, and check that the restored
/// scenario hashes the same and keeps agreeing for `ticks_after` more ticks.
pub fn snapshot_resumes_identically(
    setup: impl Fn() -> MapScenario,
    ticks: u64,
    ticks_after: u64,
) -> bool {
    let original = run_scenario(setup(), ticks);

    let Ok(bytes) = original.map.serialize() else {
        return false;
    };
    let terrain = Arc::new(original.map.terrain().clone());
    let Ok(map) = MapGrid::deserialize(&bytes, terrain) else {
        return false;
    };
    let restored = MapScenario {
        map,
        ..original.clone()
    };
    if restored.state_hash() != original.state_hash() {
        return false;
    }

    run_scenario(restored, ticks_after).state_hash() == run_scenario(original, ticks_after).state_hash()
}

/// Proptest strategies for terrain layouts.
pub mod strategies {
    use map_core::prelude::*;
    use proptest::prelude::*;

    /// Blank, clear, water or boulder tiles, with blank the most common.
    pub fn arb_terrain_tile() -> impl Strategy<Value = (TemplateId, u8)> {
        prop_oneof![
            3 => Just((TemplateId::NONE, 0)),
            1 => (0u8..16).prop_map(|icon| (TemplateId::CLEAR, icon)),
            1 => Just((TemplateId(1), 0)),
            1 => (0u8..2).prop_map(|icon| (TemplateId(97), icon)),
        ]
    }

    /// `(template, icon)` for every cell of a 16x16 grid.
    pub fn arb_terrain_layout() -> impl Strategy<Value = Vec<(TemplateId, u8)>> {
        proptest::collection::vec(arb_terrain_tile(), 16 * 16)
    }
}
