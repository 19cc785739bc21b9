//! Selection strategies (spec.md §4.4 step 4) — data, not subclasses: a
//! tag plus parameters. Adding a strategy is adding a case.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::registry::{ActiveMutation, PointId};

/// How the next run's selection seed is derived from the session seed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// `sessionSeed + run`.
    #[default]
    PerRun,
    /// `hash(discoveredPoints) + run`.
    PerChange,
}

/// Selection strategy for the next untested mutation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Uniform pick from the untested set, seeded.
    PureRandom,
    /// Weight each mutation by `1 / max(touchCount, 1)`, sample
    /// proportionally, seeded.
    MostLikelyRandom,
    /// Deterministic argmin over `(touchCount, pointId, variantIndex)`.
    #[default]
    MostLikelyStable,
}

/// Derive the PRNG seed for `run` per the configured [`SeedPolicy`].
pub fn derive_seed(
    policy: SeedPolicy,
    session_seed: i64,
    run: u32,
    discovered_point_ids_sorted: &[&PointId],
) -> u64 {
    match policy {
        SeedPolicy::PerRun => session_seed.wrapping_add(run as i64) as u64,
        SeedPolicy::PerChange => {
            let mut buf = String::new();
            for id in discovered_point_ids_sorted {
                buf.push_str(id);
                buf.push('\0');
            }
            let hash = xxhash_rust::xxh3::xxh3_64(buf.as_bytes());
            hash.wrapping_add(run as u64)
        }
    }
}

/// Pick the next mutation to run from the untested set, per `strategy`.
/// `untested` must be non-empty; callers surface exhaustion before
/// calling this.
pub fn select(
    strategy: SelectionStrategy,
    seed: u64,
    untested: &[ActiveMutation],
    touch_counts: &HashMap<PointId, u32>,
) -> ActiveMutation {
    debug_assert!(!untested.is_empty());
    match strategy {
        SelectionStrategy::PureRandom => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let idx = rng.random_range(0..untested.len());
            untested[idx].clone()
        }
        SelectionStrategy::MostLikelyRandom => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            weighted_pick(&mut rng, untested, touch_counts)
        }
        SelectionStrategy::MostLikelyStable => most_likely_stable(untested, touch_counts),
    }
}

fn weight_of(point_id: &PointId, touch_counts: &HashMap<PointId, u32>) -> f64 {
    let touch = touch_counts.get(point_id).copied().unwrap_or(0).max(1);
    1.0 / touch as f64
}

fn weighted_pick(
    rng: &mut ChaCha8Rng,
    untested: &[ActiveMutation],
    touch_counts: &HashMap<PointId, u32>,
) -> ActiveMutation {
    let weights: Vec<f64> = untested
        .iter()
        .map(|m| weight_of(&m.point_id, touch_counts))
        .collect();
    let total: f64 = weights.iter().sum();
    let mut target = rng.random::<f64>() * total;
    for (mutation, weight) in untested.iter().zip(weights.iter()) {
        if target < *weight {
            return mutation.clone();
        }
        target -= weight;
    }
    untested.last().expect("untested is non-empty").clone()
}

fn most_likely_stable(
    untested: &[ActiveMutation],
    touch_counts: &HashMap<PointId, u32>,
) -> ActiveMutation {
    untested
        .iter()
        .min_by_key(|m| {
            let touch = touch_counts.get(&m.point_id).copied().unwrap_or(0);
            (touch, m.point_id.clone(), m.variant_index)
        })
        .cloned()
        .expect("untested is non-empty")
}
