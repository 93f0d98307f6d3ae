//! Record synthesizers.
//!
//! Every synthesizer takes its random source as a parameter. The analytics
//! phase passes the thread RNG; tests and per-team fixtures pass a seeded
//! [`StdRng`] so the output is reproducible.

pub mod incidents;
pub mod logs;
pub mod spans;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

pub use incidents::synthesize_incident;
pub use logs::synthesize_log;
pub use spans::synthesize_trace;

/// Deterministic random source for one team. Two generators for the same team
/// produce the same sequence; other teams are unaffected.
#[must_use]
pub fn team_rng(team_id: i64) -> StdRng {
    StdRng::seed_from_u64(team_id as u64)
}

/// Uniform pick from a non-empty static table.
pub(crate) fn pick<'a, T, R>(items: &'a [T], rng: &mut R) -> &'a T
where
    R: Rng + ?Sized,
{
    items.choose(rng).unwrap_or(&items[0])
}

/// Weighted pick from a non-empty `(value, weight)` table.
pub(crate) fn pick_weighted<'a, T, R>(table: &'a [(T, u32)], rng: &mut R) -> &'a T
where
    R: Rng + ?Sized,
{
    table
        .choose_weighted(rng, |(_, weight)| *weight)
        .map_or(&table[0].0, |(value, _)| value)
}

/// 32 lowercase hex digits.
pub(crate) fn trace_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:032x}", rng.random::<u128>())
}

/// 16 lowercase hex digits.
pub(crate) fn span_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{:016x}", rng.random::<u64>())
}

/// Version 4 UUID drawn from `rng`.
pub(crate) fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.random()).into_uuid()
}

pub(crate) fn host<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("host-{}", rng.random_range(1..=5))
}

pub(crate) fn pod<R: Rng + ?Sized>(service: &str, rng: &mut R) -> String {
    format!("pod-{service}-{}", rng.random_range(1..=3))
}
