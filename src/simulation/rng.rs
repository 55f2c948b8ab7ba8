//! Seedable random source shared by placement, movement and breeding.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// Random source threaded through placement, movement and breeding.
pub type SimRng = ChaCha12Rng;

/// Create a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}

/// Returns `seed`, or a fresh one drawn from entropy when absent, so every
/// run can be replayed.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::thread_rng().r#gen())
}
