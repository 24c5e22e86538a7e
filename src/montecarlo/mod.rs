pub mod campaign;
pub mod criteria;
pub mod history;
pub mod mean;
pub mod pass;
pub mod quantile;
pub mod survival;

use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

/// derive an independent rng stream from a campaign seed. hashing the
/// (seed, epoch, trial) coordinates keeps every history reproducible
/// no matter which worker runs it or in what order.
pub(crate) fn stream(seed: u64, epoch: usize, trial: usize) -> u64 {
    let ref mut hasher = DefaultHasher::new();
    seed.hash(hasher);
    epoch.hash(hasher);
    trial.hash(hasher);
    hasher.finish()
}
