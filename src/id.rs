//! Identifier minting.
//!
//! The handler asks an [`IdSource`] for an integer and encodes it with the
//! [`Codec`](crate::Codec). The source is injected so tests can pin it.
//!
//! Ids are not checked for uniqueness. Two uploads that draw the same number
//! write the same file and the later one wins. With 2^31 possible values
//! that is rare, not impossible.

use std::ops::Range;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The range minted ids are drawn from. Zero is excluded because it encodes
/// to the empty string.
pub const ID_RANGE: Range<u64> = 1..(1 << 31);

/// Yields the integers that become paste identifiers.
pub trait IdSource: Send + Sync + 'static {
    fn next_id(&self) -> u64;
}

/// Uniform draws from [`ID_RANGE`] out of a shared generator.
pub struct RandomIds<R> {
    rng: Mutex<R>,
}

impl<R: Rng + Send + 'static> RandomIds<R> {
    pub fn new(rng: R) -> Self {
        Self { rng: Mutex::new(rng) }
    }
}

impl RandomIds<StdRng> {
    /// Seeds once from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng + Send + 'static> IdSource for RandomIds<R> {
    fn next_id(&self) -> u64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_range(ID_RANGE)
    }
}

/// Always returns the same id. Forces collisions in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedId(pub u64);

impl IdSource for FixedId {
    fn next_id(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_stay_in_range() {
        let ids = RandomIds::new(StdRng::seed_from_u64(7));
        for _ in 0..10_000 {
            let id = ids.next_id();
            assert!(ID_RANGE.contains(&id), "{id}");
        }
    }

    #[test]
    fn seeded_sources_are_deterministic() {
        let a = RandomIds::new(StdRng::seed_from_u64(42));
        let b = RandomIds::new(StdRng::seed_from_u64(42));
        let xs: Vec<u64> = (0..5).map(|_| a.next_id()).collect();
        let ys: Vec<u64> = (0..5).map(|_| b.next_id()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn fixed_source_repeats() {
        let ids = FixedId(99);
        assert_eq!(ids.next_id(), ids.next_id());
    }
}
