//! Synced random number generation.
//!
//! Every peer in a session seeds the same [`SyncedRng`] and consumes it in the
//! same order during resolution, so random outcomes stay identical everywhere.

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// - **Deterministic**: same seed, same sequence
/// - **Small state**: only 64 bits, cheap to snapshot for rollback
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncedRng {
    state: u64,
}

impl SyncedRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.step();
        rng.state = rng.state.wrapping_add(seed);
        rng.step();
        rng
    }

    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
    }

    /// Next raw 32-bit value.
    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.step();
        let xorshifted = (((old >> 18) ^ old) >> 27) as u32;
        let rot = (old >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Uniform value in `0..bound`. Returns 0 when `bound` is 0.
    pub fn synced_rand_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        // Rejection sampling removes modulo bias.
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let value = self.next_u32();
            if value >= threshold {
                return value % bound;
            }
        }
    }

    /// Uniform value in `[0.0, 1.0)`.
    pub fn synced_rand_float(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Current internal state, for digests and rollback snapshots.
    pub fn state(&self) -> u64 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_produces_same_sequence() {
        let mut a = SyncedRng::new(42);
        let mut b = SyncedRng::new(42);
        for _ in 0..32 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SyncedRng::new(1);
        let mut b = SyncedRng::new(2);
        let a_values: Vec<u32> = (0..8).map(|_| a.next_u32()).collect();
        let b_values: Vec<u32> = (0..8).map(|_| b.next_u32()).collect();
        assert_ne!(a_values, b_values);
    }

    #[test]
    fn rand_below_stays_in_range() {
        let mut rng = SyncedRng::new(7);
        for _ in 0..256 {
            assert!(rng.synced_rand_below(3) < 3);
        }
        assert_eq!(rng.synced_rand_below(0), 0);
        assert_eq!(rng.synced_rand_below(1), 0);
    }

    #[test]
    fn rand_float_is_unit_interval() {
        let mut rng = SyncedRng::new(99);
        for _ in 0..256 {
            let value = rng.synced_rand_float();
            assert!((0.0..1.0).contains(&value));
        }
    }
}
