//! Seeded deterministic random source
//!
//! A Mulberry32 generator: 32 bits of state, wraparound arithmetic, and a fixed
//! shift/multiply mix. Output is bit-for-bit identical to other Mulberry32
//! implementations for the same 32-bit seed.

use rand::{Error, RngCore, SeedableRng};

/// Constant mixing the step index into the base seed
pub const STEP_SEED_MULTIPLIER: u64 = 7919;

const GOLDEN_GAMMA: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Mulberry32 pseudo-random generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Create a generator from a 32-bit seed
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Create the generator used for one batch
    ///
    /// The seed is `seed + step_index * 7919` reduced modulo 2^32, so every
    /// `(seed, step_index)` pair maps to exactly one sequence.
    pub fn for_step(seed: i64, step_index: u64) -> Self {
        let mixed = (seed as u64).wrapping_add(step_index.wrapping_mul(STEP_SEED_MULTIPLIER));
        Self::new(mixed as u32)
    }

    /// Next value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// `base + next_f64() * range`
    pub fn next_in(&mut self, base: f64, range: f64) -> f64 {
        base + self.next_f64() * range
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.next_u32());
        let high = u64::from(self.next_u32());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mulberry32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }

    // Truncate instead of the default PCG expansion so integer seeds keep
    // their Mulberry32 meaning.
    fn seed_from_u64(state: u64) -> Self {
        Self::new(state as u32)
    }
}
