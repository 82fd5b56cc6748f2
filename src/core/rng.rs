//! RNG module - deterministic 7-bag piece generation
//!
//! Every 7 consecutive draws aligned to a refill boundary contain each piece
//! kind exactly once. Determinism comes from an explicit seeded LCG, never
//! from ambient process randomness: two bags built with the same seed and
//! given the same call sequence produce identical draw sequences.

use arrayvec::ArrayVec;

use crate::types::{PieceKind, BAG_SIZE};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// 7-bag piece generator: a FIFO of pending kinds, refilled with a freshly
/// shuffled full set whenever it runs dry.
#[derive(Debug, Clone)]
pub struct RandomBag {
    pending: ArrayVec<PieceKind, BAG_SIZE>,
    cursor: usize,
    rng: SimpleRng,
}

impl RandomBag {
    /// Create a new bag seeded for reproducible sequences
    pub fn new(seed: u32) -> Self {
        Self {
            pending: ArrayVec::new(),
            cursor: 0,
            rng: SimpleRng::new(seed),
        }
    }

    fn refill(&mut self) {
        self.pending.clear();
        self.pending.extend(PieceKind::ALL);
        self.rng.shuffle(&mut self.pending);
        self.cursor = 0;
    }

    /// Draw the next piece, refilling with a full shuffled bag when empty
    pub fn next(&mut self) -> PieceKind {
        if self.cursor >= self.pending.len() {
            self.refill();
        }
        let kind = self.pending[self.cursor];
        self.cursor += 1;
        kind
    }

    /// Discard any partially consumed bag and restart determinism from `seed`
    pub fn reseed(&mut self, seed: u32) {
        self.rng = SimpleRng::new(seed);
        self.pending.clear();
        self.cursor = 0;
    }

    /// Remaining pieces in the current bag (for tests/debugging)
    #[cfg(test)]
    pub fn remaining(&self) -> &[PieceKind] {
        &self.pending[self.cursor..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds_diverge() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);

        assert_ne!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_bag_deterministic_across_instances() {
        let mut bag1 = RandomBag::new(77);
        let mut bag2 = RandomBag::new(77);

        for _ in 0..70 {
            assert_eq!(bag1.next(), bag2.next());
        }
    }

    #[test]
    fn test_bag_chunks_are_permutations() {
        let mut bag = RandomBag::new(1);

        // Every aligned chunk of 7 holds each kind exactly once.
        for _ in 0..20 {
            let mut chunk: Vec<PieceKind> = (0..BAG_SIZE).map(|_| bag.next()).collect();
            chunk.sort_by_key(|kind| PieceKind::ALL.iter().position(|k| k == kind));
            chunk.dedup();
            assert_eq!(chunk.len(), BAG_SIZE);
        }
    }

    #[test]
    fn test_reseed_restarts_sequence() {
        let mut bag = RandomBag::new(42);
        let first: Vec<PieceKind> = (0..10).map(|_| bag.next()).collect();

        // Consume partway into a bag, then reseed: sequence restarts exactly.
        bag.next();
        bag.next();
        bag.reseed(42);
        let second: Vec<PieceKind> = (0..10).map(|_| bag.next()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_remaining_shrinks_per_draw() {
        let mut bag = RandomBag::new(9);
        bag.next();
        assert_eq!(bag.remaining().len(), BAG_SIZE - 1);
    }
}
