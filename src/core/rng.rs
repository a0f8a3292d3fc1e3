//! Deterministic random number generation for battles.
//!
//! Every random choice a battle makes (which deck card is drawn, whether a
//! rodent digs back, which hound answers a summon) goes through one
//! [`GameRng`] seeded from the battle log header. Replaying the same log
//! against the same seed therefore reproduces the same choices.
//!
//! ## Context streams
//!
//! The action generator must not perturb the battle sequence, so it draws
//! from its own stream derived with [`GameRng::for_context`]:
//!
//! ```
//! use battle_engine::core::GameRng;
//!
//! let battle = GameRng::new(42);
//! let mut ai = battle.for_context("ai");
//! let mut ai_again = GameRng::new(42).for_context("ai");
//!
//! let picks = [1, 2, 3, 4, 5, 6, 7, 8];
//! assert_eq!(ai.choose(&picks), ai_again.choose(&picks));
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Multiplier of the 64-bit Fx hash.
const FX_SEED_64: u64 = 0x51_7c_c1_b7_27_22_0a_95;

/// Fx hash over `parts`, always 64 bits wide.
///
/// `rustc_hash::FxHasher` works in `usize` words, so its output differs
/// between 32 and 64 bit targets. Battle logs store digests and seeds
/// derived from this, so the width is fixed here and input is read as
/// little-endian words.
///
/// ```
/// use battle_engine::core::stable_hash64;
///
/// assert_eq!(stable_hash64(&[b"ai".as_slice()]), stable_hash64(&[b"ai".as_slice()]));
/// assert_ne!(stable_hash64(&[b"ai".as_slice()]), stable_hash64(&[b"seeds".as_slice()]));
/// ```
#[must_use]
pub fn stable_hash64(parts: &[&[u8]]) -> u64 {
    let mut hash = 0u64;
    let mut add = |word: u64| hash = (hash.rotate_left(5) ^ word).wrapping_mul(FX_SEED_64);
    for part in parts {
        let mut chunks = part.chunks_exact(8);
        for chunk in &mut chunks {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            add(u64::from_le_bytes(word));
        }
        let mut tail = [0u8; 8];
        let rest = chunks.remainder();
        tail[..rest.len()].copy_from_slice(rest);
        add(u64::from_le_bytes(tail));
        add(part.len() as u64);
    }
    hash
}

/// Deterministic battle RNG.
///
/// ChaCha8 keeps the stream identical on every platform.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this stream was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Independent stream for `context`.
    ///
    /// Depends only on the seed and the context name, never on how far this
    /// stream has advanced.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        Self::new(stable_hash64(&[self.seed.to_le_bytes().as_slice(), context.as_bytes()]))
    }

    /// `true` with the given probability, clamped to `[0, 1]`.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Uniform pick from a slice; `None` if it is empty.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(&mut self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picks(rng: &mut GameRng) -> Vec<u32> {
        let values: Vec<u32> = (0..1000).collect();
        (0..20).filter_map(|_| rng.choose(&values).copied()).collect()
    }

    #[test]
    fn test_same_seed_same_stream() {
        assert_eq!(picks(&mut GameRng::new(42)), picks(&mut GameRng::new(42)));
    }

    #[test]
    fn test_different_seeds() {
        assert_ne!(picks(&mut GameRng::new(1)), picks(&mut GameRng::new(2)));
    }

    #[test]
    fn test_context_independent_of_position() {
        let mut advanced = GameRng::new(42);
        picks(&mut advanced);

        let mut ctx1 = advanced.for_context("ai");
        let mut ctx2 = GameRng::new(42).for_context("ai");

        assert_eq!(picks(&mut ctx1), picks(&mut ctx2));
        assert_eq!(ctx1.seed(), ctx2.seed());
    }

    #[test]
    fn test_contexts_differ() {
        let rng = GameRng::new(42);
        assert_ne!(picks(&mut rng.for_context("ai")), picks(&mut rng.for_context("seeds")));
    }

    #[test]
    fn test_context_seed_is_fixed_width() {
        // Pinned: logs written on any target must derive the same stream.
        assert_eq!(GameRng::new(42).for_context("ai").seed(), 0xf6d8_fa2b_c318_38d8);
        assert_eq!(stable_hash64(&[]), 0);
    }

    #[test]
    fn test_stable_hash_separates_parts() {
        assert_ne!(
            stable_hash64(&[b"ab".as_slice(), b"c".as_slice()]),
            stable_hash64(&[b"a".as_slice(), b"bc".as_slice()])
        );
        assert_ne!(stable_hash64(&[b"a".as_slice()]), stable_hash64(&[b"a\0".as_slice()]));
    }

    #[test]
    fn test_choose_empty() {
        let empty: [u8; 0] = [];
        assert_eq!(GameRng::new(7).choose(&empty), None);
    }

    #[test]
    fn test_gen_bool_extremes() {
        let mut rng = GameRng::new(7);
        assert!(rng.gen_bool(1.0));
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(3.0));
        assert!(!rng.gen_bool(-1.0));
    }
}
