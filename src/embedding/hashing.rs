//! Deterministic offline encoder
//!
//! Each word maps to a fixed pseudo-random direction (ChaCha seeded from a
//! fixed-key hash of the word); a text embeds as the normalized sum of its
//! word directions. Texts sharing words score high, disjoint texts score
//! near zero. There is no notion of synonymy, so this stands in for a real
//! model only in demos, tests and benchmarks.

use crate::core::error::Result;
use crate::embedding::{l2_normalize, Embedding, TextEncoder};
use crate::language::phrase::words;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hash::BuildHasher;

/// Fixed hasher keys; changing them changes every embedding
const HASH_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Words carrying no object identity
const STOP_WORDS: &[&str] = &["a", "an", "the", "it", "of", "and", "then", "please", "up"];

pub struct HashingEncoder {
    dim: usize,
    hasher: ahash::RandomState,
}

impl HashingEncoder {
    pub fn new(dim: usize) -> Self {
        let [k0, k1, k2, k3] = HASH_SEEDS;
        Self {
            dim: dim.max(1),
            hasher: ahash::RandomState::with_seeds(k0, k1, k2, k3),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn word_direction(&self, word: &str) -> Vec<f32> {
        let seed = self.hasher.hash_one(word);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..self.dim).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
    }

    fn embed(&self, text: &str) -> Embedding {
        let lowered = text.to_lowercase();
        let mut acc = vec![0.0f32; self.dim];
        for word in words(&lowered).filter(|w| !STOP_WORDS.contains(w)) {
            for (a, d) in acc.iter_mut().zip(self.word_direction(word)) {
                *a += d;
            }
        }
        l2_normalize(&mut acc);
        acc
    }
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl TextEncoder for HashingEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn model_name(&self) -> &str {
        "hashing-bow"
    }
}
