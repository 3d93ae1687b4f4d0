// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::iter::FusedIterator;

use crate::common::JavaRandom;
use crate::common::RandomSource;

/// Produces the `k` bit positions an element maps to.
///
/// The random source is reseeded from the element's hash, then `k` signed 32-bit draws are
/// reduced into `[0, num_bits)` by remainder, negating negative remainders. The negation
/// folds `-r` onto `r`, which biases the distribution slightly; filters built by other
/// implementations of this scheme depend on that exact mapping.
///
/// # Examples
///
/// ```
/// # use bloomfilter::bloom::IndexGenerator;
/// let indices: Vec<u64> = IndexGenerator::new(42, 1000, 7).collect();
/// assert_eq!(indices, vec![35, 527, 799, 768, 940, 245, 11]);
/// ```
#[derive(Debug, Clone)]
pub struct IndexGenerator<R = JavaRandom> {
    rng: R,
    num_bits: u64,
    remaining: u32,
}

impl IndexGenerator<JavaRandom> {
    /// Creates a generator of `num_hashes` indices below `num_bits` for `hash_seed`.
    pub fn new(hash_seed: u64, num_bits: u64, num_hashes: u32) -> Self {
        Self::with_source(JavaRandom::default(), hash_seed, num_bits, num_hashes)
    }
}

impl<R: RandomSource> IndexGenerator<R> {
    /// Creates a generator drawing from `rng` after reseeding it with `hash_seed`.
    pub fn with_source(mut rng: R, hash_seed: u64, num_bits: u64, num_hashes: u32) -> Self {
        debug_assert!(num_bits > 0, "num_bits must be positive");
        rng.reseed(hash_seed);
        IndexGenerator {
            rng,
            num_bits,
            remaining: num_hashes,
        }
    }
}

impl<R: RandomSource> Iterator for IndexGenerator<R> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(reduce(self.rng.next_i32(), self.num_bits))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl<R: RandomSource> ExactSizeIterator for IndexGenerator<R> {}

impl<R: RandomSource> FusedIterator for IndexGenerator<R> {}

/// Maps a signed draw into `[0, num_bits)`: `draw % num_bits`, negated when negative.
#[inline]
fn reduce(draw: i32, num_bits: u64) -> u64 {
    // i64 keeps both the remainder and its negation exact for any positive num_bits.
    let modulus = num_bits.min(i64::MAX as u64) as i64;
    let mut value = i64::from(draw) % modulus;
    if value < 0 {
        value = -value;
    }
    value as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_policy() {
        assert_eq!(reduce(1005, 1000), 5);
        assert_eq!(reduce(-1005, 1000), 5);
        assert_eq!(reduce(-1, 1000), 1);
        assert_eq!(reduce(0, 1000), 0);
        assert_eq!(reduce(i32::MIN, 1000), 648);
        assert_eq!(reduce(i32::MAX, 1), 0);
        assert_eq!(reduce(i32::MIN, i32::MAX as u64), 1);
    }

    #[test]
    fn test_exactly_k_indices_in_range() {
        let indices: Vec<u64> = IndexGenerator::new(0xdead_beef, 97, 13).collect();
        assert_eq!(indices.len(), 13);
        assert!(indices.iter().all(|&index| index < 97));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a: Vec<u64> = IndexGenerator::new(123_456, 8_388_608, 10).collect();
        let b: Vec<u64> = IndexGenerator::new(123_456, 8_388_608, 10).collect();
        assert_eq!(a, b);

        let c: Vec<u64> = IndexGenerator::new(123_457, 8_388_608, 10).collect();
        assert_ne!(a, c);
    }

    #[test]
    fn test_reference_sequence() {
        let indices: Vec<u64> = IndexGenerator::new(42, 1000, 7).collect();
        assert_eq!(indices, vec![35, 527, 799, 768, 940, 245, 11]);
    }

    #[test]
    fn test_with_source_reseeds() {
        let mut rng = JavaRandom::seeded(999);
        rng.next_i32();
        let reused: Vec<u64> = IndexGenerator::with_source(rng, 42, 1000, 7).collect();
        let fresh: Vec<u64> = IndexGenerator::new(42, 1000, 7).collect();
        assert_eq!(reused, fresh);
    }

    #[test]
    fn test_size_hint() {
        let mut generator = IndexGenerator::new(1, 64, 3);
        assert_eq!(generator.len(), 3);
        generator.next();
        assert_eq!(generator.len(), 2);
        generator.by_ref().for_each(drop);
        assert_eq!(generator.next(), None);
    }
}
