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

//! Seeded random sources.

const MULTIPLIER: u64 = 0x5DEECE66D;
const ADDEND: u64 = 0xB;
const MASK: u64 = (1 << 48) - 1;

/// Reproducible random number source.
///
/// Implementations must yield the same sequence after being reseeded with the same value.
pub trait RandomSource {
    /// Resets the generator state from `seed`.
    fn reseed(&mut self, seed: u64);

    /// Returns the next uniformly distributed signed 32-bit value.
    fn next_i32(&mut self) -> i32;
}

/// The 48-bit linear congruential generator specified by `java.util.Random`.
///
/// The seed is scrambled with the multiplier and truncated to 48 bits, each step computes
/// `state = (state * 0x5DEECE66D + 0xB) mod 2^48`, and a 32-bit draw is taken from bits
/// 47..16 of the new state. Only the low 48 bits of a seed influence the sequence.
///
/// # Examples
///
/// ```
/// # use bloomfilter::common::JavaRandom;
/// # use bloomfilter::common::RandomSource;
/// let mut rng = JavaRandom::seeded(42);
/// assert_eq!(rng.next_i32(), -1170105035);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JavaRandom {
    state: u64,
}

impl JavaRandom {
    /// Creates a new generator using the provided seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            state: scramble(seed),
        }
    }

    /// Advances the state and returns its top `bits` bits.
    fn next_bits(&mut self, bits: u32) -> u32 {
        debug_assert!(bits <= 32);
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(ADDEND)
            & MASK;
        (self.state >> (48 - bits)) as u32
    }
}

impl Default for JavaRandom {
    fn default() -> Self {
        Self::seeded(0)
    }
}

impl RandomSource for JavaRandom {
    fn reseed(&mut self, seed: u64) {
        self.state = scramble(seed);
    }

    fn next_i32(&mut self) -> i32 {
        self.next_bits(32) as i32
    }
}

#[inline]
fn scramble(seed: u64) -> u64 {
    (seed ^ MULTIPLIER) & MASK
}
