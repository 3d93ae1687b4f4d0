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

use crate::error::Error;

const WORD_BITS: u64 = 64;

/// Fixed-length bit vector packed into `u64` words.
///
/// Bits beyond `num_bits` in the last word are always zero, so word-wise comparison
/// and union never observe them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitArray {
    num_bits: u64,
    words: Vec<u64>,
}

impl BitArray {
    /// Creates an all-zero array of `num_bits` bits.
    pub fn new(num_bits: u64) -> Self {
        let num_words = num_bits.div_ceil(WORD_BITS) as usize;
        BitArray {
            num_bits,
            words: vec![0u64; num_words],
        }
    }

    /// Returns the number of addressable bits.
    pub fn len(&self) -> u64 {
        self.num_bits
    }

    /// Returns whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    /// Sets bit `index`.
    ///
    /// `index` must be below [`len()`](Self::len).
    #[inline]
    pub fn set(&mut self, index: u64) {
        debug_assert!(index < self.num_bits, "bit index {index} out of range");
        let (word_index, mask) = locate(index);
        self.words[word_index] |= mask;
    }

    /// Returns whether bit `index` is set.
    ///
    /// `index` must be below [`len()`](Self::len).
    #[inline]
    pub fn get(&self, index: u64) -> bool {
        debug_assert!(index < self.num_bits, "bit index {index} out of range");
        let (word_index, mask) = locate(index);
        (self.words[word_index] & mask) != 0
    }

    /// Resets every bit to zero without reallocating.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Bitwise OR of `other` into `self`.
    ///
    /// # Errors
    ///
    /// Returns an error if the arrays differ in length; `self` is left untouched.
    pub fn union(&mut self, other: &BitArray) -> Result<(), Error> {
        if self.num_bits != other.num_bits {
            return Err(Error::incompatible_filters("bit arrays differ in size")
                .with_context("num_bits", self.num_bits)
                .with_context("other_num_bits", other.num_bits));
        }

        for (word, other_word) in self.words.iter_mut().zip(&other.words) {
            *word |= *other_word;
        }
        Ok(())
    }

    /// Returns the number of bits set to 1.
    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|word| u64::from(word.count_ones())).sum()
    }

    /// Content digest in the style of `java.util.BitSet::hashCode`.
    ///
    /// Depends on bit contents only. Trailing zero words do not contribute. Unlike
    /// `hashCode`, the folded value is not truncated to 32 bits.
    pub fn digest(&self) -> u64 {
        let mut h: u64 = 1234;
        for (i, &word) in self.words.iter().enumerate() {
            h ^= word.wrapping_mul(i as u64 + 1);
        }
        (h >> 32) ^ h
    }
}

#[inline]
fn locate(index: u64) -> (usize, u64) {
    let word_index = (index / WORD_BITS) as usize;
    let mask = 1u64 << (index % WORD_BITS);
    (word_index, mask)
}
