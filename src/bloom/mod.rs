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

//! Bloom filter implementation for probabilistic set membership testing.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to test whether
//! an element is a member of a set. False positive matches are possible, but false negatives
//! are not. In other words, a query returns either "possibly in set" or "definitely not in set".
//!
//! # Properties
//!
//! - **No false negatives**: If an item was added, `contains()` returns `true` until `clear()`
//! - **Possible false positives**: `contains()` may return `true` for items never added,
//!   with probability about `e^(-ln(2)^2 * m / n)`
//! - **Fixed size**: the bit array is allocated once and never resized
//! - **No deletion**: this is a standard, not a counting, Bloom filter
//!
//! # Usage
//!
//! ```rust
//! use bloomfilter::bloom::BloomFilter;
//!
//! // 100 expected items in 1000 bits gives k = round(ln(2) * 1000 / 100) = 7
//! let mut filter = BloomFilter::with_num_bits(100, 1000).unwrap();
//! filter.add(&42);
//! assert!(filter.contains(&42));
//!
//! let mut copy = filter.clone();
//! copy.add(&7);
//! assert!(copy.contains(&7));
//! assert!(copy.contains(&42));
//!
//! filter.merge(&copy).unwrap();
//! assert_eq!(filter, copy);
//! ```
//!
//! # Creating Filters
//!
//! - [`BloomFilter::new`]: expected item count, 1 MiB (8,388,608 bits) of storage
//! - [`BloomFilter::with_num_bits`]: expected item count and bit count
//! - [`BloomFilterBuilder`]: adds a target false positive rate and a custom hash seed
//!
//! # Implementation Details
//!
//! - Elements are hashed with a seeded 128-bit MurmurHash3
//! - The `k` bit positions are drawn from the `java.util.Random` linear congruential
//!   generator reseeded with the element hash; see [`IndexGenerator`]
//! - Bits are packed in `u64` words; see [`BitArray`]

mod bit_array;
mod index;
mod sketch;

pub use self::bit_array::BitArray;
pub use self::index::IndexGenerator;
pub use self::sketch::BloomFilter;
pub use self::sketch::BloomFilterBuilder;
pub use self::sketch::DEFAULT_NUM_BITS;
pub use self::sketch::DEFAULT_SEED;
pub use self::sketch::MAX_NUM_BITS;
pub use self::sketch::MIN_NUM_BITS;
