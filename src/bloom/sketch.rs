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

use std::hash::Hash;
use std::hash::Hasher;

use super::BitArray;
use super::IndexGenerator;
use crate::error::Error;

/// Bit-array size used when only the expected item count is given: 1 MiB of bits.
pub const DEFAULT_NUM_BITS: u64 = 8 * 1024 * 1024;
/// Seed of the element hasher unless overridden with [`BloomFilterBuilder::seed()`].
pub const DEFAULT_SEED: u32 = 9001;

/// Smallest supported bit-array size.
pub const MIN_NUM_BITS: u64 = 1;
/// Largest supported bit-array size; signed 32-bit draws cannot address positions past it.
pub const MAX_NUM_BITS: u64 = i32::MAX as u64;

/// A standard (non-counting) Bloom filter.
///
/// Every element maps to `k` positions in a bit array of `m` bits. The positions come from
/// an [`IndexGenerator`] seeded with the element's hash, so [`add()`](Self::add) and
/// [`contains()`](Self::contains) always visit the same positions in the same order:
/// - No false negatives: an added element is reported present until [`clear()`](Self::clear)
/// - False positives occur with probability about `e^(-ln(2)^2 * m / n)` once `n` elements
///   have been added
///
/// The filter performs no internal locking. Mutation takes `&mut self`; share a filter
/// across threads behind a `Mutex` or `RwLock`.
///
/// Equality and hashing consider the bit contents and `k` only. Two filters holding the
/// same elements are not equal if built with a different `m` or `k`, and equal bit
/// patterns do not prove the same insertion history.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    /// Seed of the element hasher
    seed: u32,
    /// Number of indices per element (k)
    num_hashes: u32,
    /// Bit storage of `m` bits
    bit_array: BitArray,
}

impl BloomFilter {
    /// Returns a builder for creating a Bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomfilter::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::builder()
    ///     .expected_items(1000)
    ///     .num_bits(10_000)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn builder() -> BloomFilterBuilder {
        BloomFilterBuilder::default()
    }

    /// Creates a filter for `expected_items` elements backed by [`DEFAULT_NUM_BITS`] bits.
    ///
    /// # Errors
    ///
    /// Returns an error if `expected_items` is zero.
    pub fn new(expected_items: u64) -> Result<Self, Error> {
        BloomFilterBuilder::with_capacity(expected_items).build()
    }

    /// Creates a filter for `expected_items` elements backed by `num_bits` bits.
    ///
    /// # Errors
    ///
    /// Returns an error if `expected_items` is zero or `num_bits` is outside
    /// [`MIN_NUM_BITS`]..=[`MAX_NUM_BITS`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilter;
    /// let mut filter = BloomFilter::with_num_bits(100, 1000).unwrap();
    /// filter.add(&42);
    /// assert!(filter.contains(&42));
    /// ```
    pub fn with_num_bits(expected_items: u64, num_bits: u64) -> Result<Self, Error> {
        BloomFilterBuilder::with_capacity(expected_items)
            .num_bits(num_bits)
            .build()
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Item was **possibly** added (or false positive)
    /// - `false`: Item was **definitely not** added
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilter;
    /// let mut filter = BloomFilter::with_num_bits(100, 1000).unwrap();
    /// filter.add("apple");
    ///
    /// assert!(filter.contains("apple"));
    /// ```
    pub fn contains<T: Hash + ?Sized>(&self, item: &T) -> bool {
        self.contains_hash(self.hash_item(item))
    }

    /// Tests membership of an element whose hash the caller computed.
    ///
    /// Pair with [`add_hash()`](Self::add_hash); the element hasher is bypassed.
    pub fn contains_hash(&self, hash: u64) -> bool {
        self.indices(hash).all(|index| self.bit_array.get(index))
    }

    /// Tests and adds an item in a single pass over its indices.
    ///
    /// Returns whether the item was possibly present before this call.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilter;
    /// let mut filter = BloomFilter::with_num_bits(100, 1000).unwrap();
    /// assert!(!filter.contains_and_add("apple"));
    /// assert!(filter.contains_and_add("apple"));
    /// ```
    pub fn contains_and_add<T: Hash + ?Sized>(&mut self, item: &T) -> bool {
        let hash = self.hash_item(item);
        let mut was_present = true;
        for index in self.indices(hash) {
            if !self.bit_array.get(index) {
                was_present = false;
                self.bit_array.set(index);
            }
        }
        was_present
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Adds an item to the filter.
    ///
    /// After this call `contains(item)` returns `true` until the filter is cleared.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(1000).unwrap();
    ///
    /// filter.add("apple");
    /// filter.add(&42_u64);
    /// filter.add(&[1, 2, 3]);
    ///
    /// assert!(filter.contains("apple"));
    /// ```
    pub fn add<T: Hash + ?Sized>(&mut self, item: &T) {
        self.add_hash(self.hash_item(item));
    }

    /// Adds an element whose hash the caller computed.
    ///
    /// Seeding with a sign-extended `i32` (`value as i64 as u64`) reproduces the bit layout
    /// of filters that seed `java.util.Random` with an element's `hashCode()`.
    pub fn add_hash(&mut self, hash: u64) {
        for index in self.indices(hash) {
            self.bit_array.set(index);
        }
    }

    /// Removes every element from the filter; `m` and `k` are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilter;
    /// let mut filter = BloomFilter::with_num_bits(100, 1000).unwrap();
    /// filter.add("apple");
    /// assert!(!filter.is_empty());
    ///
    /// filter.clear();
    /// assert!(filter.is_empty());
    /// assert!(!filter.contains("apple"));
    /// ```
    pub fn clear(&mut self) {
        self.bit_array.clear();
    }

    // ========================================================================
    // Set Operations
    // ========================================================================

    /// Merges another filter into this one via bitwise OR.
    ///
    /// Afterwards this filter reports every element either filter reported before.
    ///
    /// # Errors
    ///
    /// Returns an [`IncompatibleFilters`](crate::error::ErrorKind::IncompatibleFilters)
    /// error if the filters differ in size, hash count, or seed. `self` is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilter;
    /// let mut f1 = BloomFilter::with_num_bits(100, 1000).unwrap();
    /// let mut f2 = BloomFilter::with_num_bits(100, 1000).unwrap();
    ///
    /// f1.add("a");
    /// f2.add("b");
    ///
    /// f1.merge(&f2).unwrap();
    /// assert!(f1.contains("a"));
    /// assert!(f1.contains("b"));
    /// ```
    pub fn merge(&mut self, other: &BloomFilter) -> Result<(), Error> {
        if !self.is_compatible(other) {
            tracing::debug!(
                num_bits = self.capacity(),
                other_num_bits = other.capacity(),
                num_hashes = self.num_hashes,
                other_num_hashes = other.num_hashes,
                seed = self.seed,
                other_seed = other.seed,
                "rejected merge of incompatible bloom filters"
            );
            return Err(Error::incompatible_filters("cannot merge incompatible bloom filters")
                .with_context("num_bits", self.capacity())
                .with_context("other_num_bits", other.capacity())
                .with_context("num_hashes", self.num_hashes)
                .with_context("other_num_hashes", other.num_hashes));
        }

        self.bit_array.union(&other.bit_array)
    }

    /// Checks if two filters are compatible for merging.
    ///
    /// Filters are compatible if they have the same:
    /// - Capacity (number of bits)
    /// - Number of hash functions
    /// - Seed
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.capacity() == other.capacity()
            && self.num_hashes == other.num_hashes
            && self.seed == other.seed
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bit_array.is_empty()
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.bit_array.count_ones()
    }

    /// Returns the total number of bits in the filter (m).
    pub fn capacity(&self) -> u64 {
        self.bit_array.len()
    }

    /// Returns the number of indices per element (k).
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Returns the element hasher seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Returns the fraction of bits set.
    ///
    /// Values near 0.5 indicate the filter is at its designed load.
    pub fn load_factor(&self) -> f64 {
        self.bits_used() as f64 / self.capacity() as f64
    }

    /// Estimates the current false positive probability from the load factor.
    ///
    /// Formula: `load^k`, the chance that `k` uniformly drawn positions are all set.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powf(f64::from(self.num_hashes))
    }

    /// Returns a digest of the bit contents combined with `k`.
    ///
    /// Equal filters have equal digests; the converse does not hold.
    pub fn digest(&self) -> u64 {
        self.bit_array.digest() ^ u64::from(self.num_hashes)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn hash_item<T: Hash + ?Sized>(&self, item: &T) -> u64 {
        let mut hasher = mur3::Hasher128::with_seed(self.seed);
        item.hash(&mut hasher);
        let (h1, _) = hasher.finish128();
        h1
    }

    fn indices(&self, hash: u64) -> IndexGenerator {
        IndexGenerator::new(hash, self.capacity(), self.num_hashes)
    }
}

impl PartialEq for BloomFilter {
    fn eq(&self, other: &Self) -> bool {
        self.num_hashes == other.num_hashes && self.bit_array == other.bit_array
    }
}

impl Eq for BloomFilter {}

impl Hash for BloomFilter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.digest());
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two sizing modes:
/// - [`with_capacity()`](Self::with_capacity): expected item count, with an explicit or
///   default bit count
/// - [`with_accuracy()`](Self::with_accuracy): expected item count and a target false
///   positive rate
///
/// The hash count is always derived as `max(1, round(ln(2) * m / n))`.
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder {
    expected_items: Option<u64>,
    num_bits: u64,
    fpp: Option<f64>,
    seed: u32,
}

impl Default for BloomFilterBuilder {
    fn default() -> Self {
        BloomFilterBuilder {
            expected_items: None,
            num_bits: DEFAULT_NUM_BITS,
            fpp: None,
            seed: DEFAULT_SEED,
        }
    }
}

impl BloomFilterBuilder {
    /// Creates a builder for `expected_items` elements and [`DEFAULT_NUM_BITS`] bits.
    pub fn with_capacity(expected_items: u64) -> Self {
        Self::default().expected_items(expected_items)
    }

    /// Creates a builder sized for `expected_items` elements at false positive rate `fpp`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build().unwrap();
    /// assert_eq!(filter.capacity(), 9586);
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn with_accuracy(expected_items: u64, fpp: f64) -> Self {
        let mut builder = Self::with_capacity(expected_items);
        builder.fpp = Some(fpp);
        builder
    }

    /// Sets the expected number of distinct elements (n).
    pub fn expected_items(mut self, expected_items: u64) -> Self {
        self.expected_items = Some(expected_items);
        self
    }

    /// Sets the bit-array size (m), replacing any accuracy-derived size.
    pub fn num_bits(mut self, num_bits: u64) -> Self {
        self.num_bits = num_bits;
        self.fpp = None;
        self
    }

    /// Sets a custom element hasher seed (default: 9001).
    ///
    /// **Important**: Filters with different seeds cannot be merged.
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the Bloom filter.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument) error if:
    /// - the expected item count is missing or zero
    /// - the target false positive rate is not in (0.0, 1.0)
    /// - the bit count is outside [`MIN_NUM_BITS`]..=[`MAX_NUM_BITS`]
    pub fn build(self) -> Result<BloomFilter, Error> {
        let expected_items = match self.expected_items {
            Some(n) if n > 0 => n,
            n => {
                return Err(Error::invalid_argument("expected_items must be at least 1")
                    .with_context("expected_items", n.unwrap_or_default()));
            }
        };

        let num_bits = match self.fpp {
            Some(fpp) => {
                if !(fpp > 0.0 && fpp < 1.0) {
                    return Err(Error::invalid_argument(
                        "fpp must be between 0.0 and 1.0 (exclusive)",
                    )
                    .with_context("fpp", fpp));
                }
                let bits = raw_num_bits(expected_items, fpp);
                if bits > MAX_NUM_BITS as f64 {
                    return Err(Error::invalid_argument(format!(
                        "accuracy target needs more than {MAX_NUM_BITS} bits"
                    ))
                    .with_context("expected_items", expected_items)
                    .with_context("fpp", fpp)
                    .with_context("num_bits", bits));
                }
                Self::suggest_num_bits(expected_items, fpp)
            }
            None => self.num_bits,
        };

        if !(MIN_NUM_BITS..=MAX_NUM_BITS).contains(&num_bits) {
            return Err(Error::invalid_argument(format!(
                "num_bits must be between {MIN_NUM_BITS} and {MAX_NUM_BITS}"
            ))
            .with_context("num_bits", num_bits));
        }

        let num_hashes = Self::suggest_num_hashes(expected_items, num_bits);
        tracing::debug!(
            expected_items,
            num_bits,
            num_hashes,
            seed = self.seed,
            "built bloom filter"
        );

        Ok(BloomFilter {
            seed: self.seed,
            num_hashes,
            bit_array: BitArray::new(num_bits),
        })
    }

    // ========================================================================
    // Static Suggestion Methods
    // ========================================================================

    /// Suggests the number of bits for `expected_items` elements at rate `fpp`.
    ///
    /// Formula: `m = ceil(-n * ln(p) / ln(2)^2)`, clamped to the supported range.
    /// [`build()`](Self::build) rejects accuracy targets that would need clamping.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilterBuilder;
    /// let bits = BloomFilterBuilder::suggest_num_bits(1000, 0.01);
    /// assert_eq!(bits, 9586);
    /// ```
    pub fn suggest_num_bits(expected_items: u64, fpp: f64) -> u64 {
        (raw_num_bits(expected_items, fpp) as u64).clamp(MIN_NUM_BITS, MAX_NUM_BITS)
    }

    /// Number of hash rounds for `expected_items` elements in `num_bits` bits.
    ///
    /// Formula: `k = max(1, round(ln(2) * m / n))`
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomfilter::bloom::BloomFilterBuilder;
    /// assert_eq!(BloomFilterBuilder::suggest_num_hashes(100, 1000), 7);
    /// assert_eq!(BloomFilterBuilder::suggest_num_hashes(1000, 100), 1);
    /// ```
    pub fn suggest_num_hashes(expected_items: u64, num_bits: u64) -> u32 {
        let m = num_bits as f64;
        let n = expected_items as f64;

        let k = (std::f64::consts::LN_2 * m / n).round() as u32;
        k.max(1)
    }

    /// Theoretical false positive rate once `expected_items` elements are added to a
    /// filter of `num_bits` bits sized by [`suggest_num_hashes()`](Self::suggest_num_hashes).
    ///
    /// Formula: `e^(-ln(2)^2 * m / n)`
    pub fn expected_fpp(expected_items: u64, num_bits: u64) -> f64 {
        let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;
        (-ln2_squared * num_bits as f64 / expected_items as f64).exp()
    }
}

/// Unclamped `ceil(-n * ln(p) / ln(2)^2)`.
fn raw_num_bits(expected_items: u64, fpp: f64) -> f64 {
    let n = expected_items as f64;
    let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;
    (-n * fpp.ln() / ln2_squared).ceil()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_size() {
        let filter = BloomFilter::new(1_000_000).unwrap();
        assert_eq!(filter.capacity(), 8_388_608);
        assert_eq!(filter.num_hashes(), 6);
        assert_eq!(filter.seed(), DEFAULT_SEED);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_num_hashes_derivation() {
        assert_eq!(BloomFilterBuilder::suggest_num_hashes(100, 1000), 7);
        assert_eq!(BloomFilterBuilder::suggest_num_hashes(1_000_000, 10_000_000), 7);
        assert_eq!(BloomFilterBuilder::suggest_num_hashes(1, 1), 1);
        assert_eq!(BloomFilterBuilder::suggest_num_hashes(10, 1), 1);
        assert_eq!(BloomFilterBuilder::suggest_num_hashes(10, 50), 3);
    }

    #[test]
    fn test_with_accuracy() {
        let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build().unwrap();
        assert_eq!(filter.capacity(), 9586);
        assert_eq!(filter.num_hashes(), 7);
    }

    #[test]
    fn test_num_bits_overrides_accuracy() {
        let filter = BloomFilterBuilder::with_accuracy(100, 0.01)
            .num_bits(2048)
            .build()
            .unwrap();
        assert_eq!(filter.capacity(), 2048);
    }

    #[test]
    fn test_invalid_expected_items() {
        let err = BloomFilter::new(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = BloomFilter::builder().num_bits(64).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_invalid_num_bits() {
        let err = BloomFilter::with_num_bits(10, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = BloomFilter::with_num_bits(10, MAX_NUM_BITS + 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_invalid_fpp() {
        for fpp in [0.0, 1.0, 1.5, -0.1, f64::NAN] {
            let err = BloomFilterBuilder::with_accuracy(100, fpp).build().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_unreachable_accuracy_is_rejected() {
        let err = BloomFilterBuilder::with_accuracy(2_000_000_000, 1e-9)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let keys: Vec<&str> = err.context().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["expected_items", "fpp", "num_bits"]);

        assert_eq!(
            BloomFilterBuilder::suggest_num_bits(2_000_000_000, 1e-9),
            MAX_NUM_BITS
        );
    }

    #[test]
    fn test_add_hash_sets_generated_indices() {
        let mut filter = BloomFilter::with_num_bits(100, 1000).unwrap();
        filter.add_hash(42);

        assert_eq!(filter.bits_used(), 7);
        for index in [35, 527, 799, 768, 940, 245, 11] {
            assert!(filter.bit_array.get(index));
        }
        assert!(filter.contains_hash(42));
    }

    #[test]
    fn test_single_bit_filter() {
        let mut filter = BloomFilter::with_num_bits(1, 1).unwrap();
        assert!(!filter.contains(&"x"));
        filter.add(&"x");
        assert!(filter.contains(&"x"));
        assert!(filter.contains(&"anything"));
    }

    #[test]
    fn test_contains_and_add() {
        let mut filter = BloomFilter::with_num_bits(100, 1000).unwrap();

        assert!(!filter.contains_and_add(&42_u64));
        assert!(filter.contains_and_add(&42_u64));
        assert!(filter.contains(&42_u64));
    }

    #[test]
    fn test_seed_changes_layout() {
        let mut a = BloomFilter::builder()
            .expected_items(100)
            .num_bits(1000)
            .build()
            .unwrap();
        let mut b = BloomFilter::builder()
            .expected_items(100)
            .num_bits(1000)
            .seed(1)
            .build()
            .unwrap();
        a.add("apple");
        b.add("apple");

        assert!(b.contains("apple"));
        assert!(!a.is_compatible(&b));
        assert_ne!(a, b);
        assert_eq!(b.merge(&a).unwrap_err().kind(), ErrorKind::IncompatibleFilters);
    }

    #[test]
    fn test_statistics() {
        let mut filter = BloomFilter::with_num_bits(100, 1000).unwrap();
        assert_eq!(filter.bits_used(), 0);
        assert_eq!(filter.load_factor(), 0.0);
        assert_eq!(filter.estimated_fpp(), 0.0);

        filter.add("test");
        assert!(filter.bits_used() > 0);
        assert!(filter.bits_used() <= 7);
        assert!(filter.load_factor() > 0.0);
        assert!(filter.estimated_fpp() > 0.0);
    }

    #[test]
    fn test_expected_fpp() {
        let p = BloomFilterBuilder::expected_fpp(1_000_000, 10_000_000);
        assert!((p - 0.008_19).abs() < 1e-4);
    }

    #[test]
    fn test_digest_includes_num_hashes() {
        let a = BloomFilter::with_num_bits(100, 1000).unwrap();
        let b = BloomFilter::with_num_bits(200, 1000).unwrap();
        assert_ne!(a.num_hashes(), b.num_hashes());
        assert_ne!(a.digest(), b.digest());
        assert_ne!(a, b);
    }
}
