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

use bloomfilter::bloom::BloomFilter;
use bloomfilter::common::JavaRandom;
use bloomfilter::common::RandomSource;
use bloomfilter::error::ErrorKind;
use googletest::assert_that;
use googletest::prelude::contains_substring;

#[test]
fn test_merge_keeps_elements_of_both() {
    let mut rng = JavaRandom::seeded(0);
    let mut a = BloomFilter::with_num_bits(1_000, 10_000).unwrap();
    let mut b = a.clone();

    for _ in 0..1_000 {
        let x = rng.next_i32();
        let y = rng.next_i32();
        a.add(&x);
        b.add(&y);

        let mut merged = a.clone();
        merged.merge(&b).unwrap();
        assert!(merged.contains(&x) && merged.contains(&y));
    }
}

#[test]
fn test_merge_preserves_prior_positives() {
    let mut a = BloomFilter::with_num_bits(500, 5_000).unwrap();
    let mut b = BloomFilter::with_num_bits(500, 5_000).unwrap();
    for i in 0..500_u32 {
        a.add(&i);
        b.add(&(i + 10_000));
    }

    let mut merged = a.clone();
    merged.merge(&b).unwrap();
    for probe in 0..20_000_u32 {
        if a.contains(&probe) || b.contains(&probe) {
            assert!(merged.contains(&probe), "merge lost {probe}");
        }
    }
    assert!(merged.bits_used() >= a.bits_used().max(b.bits_used()));
}

#[test]
fn test_merge_is_commutative() {
    let mut rng = JavaRandom::seeded(1);
    let mut a = BloomFilter::new(1_000).unwrap();
    let mut b = BloomFilter::new(1_000).unwrap();
    for _ in 0..1_000 {
        a.add(&rng.next_i32());
        b.add(&rng.next_i32());
    }

    let mut ab = a.clone();
    ab.merge(&b).unwrap();
    let mut ba = b.clone();
    ba.merge(&a).unwrap();

    assert_eq!(ab, ba);
    assert_eq!(ab.digest(), ba.digest());
}

#[test]
fn test_merge_with_self_is_identity() {
    let mut a = BloomFilter::with_num_bits(100, 1_000).unwrap();
    a.add("x");
    let before = a.clone();

    a.merge(&before).unwrap();
    assert_eq!(a, before);
}

#[test]
fn test_merge_rejects_different_num_bits() {
    let mut a = BloomFilter::with_num_bits(100, 1024).unwrap();
    let mut b = BloomFilter::with_num_bits(100, 2048).unwrap();
    a.add("a");
    b.add("b");
    let before = a.clone();

    let err = a.merge(&b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleFilters);
    assert_that!(err.to_string(), contains_substring("num_bits: 1024"));
    assert_that!(err.to_string(), contains_substring("other_num_bits: 2048"));
    assert_eq!(a, before);
    assert_eq!(a.bits_used(), before.bits_used());
}

#[test]
fn test_merge_rejects_different_num_hashes() {
    let mut a = BloomFilter::with_num_bits(100, 1_000).unwrap();
    let b = BloomFilter::with_num_bits(200, 1_000).unwrap();
    assert_eq!(a.capacity(), b.capacity());
    assert_ne!(a.num_hashes(), b.num_hashes());
    assert!(!a.is_compatible(&b));

    let err = a.merge(&b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleFilters);
    assert!(a.is_empty());
}
