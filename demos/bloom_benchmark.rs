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

//! Correctness and throughput driver.
//!
//! Usage: `cargo run --release --example bloom_benchmark -- [elements] [bit_size]`

use std::collections::HashSet;
use std::hint::black_box;
use std::time::Instant;

use bloomfilter::bloom::BloomFilter;
use bloomfilter::bloom::BloomFilterBuilder;
use bloomfilter::common::JavaRandom;
use bloomfilter::common::RandomSource;

fn main() {
    let mut args = std::env::args().skip(1);
    let elements: u64 = args.next().and_then(|v| v.parse().ok()).unwrap_or(1_000_000);
    let bit_size: u64 = args.next().and_then(|v| v.parse().ok()).unwrap_or(10_000_000);

    println!(
        "Testing a bloom filter containing n={} elements in a bit array of m={} bits (={:.1}Mib)\n",
        elements,
        bit_size,
        bit_size as f64 / (1024.0 * 1024.0 * 8.0)
    );

    let mut rng = JavaRandom::seeded(0);
    let mut filter = match BloomFilter::with_num_bits(elements, bit_size) {
        Ok(filter) => filter,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    test_correctness(&mut filter, &mut rng, elements, bit_size);
    test_insertion(&mut filter, &mut rng, elements);
    test_query(&mut filter, &mut rng, elements);
    test_merge(&mut filter, &mut rng, elements.min(10_000));
}

fn test_correctness(filter: &mut BloomFilter, rng: &mut JavaRandom, elements: u64, bit_size: u64) {
    println!("Testing correctness.\nCreating a set and filling it together with our filter...");
    filter.clear();

    let mut inside = HashSet::with_capacity(elements as usize);
    while (inside.len() as u64) < elements {
        let v = rng.next_i32();
        inside.insert(v);
        filter.add(&v);
        assert!(filter.contains(&v), "there should be no false negative");
    }

    let mut found = 0_u64;
    let mut total = 0_u64;
    while total < elements {
        let v = rng.next_i32();
        if inside.contains(&v) {
            continue;
        }
        total += 1;
        if filter.contains(&v) {
            found += 1;
        }
    }

    let rate = found as f64 / total as f64;
    let expected = BloomFilterBuilder::expected_fpp(elements, bit_size);
    println!(
        "Elements incorrectly found to be inside: {found:8}/{total:<8} ({:3.2}%, expected {:3.2}%)\n",
        100.0 * rate,
        100.0 * expected
    );
}

fn test_insertion(filter: &mut BloomFilter, rng: &mut JavaRandom, elements: u64) {
    println!("Testing insertion speed...");
    filter.clear();

    let start = Instant::now();
    for _ in 0..elements {
        filter.add(&rng.next_i32());
    }
    let elapsed = start.elapsed();

    println!(
        "Inserted {} elements in {} ns.\nInsertion speed: {:e} elements/second\n",
        elements,
        elapsed.as_nanos(),
        elements as f64 / elapsed.as_secs_f64()
    );
}

fn test_query(filter: &mut BloomFilter, rng: &mut JavaRandom, elements: u64) {
    println!("Testing query speed...");
    filter.clear();
    for _ in 0..elements {
        filter.add(&rng.next_i32());
    }

    let mut xor = true;
    let start = Instant::now();
    for _ in 0..elements {
        xor ^= filter.contains(&rng.next_i32());
    }
    let elapsed = start.elapsed();
    black_box(xor);

    println!(
        "Queried {} elements in {} ns.\nQuery speed: {:e} elements/second\n",
        elements,
        elapsed.as_nanos(),
        elements as f64 / elapsed.as_secs_f64()
    );
}

fn test_merge(filter: &mut BloomFilter, rng: &mut JavaRandom, rounds: u64) {
    print!("Testing merge... ");
    filter.clear();

    let mut other = filter.clone();
    for _ in 0..rounds {
        let a = rng.next_i32();
        let b = rng.next_i32();
        filter.add(&a);
        other.add(&b);
    }

    let filter: &BloomFilter = filter;
    let mut ab = filter.clone();
    let mut ba = other.clone();
    for (receiver, source) in [(&mut ab, &other), (&mut ba, filter)] {
        if let Err(err) = receiver.merge(source) {
            println!("failed: {err}");
            return;
        }
    }
    assert_eq!(ab, ba, "a.merge(b) = b.merge(a)");
    println!("Done.\n");
}
