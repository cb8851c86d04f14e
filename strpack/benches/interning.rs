// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

use criterion::*;
use strpack::{Interner, PackedStr, TinyStr};

/// Word list with a realistic mix of short identifiers and longer
/// phrases, repeated to exercise the deduplication path.
fn words() -> Vec<String> {
    let mut words = Vec::new();
    for i in 0..512usize {
        words.push(format!("w{i}"));
        words.push(format!("identifier_number_{i}"));
        words.push(format!("a considerably longer sentence used as test payload {i}"));
    }
    words
}

pub fn intern_far(c: &mut Criterion) {
    let words = words();
    c.bench_function("intern far handles", |b| {
        b.iter(|| {
            let mut interner = Interner::new();
            for word in &words {
                black_box(interner.intern(word).unwrap());
            }
            let n_strings = interner.len();

            // Re-insert; nothing new should be stored.
            for word in &words {
                black_box(interner.intern(word).unwrap());
            }
            assert_eq!(n_strings, interner.len());
        })
    });
}

pub fn intern_tiny(c: &mut Criterion) {
    let words = words();
    c.bench_function("intern tiny handles", |b| {
        b.iter(|| {
            let mut interner = Interner::new();
            for word in &words {
                let handle: TinyStr = interner.tiny(word).unwrap();
                black_box(handle);
            }
        })
    });
}

pub fn intern_packed(c: &mut Criterion) {
    let words = words();
    c.bench_function("intern packed<32> handles", |b| {
        b.iter(|| {
            let mut interner = Interner::new();
            for word in &words {
                let handle: PackedStr<32> = interner.packed(word).unwrap();
                black_box(handle);
            }
        })
    });
}

criterion_group!(benches, intern_far, intern_tiny, intern_packed);
criterion_main!(benches);
