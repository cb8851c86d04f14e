// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use strpack::{AnchoredStr, Interner, PackedStr, TinyStr};

proptest! {
    /// Interning any byte content, interior zeros included, round-trips
    /// and deduplicates.
    #[test]
    fn intern_round_trips(values in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..64)) {
        let mut interner = Interner::new();
        let mut handles = Vec::with_capacity(values.len());
        for value in &values {
            let handle = interner.intern(value).unwrap();
            prop_assert_eq!(value.as_slice(), handle.as_bytes());
            handles.push(handle);
        }
        for (value, handle) in values.iter().zip(&handles) {
            let again = interner.intern(value).unwrap();
            prop_assert_eq!(handle.as_ptr(), again.as_ptr());
        }
    }

    /// Every handle variant agrees with the source bytes and with the
    /// other variants.
    #[test]
    fn variants_agree(value in prop::collection::vec(any::<u8>(), 0..80)) {
        let mut interner = Interner::new();
        let tiny: TinyStr = interner.tiny(&value).unwrap();
        let packed: PackedStr<24> = interner.packed(&value).unwrap();
        let anchored: AnchoredStr<24> = interner.anchored(&value).unwrap();

        prop_assert_eq!(value.as_slice(), tiny.as_bytes());
        prop_assert_eq!(value.as_slice(), packed.as_bytes());
        prop_assert_eq!(value.as_slice(), anchored.as_bytes());
        prop_assert!(strpack::eq(&tiny, &packed));
        prop_assert!(strpack::eq(&packed, &anchored));
    }

    /// Handle ordering matches byte-slice ordering for any pair.
    #[test]
    fn ordering_matches_slices(
        a in prop::collection::vec(any::<u8>(), 0..40),
        b in prop::collection::vec(any::<u8>(), 0..40),
    ) {
        let mut interner = Interner::new();
        let ha: TinyStr = interner.tiny(&a).unwrap();
        let hb: TinyStr = interner.tiny(&b).unwrap();
        prop_assert_eq!(a.cmp(&b), strpack::compare(&ha, &hb));
    }
}
