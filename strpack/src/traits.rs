// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

use core::cmp::Ordering;
use core::fmt;
use core::mem::size_of;

/// Unsigned integer used as the stored length of interned strings.
///
/// The width is a configuration choice: it sizes the metadata header in
/// front of every far-interned string and the length field of the wider
/// handles, and it bounds the longest string that can be interned.
pub trait Length: Copy + Eq + Ord + fmt::Debug + 'static {
    /// Size of the encoded length in bytes.
    const WIDTH: usize;

    /// Fails when `n` does not fit, which callers surface as a
    /// too-large-to-intern error.
    fn from_usize(n: usize) -> Option<Self>;

    fn as_usize(self) -> usize;

    /// Writes the native-order encoding into `dst`, which must be
    /// exactly [Self::WIDTH] bytes.
    fn write_ne(self, dst: &mut [u8]);

    /// Reads the native-order encoding from `src`, which must be
    /// exactly [Self::WIDTH] bytes.
    fn read_ne(src: &[u8]) -> Self;
}

macro_rules! impl_length {
    ($($ty:ty),* $(,)?) => {$(
        impl Length for $ty {
            const WIDTH: usize = size_of::<$ty>();

            #[inline]
            fn from_usize(n: usize) -> Option<Self> {
                Self::try_from(n).ok()
            }

            #[inline]
            fn as_usize(self) -> usize {
                self as usize
            }

            #[inline]
            fn write_ne(self, dst: &mut [u8]) {
                dst.copy_from_slice(&self.to_ne_bytes());
            }

            #[inline]
            fn read_ne(src: &[u8]) -> Self {
                let mut buf = [0u8; size_of::<$ty>()];
                buf.copy_from_slice(src);
                Self::from_ne_bytes(buf)
            }
        }
    )*};
}

impl_length!(u16, u32, u64);

/// Configuration point shared by the interner and every handle type.
///
/// Strings are opaque byte sequences here; there are no Unicode
/// semantics. The defaults delegate to the standard byte-slice
/// primitives (which lower to `memcmp`/`memcpy`), but both can be
/// overridden, for instance with a vectorized comparator.
pub trait StringTraits {
    /// Stored length type; see [Length].
    type Size: Length;

    /// When true, two [FarStr](crate::FarStr) handles compare equal by
    /// pointer identity alone. Sound because interning stores at most
    /// one copy per unique content, but only within a single interner.
    /// Set to false for defensive content comparison.
    const FAR_PTR_EQUALITY: bool = true;

    /// Compares two byte prefixes of equal length. Must be a strict
    /// weak ordering.
    #[inline]
    fn cmp(a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }

    /// Copies `src` into `dst`; the regions never overlap.
    #[inline]
    fn copy(dst: &mut [u8], src: &[u8]) {
        dst.copy_from_slice(src)
    }
}

/// Recommended configuration: 32-bit lengths, pointer equality for far
/// handles.
pub struct DefaultTraits;

impl StringTraits for DefaultTraits {
    type Size = u32;
}
