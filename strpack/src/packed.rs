// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

use crate::far::FarStr;
use crate::handle::{self, StrHandle, WORD};
use crate::traits::{DefaultTraits, Length, StringTraits};
use core::marker::PhantomData;
use core::mem;

/// Configurable-width handle, `S` bytes wide, tagged in its trailing
/// length field.
///
/// * small: bytes at the front, `(capacity - len) << 1` in the last
///   byte, exactly like [TinyStr](crate::TinyStr) but with a capacity of
///   `S - 1`.
/// * large: a [FarStr] pointer in the first word and the string length
///   in the trailing machine word, with the tag folded into that word's
///   last byte. The tail is a full word even when `T::Size` is
///   narrower, so the stolen bit sits far above any length the handle
///   can carry. The length rides along in the handle, so reading it
///   never touches the arena.
///
/// `S` must be a multiple of 8 in `[16, 128)`; violations fail at
/// compile time. Moves, copies, and swaps are bitwise.
pub struct PackedStr<const S: usize, T: StringTraits = DefaultTraits> {
    raw: [u8; S],
    _traits: PhantomData<fn() -> T>,
}

impl<const S: usize, T: StringTraits> PackedStr<S, T> {
    const VALID_WIDTH: () = assert!(
        S >= 16 && S < 128 && S % 8 == 0,
        "handle width must be a multiple of 8 in [16, 128)"
    );

    /// Longest string representable inline.
    pub const INLINE_CAPACITY: usize = S - 1;

    const TAG_BYTE: usize = S - 1;
    const TAG: u8 = 0x1;

    /// Offset of the length word of the large representation.
    const LEN_FIELD: usize = S - WORD;

    pub(crate) fn inline(bytes: &[u8]) -> Self {
        let () = Self::VALID_WIDTH;
        debug_assert!(bytes.len() <= Self::INLINE_CAPACITY);
        let mut raw = [0u8; S];
        T::copy(&mut raw[..bytes.len()], bytes);
        // raw[len] is already the zero terminator; at full capacity the
        // encoded free count of zero takes that role.
        raw[Self::TAG_BYTE] = ((Self::INLINE_CAPACITY - bytes.len()) << 1) as u8;
        Self {
            raw,
            _traits: PhantomData,
        }
    }

    pub(crate) fn from_far(far: FarStr<T>, len: T::Size) -> Self {
        let () = Self::VALID_WIDTH;
        let mut raw = [0u8; S];
        raw[..WORD].copy_from_slice(&(far.data().as_ptr() as usize).to_ne_bytes());
        raw[Self::LEN_FIELD..].copy_from_slice(&len.as_usize().to_ne_bytes());
        // The full-word tail keeps the tag's bit position clear of any
        // length T::Size can represent.
        debug_assert_eq!(0, raw[Self::TAG_BYTE] & Self::TAG);
        raw[Self::TAG_BYTE] |= Self::TAG;
        Self {
            raw,
            _traits: PhantomData,
        }
    }

    #[inline]
    pub fn is_small(&self) -> bool {
        self.raw[Self::TAG_BYTE] & Self::TAG == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        if self.is_small() {
            Self::INLINE_CAPACITY - (self.raw[Self::TAG_BYTE] >> 1) as usize
        } else {
            // Mask the tag out of a scratch copy of the length word.
            let mut scratch = [0u8; WORD];
            scratch.copy_from_slice(&self.raw[Self::LEN_FIELD..]);
            scratch[WORD - 1] &= !Self::TAG;
            usize::from_ne_bytes(scratch)
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        if self.is_small() {
            self.raw.as_ptr()
        } else {
            let mut word = [0u8; WORD];
            word.copy_from_slice(&self.raw[..WORD]);
            usize::from_ne_bytes(word) as *const u8
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        StrHandle::as_bytes(self)
    }

    pub fn swap(&mut self, other: &mut Self) {
        // Valid for any mix of representations.
        mem::swap(&mut self.raw, &mut other.raw);
    }
}

impl<const S: usize, T: StringTraits> Clone for PackedStr<S, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<const S: usize, T: StringTraits> Copy for PackedStr<S, T> {}

impl<const S: usize, T: StringTraits> StrHandle for PackedStr<S, T> {
    type Traits = T;

    #[inline]
    fn as_ptr(&self) -> *const u8 {
        PackedStr::as_ptr(self)
    }

    #[inline]
    fn len(&self) -> usize {
        PackedStr::len(self)
    }

    #[inline]
    fn is_small(&self) -> bool {
        PackedStr::is_small(self)
    }
}

impl<const S: usize, T: StringTraits> PartialEq for PackedStr<S, T> {
    fn eq(&self, other: &Self) -> bool {
        handle::eq(self, other)
    }
}

impl<const S: usize, T: StringTraits> Eq for PackedStr<S, T> {}

handle::impl_bytes_ops! { impl[const S: usize, T: StringTraits] PackedStr<S, T> }

#[cfg(test)]
mod tests {
    use super::*;

    type Handle16 = PackedStr<16, DefaultTraits>;
    type Handle32 = PackedStr<32, DefaultTraits>;

    #[test]
    fn inline_encoding() {
        let s = Handle16::inline(b"fifteen bytes!!");
        assert!(s.is_small());
        assert_eq!(Handle16::INLINE_CAPACITY, s.len());
        assert_eq!(s, "fifteen bytes!!");
        // Full capacity: the free count byte is the terminator.
        assert_eq!(0, s.raw[15]);

        let s = Handle32::inline(b"short");
        assert!(s.is_small());
        assert_eq!(5, s.len());
        assert_eq!(0, s.raw[5]);
        assert_eq!(s, "short");
    }

    #[test]
    fn width_is_exact() {
        assert_eq!(16, mem::size_of::<Handle16>());
        assert_eq!(32, mem::size_of::<Handle32>());
        assert_eq!(24, mem::size_of::<PackedStr<24, DefaultTraits>>());
    }

    #[test]
    fn capacity_scales_with_width() {
        assert_eq!(15, Handle16::INLINE_CAPACITY);
        assert_eq!(23, PackedStr::<24, DefaultTraits>::INLINE_CAPACITY);
        assert_eq!(31, Handle32::INLINE_CAPACITY);
    }

    #[test]
    fn swap_is_bitwise() {
        let mut a = Handle16::inline(b"first");
        let mut b = Handle16::inline(b"second");
        a.swap(&mut b);
        assert_eq!(a, "second");
        assert_eq!(b, "first");
    }

    #[test]
    fn ordering_matches_bytes() {
        let a = Handle32::inline(b"aaa");
        let b = Handle32::inline(b"aab");
        assert!(a < b);
        assert!(a < Handle32::inline(b"aaaa"));
    }
}
