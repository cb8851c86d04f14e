// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

use crate::far::FarStr;
use crate::handle::{self, StrHandle, WORD};
use crate::traits::{DefaultTraits, StringTraits};
use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;

/// One-machine-word handle with inline storage for up to
/// [Self::INLINE_CAPACITY] bytes.
///
/// The word is a byte array wearing two costumes:
///
/// * small: the bytes live at the front, and the last byte in memory
///   order holds `(capacity - len) << 1`. Tag bit 0 is clear, and when
///   the string fills the whole capacity the encoded byte is zero and
///   doubles as the NUL terminator.
/// * large: the word is a [FarStr] pointer with bit 0 of the last byte
///   set. On little-endian that bit sits in the pointer's most
///   significant byte, which is zero for userspace addresses; on
///   big-endian it is the pointer's lowest bit, which is free because
///   arena records are 2-aligned.
///
/// Both representations are plain bytes, so moves, copies, and swaps are
/// bitwise.
pub struct TinyStr<T: StringTraits = DefaultTraits> {
    raw: [u8; WORD],
    _traits: PhantomData<fn() -> T>,
}

impl<T: StringTraits> TinyStr<T> {
    /// Longest string representable inline.
    pub const INLINE_CAPACITY: usize = WORD - 1;

    /// Index of the byte carrying the tag, last in memory order.
    const TAG_BYTE: usize = WORD - 1;
    const TAG: u8 = 0x1;

    pub(crate) fn inline(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= Self::INLINE_CAPACITY);
        let mut raw = [0u8; WORD];
        T::copy(&mut raw[..bytes.len()], bytes);
        // Zero-initialization already placed the terminator at
        // raw[len]. At full capacity the encoded free count is zero and
        // overwrites it, serving as terminator itself.
        raw[Self::TAG_BYTE] = ((Self::INLINE_CAPACITY - bytes.len()) << 1) as u8;
        Self {
            raw,
            _traits: PhantomData,
        }
    }

    pub(crate) fn from_far(far: FarStr<T>) -> Self {
        let mut raw = (far.data().as_ptr() as usize).to_ne_bytes();
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

    /// Recovers the far handle. Must only be called on the large
    /// representation.
    fn far(&self) -> FarStr<T> {
        debug_assert!(!self.is_small());
        // Mask the tag out of a scratch copy; clearing it in place
        // would corrupt the live handle.
        let mut scratch = self.raw;
        scratch[Self::TAG_BYTE] &= !Self::TAG;
        let addr = usize::from_ne_bytes(scratch);
        // SAFETY: from_far stored a non-null data pointer, and the tag
        // occupied a bit that was zero in the original address.
        FarStr::from_data(unsafe { NonNull::new_unchecked(addr as *mut u8) })
    }

    #[inline]
    pub fn len(&self) -> usize {
        if self.is_small() {
            Self::INLINE_CAPACITY - (self.raw[Self::TAG_BYTE] >> 1) as usize
        } else {
            self.far().len()
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
            self.far().as_ptr()
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

impl<T: StringTraits> Clone for TinyStr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: StringTraits> Copy for TinyStr<T> {}

impl<T: StringTraits> StrHandle for TinyStr<T> {
    type Traits = T;

    #[inline]
    fn as_ptr(&self) -> *const u8 {
        TinyStr::as_ptr(self)
    }

    #[inline]
    fn len(&self) -> usize {
        TinyStr::len(self)
    }

    #[inline]
    fn is_small(&self) -> bool {
        TinyStr::is_small(self)
    }
}

impl<T: StringTraits> PartialEq for TinyStr<T> {
    fn eq(&self, other: &Self) -> bool {
        handle::eq(self, other)
    }
}

impl<T: StringTraits> Eq for TinyStr<T> {}

handle::impl_bytes_ops! { impl[T: StringTraits] TinyStr<T> }
