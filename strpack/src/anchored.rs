// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

use crate::far::FarStr;
use crate::handle::{self, StrHandle, WORD};
use crate::traits::{DefaultTraits, Length, StringTraits};
use core::marker::PhantomData;

/// Configurable-width handle tagged through its pointer field.
///
/// Layout within the `S`-byte array:
///
/// ```text
/// [ ptr: word | len: T::Size | buf: rest ]
/// ```
///
/// A zero (null) pointer means the handle is anchored to its own inline
/// buffer; any other value is a [FarStr] data pointer. Null rather than
/// a self-address marks the small case because handles move bitwise in
/// Rust, and an absolute pointer into the handle's own storage would
/// dangle after every move. The length field is shared by both
/// representations, so `len` never touches the arena.
///
/// The inline capacity is what remains after the pointer, the length,
/// and a NUL terminator: `S - word - size_of::<T::Size>() - 1`. That
/// makes this variant pay for its uniform length field with less inline
/// room than [PackedStr](crate::PackedStr) at the same width.
///
/// Unlike the other handles this one is not `Copy`: duplicating it goes
/// through [Clone], which re-anchors small handles to the new buffer.
pub struct AnchoredStr<const S: usize, T: StringTraits = DefaultTraits> {
    raw: [u8; S],
    _traits: PhantomData<fn() -> T>,
}

impl<const S: usize, T: StringTraits> AnchoredStr<S, T> {
    const VALID_WIDTH: () = assert!(
        S >= 16 && S < 128 && S % 8 == 0,
        "handle width must be a multiple of 8 in [16, 128)"
    );
    const FITS: () = assert!(
        S >= WORD + <T::Size as Length>::WIDTH + 2,
        "width leaves no room for the inline buffer"
    );

    const LEN_FIELD: usize = WORD;
    const BUF: usize = WORD + <T::Size as Length>::WIDTH;

    /// Longest string representable inline.
    pub const INLINE_CAPACITY: usize = S - Self::BUF - 1;

    pub(crate) fn inline(bytes: &[u8], len: T::Size) -> Self {
        let () = Self::VALID_WIDTH;
        let () = Self::FITS;
        debug_assert!(bytes.len() <= Self::INLINE_CAPACITY);
        debug_assert_eq!(bytes.len(), len.as_usize());
        let mut raw = [0u8; S];
        // The pointer word stays zero: anchored to the own buffer.
        len.write_ne(&mut raw[Self::LEN_FIELD..Self::BUF]);
        T::copy(&mut raw[Self::BUF..Self::BUF + bytes.len()], bytes);
        // buf[len] is already the zero terminator.
        Self {
            raw,
            _traits: PhantomData,
        }
    }

    pub(crate) fn from_far(far: FarStr<T>, len: T::Size) -> Self {
        let () = Self::VALID_WIDTH;
        let () = Self::FITS;
        let mut raw = [0u8; S];
        raw[..WORD].copy_from_slice(&(far.data().as_ptr() as usize).to_ne_bytes());
        len.write_ne(&mut raw[Self::LEN_FIELD..Self::BUF]);
        Self {
            raw,
            _traits: PhantomData,
        }
    }

    fn far_addr(&self) -> usize {
        let mut word = [0u8; WORD];
        word.copy_from_slice(&self.raw[..WORD]);
        usize::from_ne_bytes(word)
    }

    #[inline]
    pub fn is_small(&self) -> bool {
        self.far_addr() == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        T::Size::read_ne(&self.raw[Self::LEN_FIELD..Self::BUF]).as_usize()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        match self.far_addr() {
            0 => self.raw[Self::BUF..].as_ptr(),
            addr => addr as *const u8,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        StrHandle::as_bytes(self)
    }

    /// Exchanges two handles, re-anchoring as needed.
    ///
    /// The length fields and the full inline buffers are exchanged
    /// unconditionally; only the pointer word is representation-aware.
    /// A small/large pair therefore ends up with the far pointer on the
    /// formerly-small side and the surviving inline bytes anchored on
    /// the other.
    pub fn swap(&mut self, other: &mut Self) {
        match (self.is_small(), other.is_small()) {
            (true, true) => {
                // Both pointer words are zero already.
            }
            (true, false) => {
                self.raw[..WORD].copy_from_slice(&other.raw[..WORD]);
                other.raw[..WORD].fill(0);
            }
            (false, true) => {
                other.raw[..WORD].copy_from_slice(&self.raw[..WORD]);
                self.raw[..WORD].fill(0);
            }
            (false, false) => {
                let (a, b) = (&mut self.raw[..WORD], &mut other.raw[..WORD]);
                a.swap_with_slice(b);
            }
        }
        self.raw[Self::LEN_FIELD..].swap_with_slice(&mut other.raw[Self::LEN_FIELD..]);
    }
}

impl<const S: usize, T: StringTraits> Clone for AnchoredStr<S, T> {
    fn clone(&self) -> Self {
        let mut raw = [0u8; S];
        raw[Self::LEN_FIELD..Self::BUF].copy_from_slice(&self.raw[Self::LEN_FIELD..Self::BUF]);
        if self.is_small() {
            // Copy the full inline capacity, not just len; the cost is
            // then independent of the content.
            raw[Self::BUF..].copy_from_slice(&self.raw[Self::BUF..]);
            // The clone's zero pointer word anchors it to its own
            // buffer.
        } else {
            raw[..WORD].copy_from_slice(&self.raw[..WORD]);
        }
        Self {
            raw,
            _traits: PhantomData,
        }
    }
}

impl<const S: usize, T: StringTraits> StrHandle for AnchoredStr<S, T> {
    type Traits = T;

    #[inline]
    fn as_ptr(&self) -> *const u8 {
        AnchoredStr::as_ptr(self)
    }

    #[inline]
    fn len(&self) -> usize {
        AnchoredStr::len(self)
    }

    #[inline]
    fn is_small(&self) -> bool {
        AnchoredStr::is_small(self)
    }
}

impl<const S: usize, T: StringTraits> PartialEq for AnchoredStr<S, T> {
    fn eq(&self, other: &Self) -> bool {
        handle::eq(self, other)
    }
}

impl<const S: usize, T: StringTraits> Eq for AnchoredStr<S, T> {}

handle::impl_bytes_ops! { impl[const S: usize, T: StringTraits] AnchoredStr<S, T> }
