// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

use crate::handle::{self, StrHandle};
use crate::metadata::Header;
use crate::traits::{DefaultTraits, Length, StringTraits};
use core::marker::PhantomData;
use core::ptr::NonNull;

/// Pointer-sized handle to an interned string.
///
/// Wraps the data pointer of an arena record; the length is recovered
/// from the metadata header in front of it. Because the
/// interner stores one copy per unique content, the pointer doubles as
/// an identity: with the default configuration `==` is a single pointer
/// comparison (see [StringTraits::FAR_PTR_EQUALITY]).
///
/// A handle stays valid for as long as the interner that produced it.
#[repr(transparent)]
pub struct FarStr<T: StringTraits = DefaultTraits> {
    data: NonNull<u8>,
    _traits: PhantomData<fn() -> T>,
}

const _: () = assert!(core::mem::size_of::<FarStr>() == core::mem::size_of::<*const u8>());

// SAFETY: the referenced record is immutable for the interner's whole
// lifetime, so shared reads from any thread are fine.
unsafe impl<T: StringTraits> Send for FarStr<T> {}
unsafe impl<T: StringTraits> Sync for FarStr<T> {}

impl<T: StringTraits> FarStr<T> {
    /// `data` must be the data pointer of a written arena record.
    pub(crate) fn from_data(data: NonNull<u8>) -> Self {
        Self {
            data,
            _traits: PhantomData,
        }
    }

    pub(crate) fn data(&self) -> NonNull<u8> {
        self.data
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    #[inline]
    pub fn len(&self) -> usize {
        // SAFETY: from_data guarantees a header precedes the pointee.
        unsafe { Header::<T>::len_before(self.data) }.as_usize()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_small(&self) -> bool {
        false
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        StrHandle::as_bytes(self)
    }
}

impl<T: StringTraits> Clone for FarStr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: StringTraits> Copy for FarStr<T> {}

impl<T: StringTraits> StrHandle for FarStr<T> {
    type Traits = T;

    #[inline]
    fn as_ptr(&self) -> *const u8 {
        FarStr::as_ptr(self)
    }

    #[inline]
    fn len(&self) -> usize {
        FarStr::len(self)
    }

    #[inline]
    fn is_small(&self) -> bool {
        false
    }
}

impl<T: StringTraits> PartialEq for FarStr<T> {
    fn eq(&self, other: &Self) -> bool {
        if T::FAR_PTR_EQUALITY {
            // One copy per content makes identity and equality coincide.
            self.data == other.data
        } else {
            handle::eq(self, other)
        }
    }
}

impl<T: StringTraits> Eq for FarStr<T> {}

handle::impl_bytes_ops! { impl[T: StringTraits] FarStr<T> }
