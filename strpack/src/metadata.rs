// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

use crate::traits::{Length, StringTraits};
use core::alloc::{Layout, LayoutError};
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ptr::{self, NonNull};
use core::slice;

/// Metadata record stored immediately before the bytes of every interned
/// string:
///
/// ```text
/// [ length: T::Size | string bytes ... | NUL ]
///                   ^-- data pointer
/// ```
///
/// Handles refer to the data pointer, never to the header, so a handle
/// can be treated as a plain byte pointer while the length stays
/// recoverable by stepping back [Header::SIZE] bytes. The terminator is
/// not part of the length; it is there so the data pointer can be handed
/// to C APIs expecting NUL-terminated strings.
///
/// `packed(2)` keeps the alignment requirement low so string records pack
/// tightly in the arena.
#[repr(C, packed(2))]
pub(crate) struct Header<T: StringTraits> {
    len: T::Size,
}

impl<T: StringTraits> Header<T> {
    pub(crate) const SIZE: usize = core::mem::size_of::<Header<T>>();

    /// Layout of a full record holding `len` string bytes, including the
    /// header and the terminator.
    pub(crate) fn layout_of(len: usize) -> Result<Layout, LayoutError> {
        let header = Layout::new::<Header<T>>();
        let bytes = Layout::array::<u8>(len)?;
        let terminator = Layout::new::<u8>();
        let (layout, offset) = header.extend(bytes)?;
        debug_assert_eq!(Self::SIZE, offset);
        let (layout, _) = layout.extend(terminator)?;
        Ok(layout)
    }

    /// Writes a complete record into `allocation` and returns the data
    /// pointer, the canonical identity of the interned string.
    ///
    /// # Safety
    /// The allocation must satisfy [Self::layout_of] for `bytes.len()`,
    /// and `len` must be the converted form of `bytes.len()`.
    pub(crate) unsafe fn write(
        allocation: NonNull<[u8]>,
        len: T::Size,
        bytes: &[u8],
    ) -> NonNull<u8> {
        debug_assert!(Self::SIZE + bytes.len() + 1 <= allocation.len());
        debug_assert_eq!(bytes.len(), len.as_usize());

        let header = allocation.as_ptr() as *mut Header<T>;
        // The arena only guarantees the record's 2-byte alignment.
        ptr::addr_of_mut!((*header).len).write_unaligned(len);

        let data = (header as *mut u8).add(Self::SIZE);
        ptr::copy_nonoverlapping(bytes.as_ptr(), data, bytes.len());
        // Arena memory is not zeroed; the terminator must be written.
        data.add(bytes.len()).write(0);
        NonNull::new_unchecked(data)
    }

    /// Reads back the length header sitting in front of `data`.
    ///
    /// # Safety
    /// `data` must have been returned by [Self::write].
    pub(crate) unsafe fn len_before(data: NonNull<u8>) -> T::Size {
        let header = data.as_ptr().sub(Self::SIZE) as *const Header<T>;
        ptr::addr_of!((*header).len).read_unaligned()
    }
}

/// Hash-map key for the deduplication index.
///
/// Carries the precomputed digest so that probing and resizing never
/// re-hash string contents, plus a raw pointer to the bytes. During a
/// lookup the pointer refers to the caller's candidate bytes; once
/// stored in the map it must be [rebound](Self::rebind) to the permanent
/// arena copy.
pub(crate) struct LookupKey<T: StringTraits> {
    data: *const u8,
    hash: u64,
    len: T::Size,
    _traits: PhantomData<fn() -> T>,
}

impl<T: StringTraits> LookupKey<T> {
    pub(crate) fn new(hash: u64, len: T::Size, data: *const u8) -> Self {
        Self {
            data,
            hash,
            len,
            _traits: PhantomData,
        }
    }

    /// Same digest and length, pointing at the interned copy.
    pub(crate) fn rebind(self, data: *const u8) -> Self {
        Self { data, ..self }
    }

    fn bytes(&self) -> &[u8] {
        // SAFETY: the pointee outlives the key: either the caller's
        // borrow across a single map operation, or the arena copy.
        unsafe { slice::from_raw_parts(self.data, self.len.as_usize()) }
    }
}

impl<T: StringTraits> PartialEq for LookupKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.len == other.len
            && T::cmp(self.bytes(), other.bytes()).is_eq()
    }
}

impl<T: StringTraits> Eq for LookupKey<T> {}

impl<T: StringTraits> Hash for LookupKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Forward the precomputed digest instead of re-hashing bytes.
        state.write_u64(self.hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::DefaultTraits;
    use allocator_api2::alloc::{Allocator, Global};

    #[test]
    fn record_round_trip() {
        let msg = b"interned";
        let layout = Header::<DefaultTraits>::layout_of(msg.len()).unwrap();
        assert_eq!(4 + msg.len() + 1, layout.size());

        let allocation = Global.allocate(layout).unwrap();
        let data = unsafe { Header::<DefaultTraits>::write(allocation, msg.len() as u32, msg) };

        let len = unsafe { Header::<DefaultTraits>::len_before(data) };
        assert_eq!(msg.len(), len.as_usize());
        let stored = unsafe { slice::from_raw_parts(data.as_ptr(), msg.len() + 1) };
        assert_eq!(msg, &stored[..msg.len()]);
        assert_eq!(0, stored[msg.len()]);

        unsafe { Global.deallocate(allocation.cast(), layout) };
    }

    #[test]
    fn header_size_follows_length_type() {
        struct Narrow;
        impl StringTraits for Narrow {
            type Size = u16;
        }
        struct Wide;
        impl StringTraits for Wide {
            type Size = u64;
        }
        assert_eq!(2, Header::<Narrow>::SIZE);
        assert_eq!(4, Header::<DefaultTraits>::SIZE);
        assert_eq!(8, Header::<Wide>::SIZE);
    }
}
