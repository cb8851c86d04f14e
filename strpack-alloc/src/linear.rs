// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

use crate::{AllocError, Allocator};
use core::alloc::Layout;
use core::cell::Cell;
use core::ptr::{slice_from_raw_parts_mut, NonNull};

/// A monotonic allocator over one fixed region of memory.
///
/// The region is requested once from the upstream allocator `A` and
/// carved up front-to-back. Deallocating an individual block does
/// nothing; the whole region is returned to `A` when the
/// [LinearAllocator] is dropped. Destructors of objects placed in the
/// region are not run, that is the caller's job if it matters.
///
/// Once the region is exhausted, allocation fails. It never reaches for
/// more memory; see [ChainAllocator](crate::ChainAllocator) for that.
pub struct LinearAllocator<A: Allocator> {
    region: NonNull<u8>,
    region_layout: Layout,
    used: Cell<usize>,
    upstream: A,
}

// SAFETY: the region pointer is owned by this allocator and only the
// owner hands out pieces of it, so transferring the whole allocator to
// another thread is fine.
unsafe impl<A: Allocator> Send for LinearAllocator<A> {}

impl<A: Allocator> LinearAllocator<A> {
    /// Creates a [LinearAllocator] whose region satisfies `layout`,
    /// requested from `upstream`. If the upstream allocation is
    /// over-sized, the excess is used as well.
    pub fn new_in(layout: Layout, upstream: A) -> Result<Self, AllocError> {
        let region = upstream.allocate(layout)?;
        // SAFETY: size/align describe the actual allocation, which
        // exists, so they form a valid layout.
        let region_layout =
            unsafe { Layout::from_size_align(region.len(), layout.align()).unwrap_unchecked() };
        Ok(Self {
            region: region.cast(),
            region_layout,
            used: Cell::new(0),
            upstream,
        })
    }

    /// Number of bytes handed out so far, including alignment padding.
    #[inline]
    pub fn used_bytes(&self) -> usize {
        self.used.get()
    }

    /// Size of the whole backing region. Greater than or equal to
    /// [Self::used_bytes].
    #[inline]
    pub fn reserved_bytes(&self) -> usize {
        self.region_layout.size()
    }

    /// Bytes still available without touching the upstream allocator.
    pub fn remaining_capacity(&self) -> usize {
        self.reserved_bytes() - self.used_bytes()
    }

    #[inline]
    fn base_ptr(&self) -> *mut u8 {
        self.region.as_ptr()
    }

    /// Whether `layout` fits in the unused tail of the region.
    pub fn has_capacity_for(&self, layout: Layout) -> bool {
        // SAFETY: base_ptr + used is within the region, or the legal
        // one-past-the-end position.
        let pad = unsafe { self.base_ptr().add(self.used_bytes()) }.align_offset(layout.align());
        match pad.checked_add(layout.size()) {
            Some(needed) => self.remaining_capacity() >= needed,
            None => false,
        }
    }

    /// Forgets every block handed out so far, making the full region
    /// available again. Useful as a deterministic test fixture.
    ///
    /// # Safety
    /// No block obtained from this allocator may be read or written
    /// after the reset; the memory will be handed out again.
    pub unsafe fn reset(&mut self) {
        self.used.set(0);
    }
}

impl<A: Allocator> Drop for LinearAllocator<A> {
    fn drop(&mut self) {
        // SAFETY: returning the original pointer with its actual layout.
        unsafe { self.upstream.deallocate(self.region, self.region_layout) };
    }
}

unsafe impl<A: Allocator> Allocator for LinearAllocator<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if layout.size() == 0 {
            return Err(AllocError);
        }

        let used = self.used.get();
        // SAFETY: base_ptr + used is within the region, or the legal
        // one-past-the-end position.
        let pad = unsafe { self.base_ptr().add(used) }.align_offset(layout.align());
        let needed = pad.checked_add(layout.size()).ok_or(AllocError)?;
        if needed > self.reserved_bytes() - used {
            return Err(AllocError);
        }

        // SAFETY: used + pad + layout.size() was just checked to fit
        // inside the region.
        let thin = unsafe { self.base_ptr().add(used + pad) };
        debug_assert_eq!(0, thin.align_offset(layout.align()));
        let wide = slice_from_raw_parts_mut(thin, layout.size());

        self.used.set(used + needed);
        // SAFETY: derived from the region pointer, so it is not null.
        Ok(unsafe { NonNull::new_unchecked(wide) })
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
        // This is an arena. It does batch de-allocation when dropped.
    }
}
