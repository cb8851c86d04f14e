// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

use crate::LinearAllocator;
use crate::{AllocError, Allocator};
use core::alloc::Layout;
use core::cell::Cell;
use core::marker::PhantomData;
use core::mem::size_of;
use core::ptr::NonNull;

/// An arena allocator that grows by chaining fixed chunks together.
///
/// When the current chunk cannot satisfy a request, a fresh
/// [LinearAllocator] chunk is created and linked in front of the
/// previous one. Chunks already handed out never move or shrink, so
/// pointers into them stay valid for the lifetime of the
/// [ChainAllocator]. Individual deallocation does nothing; all chunks
/// are released together on drop.
pub struct ChainAllocator<A: Allocator + Clone> {
    /// Most recently created chunk; only this one accepts allocations.
    top: Cell<Option<NonNull<Chunk<A>>>>,
    /// The size hint for each chunk's linear allocator.
    chunk_size: usize,
    upstream: A,
}

/// Bookkeeping header placed at the start of each chunk, inside the
/// very region its own linear allocator manages. The `prev` link is set
/// once when the chunk is created and never changes afterwards.
struct Chunk<A: Allocator> {
    prev: Option<NonNull<Chunk<A>>>,
    linear: LinearAllocator<A>,
}

/// Walks the chain from the newest chunk to the oldest.
struct Chunks<'a, A: Allocator> {
    next: Option<NonNull<Chunk<A>>>,
    _chain: PhantomData<&'a Chunk<A>>,
}

impl<'a, A: Allocator> Iterator for Chunks<'a, A> {
    type Item = &'a Chunk<A>;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: chunk headers are written once at creation and stay
        // alive until the owning allocator drops; the borrow on the
        // allocator (held through the lifetime) prevents that.
        let chunk = unsafe { &*self.next?.as_ptr() };
        self.next = chunk.prev;
        Some(chunk)
    }
}

// SAFETY: the chain is only reachable through the owning allocator, so
// the whole allocator can move to another thread when its upstream can.
unsafe impl<A: Allocator + Clone + Send> Send for ChainAllocator<A> {}

impl<A: Allocator + Clone> ChainAllocator<A> {
    /// Bytes at the start of every chunk that go to chain bookkeeping,
    /// which matters when sizing the hint precisely, such as making
    /// sure a specific object fits in one chunk.
    pub const CHUNK_OVERHEAD: usize = size_of::<Chunk<A>>();

    /// Chunks need to be big enough that the overhead of chaining is
    /// worth it. Somewhat arbitrarily chosen.
    const MIN_CHUNK_SIZE: usize = 4 * Self::CHUNK_OVERHEAD;

    /// Creates a new [ChainAllocator]. No memory is requested until the
    /// first allocation. The `chunk_size_hint` sizes each chunk, and is
    /// raised to a small minimum when the hint cannot even hold the
    /// bookkeeping comfortably.
    pub const fn new_in(chunk_size_hint: usize, upstream: A) -> Self {
        // max is not a const fn, do it manually.
        let chunk_size = if chunk_size_hint < Self::MIN_CHUNK_SIZE {
            Self::MIN_CHUNK_SIZE
        } else {
            chunk_size_hint
        };
        Self {
            top: Cell::new(None),
            chunk_size,
            upstream,
        }
    }

    fn top_chunk(&self) -> Option<&Chunk<A>> {
        // SAFETY: the pointee was written at creation and lives until
        // this allocator drops. Only shared references are ever formed;
        // the linear allocator inside mutates through cells.
        self.top.get().map(|chunk| unsafe { &*chunk.as_ptr() })
    }

    fn chunks(&self) -> Chunks<'_, A> {
        Chunks {
            next: self.top.get(),
            _chain: PhantomData,
        }
    }

    /// Links a new chunk with room for at least `min_size` bytes in
    /// front of the chain.
    #[cold]
    #[inline(never)]
    fn grow(&self, min_size: usize) -> Result<(), AllocError> {
        let header = Layout::new::<Chunk<A>>();
        let size = min_size.max(self.chunk_size);
        let layout = Layout::from_size_align(size, header.align())
            .map_err(|_| AllocError)?
            .pad_to_align();
        let linear = LinearAllocator::new_in(layout, self.upstream.clone())?;

        // The header is the chunk's own first allocation, so it cannot
        // fail: the chunk was sized to hold it.
        let slot = linear.allocate(header)?.cast::<Chunk<A>>();
        // SAFETY: `slot` is fresh memory with the header's layout, and
        // writing moves the linear allocator (which owns the region the
        // slot lives in) into place without reading from it.
        unsafe {
            slot.as_ptr().write(Chunk {
                prev: self.top.get(),
                linear,
            });
        }
        self.top.set(Some(slot));
        Ok(())
    }

    /// Number of bytes allocated, including overhead. Unused space at
    /// the end of previous chunks counts as used, since it will never
    /// be handed out; unused space in the top chunk does not.
    pub fn used_bytes(&self) -> usize {
        let mut chunks = self.chunks();
        let top = match chunks.next() {
            Some(chunk) => chunk.linear.used_bytes(),
            None => return 0,
        };
        top + chunks.map(|c| c.linear.reserved_bytes()).sum::<usize>()
    }

    /// Number of bytes requested from the upstream allocator across the
    /// whole chain. Greater than or equal to [Self::used_bytes].
    pub fn reserved_bytes(&self) -> usize {
        self.chunks().map(|c| c.linear.reserved_bytes()).sum()
    }

    /// Bytes that can be allocated without requesting a new chunk. Only
    /// the top chunk accepts allocations; previous chunks are
    /// considered full.
    pub fn remaining_capacity(&self) -> usize {
        self.top_chunk()
            .map(|c| c.linear.remaining_capacity())
            .unwrap_or(0)
    }

    /// Whether `layout` fits without requesting a new chunk.
    pub fn has_capacity_for(&self, layout: Layout) -> bool {
        self.top_chunk()
            .is_some_and(|c| c.linear.has_capacity_for(layout))
    }
}

unsafe impl<A: Allocator + Clone> Allocator for ChainAllocator<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        if layout.size() == 0 {
            return Err(AllocError);
        }
        let layout = layout.pad_to_align();

        if !self.has_capacity_for(layout) {
            // The new chunk must fit the request, its own header, and
            // worst-case alignment padding between the two.
            let min_size = layout
                .size()
                .checked_add(Self::CHUNK_OVERHEAD)
                .and_then(|size| size.checked_add(layout.align() - 1))
                .ok_or(AllocError)?;
            self.grow(min_size)?;
        }

        match self.top_chunk() {
            Some(chunk) => chunk.linear.allocate(layout),
            // grow either linked a chunk or returned the error above.
            None => Err(AllocError),
        }
    }

    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
        // This is an arena. It does batch de-allocation when dropped.
    }
}

impl<A: Allocator + Clone> Drop for ChainAllocator<A> {
    fn drop(&mut self) {
        let mut next = self.top.get();
        while let Some(chunk) = next {
            // SAFETY: the header is read out to the stack before its
            // backing region is released, so the prev link survives the
            // linear allocator's drop.
            let Chunk { prev, linear } = unsafe { chunk.as_ptr().read() };
            next = prev;
            drop(linear);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allocator_api2::alloc::Global;

    fn aligned<T: ?Sized>(ptr: *const T, align: usize) -> bool {
        ptr as *const u8 as usize % align == 0
    }

    #[test]
    fn fuzz() {
        use bolero::generator::TypeGenerator;
        let chunk_hint = 0..=0x2000usize;
        let requests = Vec::<(usize, u32, u8)>::gen()
            .with()
            .values((1..=0x1000usize, 0..=6u32, u8::gen()));
        bolero::check!()
            .with_generator((chunk_hint, requests))
            .for_each(|(chunk_hint, requests)| {
                let allocator = ChainAllocator::new_in(*chunk_hint, Global);
                for (size, align_bits, fill) in requests {
                    let layout = Layout::from_size_align(*size, 1 << *align_bits).unwrap();
                    let mut block = allocator.allocate(layout).unwrap();
                    assert!(aligned(block.as_ptr(), layout.align()));
                    let bytes = unsafe { block.as_mut() };
                    assert!(bytes.len() >= *size);
                    bytes[0] = *fill;
                    bytes[bytes.len() - 1] = *fill;
                }
                assert!(allocator.used_bytes() <= allocator.reserved_bytes());
            })
    }

    #[test]
    fn zero_size_allocations_fail() {
        let allocator = ChainAllocator::new_in(512, Global);
        assert!(allocator.allocate(Layout::new::<()>()).is_err());
        // The failure did not create a chunk.
        assert_eq!(0, allocator.reserved_bytes());
    }

    #[test]
    fn chunk_hint_is_clamped() {
        // A tiny hint still yields chunks that hold the bookkeeping.
        let allocator = ChainAllocator::new_in(1, Global);
        let block = allocator.allocate(Layout::new::<u64>()).unwrap();
        assert!(aligned(block.as_ptr(), 8));
        assert!(allocator.reserved_bytes() >= ChainAllocator::<Global>::CHUNK_OVERHEAD);
    }

    #[test]
    fn test_stable_addresses_across_growth() {
        let allocator = ChainAllocator::new_in(256, Global);
        let layout = Layout::array::<u8>(64).unwrap();

        // Fill well past the first chunk while remembering each block,
        // then make sure earlier blocks still hold their bytes.
        let mut blocks = Vec::new();
        for i in 0..64u8 {
            let mut ptr = allocator.allocate(layout).unwrap();
            let obj = unsafe { ptr.as_mut() };
            obj.fill(i);
            blocks.push((ptr, i));
        }
        for (ptr, i) in &blocks {
            let obj = unsafe { ptr.as_ref() };
            assert!(obj.iter().all(|b| b == i));
        }
    }

    #[test]
    fn oversized_requests_get_their_own_chunk() {
        let allocator = ChainAllocator::new_in(256, Global);
        allocator.allocate(Layout::new::<u8>()).unwrap();
        let before = allocator.reserved_bytes();

        let layout = Layout::from_size_align(8192, 1).unwrap();
        let block = allocator.allocate(layout).unwrap();
        assert!(block.len() >= 8192);
        assert!(allocator.reserved_bytes() >= before + 8192);
    }

    #[test]
    fn usage_accounting_across_chunks() {
        let allocator = ChainAllocator::new_in(512, Global);
        assert_eq!(0, allocator.used_bytes());
        assert_eq!(0, allocator.remaining_capacity());

        let layout = Layout::array::<u8>(96).unwrap();
        let mut last_used = 0;
        for _ in 0..32 {
            allocator.allocate(layout).unwrap();
            let used = allocator.used_bytes();
            assert!(used > last_used);
            assert!(used <= allocator.reserved_bytes());
            last_used = used;
        }
        // Several chunks by now; skipped tails of earlier chunks count
        // as used, so the totals stay consistent.
        assert!(allocator.reserved_bytes() > 512);
    }
}
