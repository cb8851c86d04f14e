// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

use crate::anchored::AnchoredStr;
use crate::far::FarStr;
use crate::metadata::{Header, LookupKey};
use crate::packed::PackedStr;
use crate::tiny::TinyStr;
use crate::traits::{DefaultTraits, Length, StringTraits};
use allocator_api2::alloc::{AllocError, Allocator, Global};
use core::alloc::LayoutError;
use core::fmt;
use core::hash::{BuildHasher, BuildHasherDefault, Hasher};
use hashbrown::{HashMap, TryReserveError};
use rustc_hash::FxHasher;
use strpack_alloc::ChainAllocator;

/// Default size of the arena chunks backing an [Interner].
const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Deduplicating string store.
///
/// Each unique byte string is copied exactly once into an arena, behind
/// a length header and in front of a NUL terminator, and every
/// subsequent request for the same content yields a handle to that same
/// copy. Storage is append-only; nothing is removed until the interner
/// itself is dropped, which is what lets handles be plain pointers.
///
/// [Self::intern] returns the pointer-sized [FarStr]; [Self::tiny],
/// [Self::packed], and [Self::anchored] wrap it in the small-string
/// handle variants, keeping short strings out of the arena entirely.
///
/// The allocator `A` must hand out stable addresses, which
/// [ChainAllocator] and [LinearAllocator](strpack_alloc::LinearAllocator)
/// both do.
pub struct Interner<
    T: StringTraits = DefaultTraits,
    A: Allocator = ChainAllocator<Global>,
    H: BuildHasher = BuildHasherDefault<FxHasher>,
> {
    arena: A,
    map: HashMap<LookupKey<T>, FarStr<T>, H>,
}

// SAFETY: the map keys hold raw pointers, but they point either into
// the owned arena or nowhere observable; moving the whole interner to
// another thread is fine when its parts are.
unsafe impl<T: StringTraits, A: Allocator + Send, H: BuildHasher + Send> Send
    for Interner<T, A, H>
{
}

impl Interner {
    /// An interner with the default configuration, growing its arena in
    /// 4 KiB chunks.
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Chooses the granularity in which the backing arena grows. Small
    /// values keep tiny interners tight; large values amortize upstream
    /// allocations for heavy use.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            arena: ChainAllocator::new_in(chunk_size, Global),
            map: HashMap::default(),
        }
    }

    /// Bytes of arena memory consumed by interned strings, headers and
    /// chunk bookkeeping included.
    pub fn used_bytes(&self) -> usize {
        self.arena.used_bytes()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StringTraits, A: Allocator, H: BuildHasher + Default> Interner<T, A, H> {
    /// An interner storing its strings in `arena`.
    pub fn new_in(arena: A) -> Self {
        Self {
            arena,
            map: HashMap::default(),
        }
    }
}

impl<T: StringTraits, A: Allocator, H: BuildHasher> Interner<T, A, H> {
    /// Number of distinct strings stored.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The backing arena, e.g. to inspect its memory usage.
    pub fn arena(&self) -> &A {
        &self.arena
    }

    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        let mut hasher = self.map.hasher().build_hasher();
        hasher.write(bytes);
        hasher.finish()
    }

    fn convert_len(bytes: &[u8]) -> Result<T::Size, InternError> {
        T::Size::from_usize(bytes.len()).ok_or(InternError::LargeString(bytes.len()))
    }

    /// Interns `value` and returns the far handle for it, which for a
    /// repeated value is bit-identical to the first one returned.
    ///
    /// Fails when the length does not fit in `T::Size` or when the
    /// arena or the index cannot grow.
    pub fn intern(&mut self, value: impl AsRef<[u8]>) -> Result<FarStr<T>, InternError> {
        let bytes = value.as_ref();
        let len = Self::convert_len(bytes)?;
        let hash = self.hash_bytes(bytes);
        let key = LookupKey::new(hash, len, bytes.as_ptr());
        if let Some(existing) = self.map.get(&key) {
            return Ok(*existing);
        }

        // Reserve the index slot first so an allocation failure cannot
        // leave a stored string without an index entry.
        self.map.try_reserve(1)?;
        let layout = Header::<T>::layout_of(bytes.len())?;
        let allocation = self.arena.allocate(layout)?;
        // SAFETY: the allocation satisfies layout_of for these bytes,
        // and len is the converted byte count.
        let data = unsafe { Header::<T>::write(allocation, len, bytes) };
        let handle = FarStr::from_data(data);

        // The stored key must reference the permanent copy, not the
        // caller's borrow.
        self.map.insert(key.rebind(data.as_ptr()), handle);
        Ok(handle)
    }

    /// Looks up `value` without storing it, returning its far handle if
    /// it has been interned before.
    pub fn get(&self, value: impl AsRef<[u8]>) -> Option<FarStr<T>> {
        let bytes = value.as_ref();
        let len = T::Size::from_usize(bytes.len())?;
        let key = LookupKey::new(self.hash_bytes(bytes), len, bytes.as_ptr());
        self.map.get(&key).copied()
    }

    pub fn contains(&self, value: impl AsRef<[u8]>) -> bool {
        self.get(value).is_some()
    }

    /// Interns into a [TinyStr]: values up to
    /// [TinyStr::INLINE_CAPACITY] bytes are packed into the handle
    /// itself and never reach the arena.
    pub fn tiny(&mut self, value: impl AsRef<[u8]>) -> Result<TinyStr<T>, InternError> {
        let bytes = value.as_ref();
        if bytes.len() <= TinyStr::<T>::INLINE_CAPACITY {
            return Ok(TinyStr::inline(bytes));
        }
        Ok(TinyStr::from_far(self.intern(bytes)?))
    }

    /// Interns into a width-`S` [PackedStr], the variant carrying its
    /// length in the handle.
    pub fn packed<const S: usize>(
        &mut self,
        value: impl AsRef<[u8]>,
    ) -> Result<PackedStr<S, T>, InternError> {
        let bytes = value.as_ref();
        let len = Self::convert_len(bytes)?;
        if bytes.len() <= PackedStr::<S, T>::INLINE_CAPACITY {
            return Ok(PackedStr::inline(bytes));
        }
        Ok(PackedStr::from_far(self.intern(bytes)?, len))
    }

    /// Interns into a width-`S` [AnchoredStr], the pointer-tagged
    /// variant.
    pub fn anchored<const S: usize>(
        &mut self,
        value: impl AsRef<[u8]>,
    ) -> Result<AnchoredStr<S, T>, InternError> {
        let bytes = value.as_ref();
        let len = Self::convert_len(bytes)?;
        if bytes.len() <= AnchoredStr::<S, T>::INLINE_CAPACITY {
            return Ok(AnchoredStr::inline(bytes, len));
        }
        Ok(AnchoredStr::from_far(self.intern(bytes)?, len))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InternError {
    /// The string's length exceeds the configured `Size` type.
    LargeString(usize),
    /// The arena or the deduplication index failed to grow.
    AllocError,
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternError::LargeString(size) => {
                write!(f, "string of {size} bytes is too large to intern")
            }
            InternError::AllocError => write!(f, "allocation failed while interning"),
        }
    }
}

impl std::error::Error for InternError {}

impl From<AllocError> for InternError {
    fn from(_: AllocError) -> Self {
        InternError::AllocError
    }
}

impl From<LayoutError> for InternError {
    fn from(_: LayoutError) -> Self {
        InternError::AllocError
    }
}

impl From<TryReserveError> for InternError {
    fn from(_: TryReserveError) -> Self {
        InternError::AllocError
    }
}
