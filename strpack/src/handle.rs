// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

use crate::traits::StringTraits;
use core::cmp::Ordering;

pub(crate) const WORD: usize = core::mem::size_of::<usize>();

/// Common read surface of every string handle.
///
/// A handle is either "small", holding its bytes inline, or "far",
/// pointing at interned storage; [Self::as_ptr] and [Self::len] resolve
/// either case to one contiguous byte view.
pub trait StrHandle {
    type Traits: StringTraits;

    /// Pointer to the first byte, inline or interned.
    fn as_ptr(&self) -> *const u8;

    /// Length in bytes, excluding the NUL terminator.
    fn len(&self) -> usize;

    /// Whether the bytes live inline in the handle itself.
    fn is_small(&self) -> bool;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        // SAFETY: as_ptr and len describe one live byte region, either
        // the handle's own buffer or interned storage that outlives it.
        unsafe { core::slice::from_raw_parts(self.as_ptr(), self.len()) }
    }
}

/// Content equality across any two handle representations sharing a
/// traits type. This always compares bytes; the pointer-identity
/// shortcut only applies to far/far comparison through `==`.
pub fn eq<A, B>(a: &A, b: &B) -> bool
where
    A: StrHandle,
    B: StrHandle<Traits = A::Traits>,
{
    a.len() == b.len() && <A::Traits as StringTraits>::cmp(a.as_bytes(), b.as_bytes()).is_eq()
}

/// Lexicographic-style ordering across handle representations: the
/// common prefix is compared with the configured comparator, and only a
/// fully equal prefix falls back to comparing lengths.
pub fn compare<A, B>(a: &A, b: &B) -> Ordering
where
    A: StrHandle,
    B: StrHandle<Traits = A::Traits>,
{
    let n = a.len().min(b.len());
    match <A::Traits as StringTraits>::cmp(&a.as_bytes()[..n], &b.as_bytes()[..n]) {
        Ordering::Equal => a.len().cmp(&b.len()),
        different => different,
    }
}

pub(crate) fn eq_bytes<H: StrHandle>(a: &H, b: &[u8]) -> bool {
    a.len() == b.len() && <H::Traits as StringTraits>::cmp(a.as_bytes(), b).is_eq()
}

/// Derives the byte-content operator surface of a handle type: Debug,
/// Hash, ordering, and comparisons against plain byte and str slices.
/// `Hash` matches content equality, so mixed handle types can share a
/// map key space.
macro_rules! impl_bytes_ops {
    (impl[$($generics:tt)*] $ty:ty) => {
        impl<$($generics)*> core::fmt::Debug for $ty {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(
                    f,
                    "\"{}\"",
                    $crate::handle::StrHandle::as_bytes(self).escape_ascii()
                )
            }
        }

        impl<$($generics)*> core::hash::Hash for $ty {
            fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
                core::hash::Hash::hash($crate::handle::StrHandle::as_bytes(self), state)
            }
        }

        impl<$($generics)*> core::cmp::PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
                Some(core::cmp::Ord::cmp(self, other))
            }
        }

        impl<$($generics)*> core::cmp::Ord for $ty {
            fn cmp(&self, other: &Self) -> core::cmp::Ordering {
                $crate::handle::compare(self, other)
            }
        }

        impl<$($generics)*> core::cmp::PartialEq<[u8]> for $ty {
            fn eq(&self, other: &[u8]) -> bool {
                $crate::handle::eq_bytes(self, other)
            }
        }

        impl<$($generics)*> core::cmp::PartialEq<&[u8]> for $ty {
            fn eq(&self, other: &&[u8]) -> bool {
                $crate::handle::eq_bytes(self, other)
            }
        }

        impl<$($generics)*> core::cmp::PartialEq<str> for $ty {
            fn eq(&self, other: &str) -> bool {
                $crate::handle::eq_bytes(self, other.as_bytes())
            }
        }

        impl<$($generics)*> core::cmp::PartialEq<&str> for $ty {
            fn eq(&self, other: &&str) -> bool {
                $crate::handle::eq_bytes(self, other.as_bytes())
            }
        }
    };
}

pub(crate) use impl_bytes_ops;
