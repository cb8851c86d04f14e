// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

//! String interning with small-string handles.
//!
//! An [Interner] stores each unique byte string once, in arena memory
//! that never moves, and hands out compact handles:
//!
//! * [FarStr]: one pointer wide, always referring to interned storage.
//!   The string's length lives in a header in front of the bytes.
//! * [TinyStr]: one machine word that holds strings of up to
//!   `word - 1` bytes inline and falls back to a tagged [FarStr]
//!   pointer beyond that.
//! * [PackedStr]: a configurable `S`-byte handle, inline up to `S - 1`
//!   bytes, with the length of far strings carried in the handle's
//!   tail.
//! * [AnchoredStr]: a configurable `S`-byte handle with an explicit
//!   pointer field; smaller inline capacity, but uniform length access
//!   and no bit tricks on the pointer.
//!
//! Every stored string is NUL-terminated in memory, so far pointers can
//! be passed to C APIs, while lengths stay explicit and strings may
//! contain interior zero bytes.
//!
//! ```
//! use strpack::{Interner, TinyStr};
//!
//! let mut interner = Interner::new();
//! let a = interner.intern("a longer string, interned once").unwrap();
//! let b = interner.intern("a longer string, interned once").unwrap();
//! assert_eq!(a.as_ptr(), b.as_ptr());
//!
//! let small: TinyStr = interner.tiny("hi").unwrap();
//! assert!(small.is_small());
//! assert_eq!(small, "hi");
//! ```
//!
//! The [StringTraits] parameter configures the stored length width, the
//! comparison primitive, and whether far handles compare by pointer;
//! [DefaultTraits] picks 32-bit lengths with pointer equality.

mod anchored;
mod far;
mod handle;
mod interner;
mod metadata;
mod packed;
mod tiny;
mod traits;

pub use anchored::AnchoredStr;
pub use far::FarStr;
pub use handle::{compare, eq, StrHandle};
pub use interner::{InternError, Interner};
pub use packed::PackedStr;
pub use tiny::TinyStr;
pub use traits::{DefaultTraits, Length, StringTraits};

pub use strpack_alloc as alloc;
