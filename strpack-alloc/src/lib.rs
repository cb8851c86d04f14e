// Copyright 2025-Present strpack contributors.
// SPDX-License-Identifier: Apache-2.0

//! Arena allocators backing permanent string storage.
//!
//! Interned strings are never individually freed, so the natural backing
//! store is a monotonic arena: [LinearAllocator] hands out slices of one
//! fixed region, and [ChainAllocator] links such regions together when
//! more room is needed. Blocks handed out by either allocator never move,
//! which is what makes it sound for callers to hold raw pointers into
//! them for the allocator's whole lifetime.

#![cfg_attr(not(test), no_std)]

mod chain;
mod linear;

pub use chain::*;
pub use linear::*;

// Expose allocator_api2 for our users.
pub use allocator_api2::alloc::*;
