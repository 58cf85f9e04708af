//! # varena - Bump Arena Allocators over Buffers and Virtual Memory
//!
//! This crate provides two **bump allocators** (also known as arena
//! allocators): one over a caller-supplied fixed buffer, and one over a
//! lazily-committed virtual-memory reservation.
//!
//! ## Overview
//!
//! A bump allocator hands out memory by advancing a single cursor through a
//! pre-existing region; individual allocations are never freed, the whole
//! region is recycled at once:
//!
//! ```text
//!   Bump Allocation Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                        ARENA MEMORY                              │
//!   │                                                                  │
//!   │   ┌─────┬─────┬─────┬─────┬───────────────────────────────────┐  │
//!   │   │ A1  │ A2  │ A3  │ A4  │            Free Space             │  │
//!   │   └─────┴─────┴─────┴─────┴───────────────────────────────────┘  │
//!   │   ▲                       ▲                                   ▲  │
//!   │   │                       │                                   │  │
//!   │ begin                  current                               end │
//!   │                     (bump pointer)                               │
//!   └──────────────────────────────────────────────────────────────────┘
//!
//!   Each allocation "bumps" the cursor forward: O(1) allocation.
//!   reset() rewinds the cursor to begin: O(1) bulk deallocation.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   varena
//!   ├── arith      - Overflow-checked alignment arithmetic
//!   ├── page       - OS page primitives: reserve/commit/release (internal)
//!   ├── buffered   - BufferedArena over a caller-owned block
//!   └── vmem       - VMemArena over reserved, lazily-committed pages
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use varena::VMemArena;
//!
//! // Reserve 4 MiB of address space. No physical memory is used yet.
//! let mut arena = VMemArena::new(4 * 1024 * 1024).expect("reservation failed");
//!
//! // Allocate 100 bytes; the first page is committed on demand.
//! let bytes = arena.alloc_n::<u8>(100).expect("arena exhausted");
//!
//! unsafe {
//!     bytes.write(42);
//!     assert_eq!(bytes.read(), 42);
//! }
//!
//! // Hand the whole range back to the OS in one call.
//! arena.free();
//! ```
//!
//! ## How It Works
//!
//! [`VMemArena`] splits "taking memory from the OS" into the two native
//! virtual-memory steps: *reserving* address space (free) and *committing*
//! pages (physical backing). Reservation happens once, up front, for the
//! whole arena; commits trail the bump pointer one page boundary at a time:
//!
//! ```text
//!   Virtual-Memory Arena:
//!
//!   begin        current      commit                             end
//!   ▼            ▼            ▼                                  ▼
//!   ┌────────────┬────────────┬──────────────────────────────────┐
//!   │ allocated  │ committed  │          reserved only           │
//!   │            │  (spare)   │      (no access, no backing)     │
//!   └────────────┴────────────┴──────────────────────────────────┘
//!
//!   invariant: begin <= current <= commit <= end
//! ```
//!
//! [`BufferedArena`] is the same allocator without the virtual-memory half:
//! the caller brings an already-backed block (stack array, static buffer,
//! heap allocation) and the arena only runs the cursor over it.
//!
//! Every size and address computation on the allocation path is
//! overflow-checked; a request that cannot be represented fails cleanly
//! instead of wrapping around.
//!
//! ## Limitations
//!
//! - **No individual free**: only whole-arena `reset` or whole-arena
//!   release. Freed holes are never reused or coalesced.
//! - **Single-threaded**: no locks, no atomics. An arena has one logical
//!   owner; `&mut self` on every mutating call enforces this within safe
//!   Rust.
//! - **Stale pointers are not detected**: `reset` invalidates previously
//!   returned pointers logically, not mechanically. Dereferencing one after
//!   a reset reads whatever the arena handed out since.
//! - **The last byte is unreachable**: an allocation whose end would land
//!   exactly on `end` is rejected (strict `<` bound), so one byte of every
//!   arena is slack. Kept for compatibility with the reference behavior.
//!
//! ## Safety
//!
//! The allocators return raw [`NonNull<u8>`](std::ptr::NonNull) pointers;
//! reading or writing through them is `unsafe` and subject to the usual
//! aliasing and lifetime obligations. The arenas themselves uphold that
//! every returned pointer is non-null, correctly aligned, and backed by
//! readable/writable memory until the next `reset`, `free`, or drop.

pub mod arith;
mod buffered;
mod page;
mod vmem;

pub use buffered::BufferedArena;
pub use vmem::{ReserveError, VMemArena};
