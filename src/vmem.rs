use std::{alloc::Layout, error, fmt, ptr::NonNull};

use crate::{arith, page};

/// Error returned when a [`VMemArena`] cannot be created: the requested
/// size overflowed when rounded up to the page size, or the OS refused
/// the address-space reservation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReserveError;

impl fmt::Display for ReserveError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str("could not reserve address space for the arena")
  }
}

impl error::Error for ReserveError {}

/// Bump allocator over a reserved address range with lazily committed
/// physical backing.
///
/// On creation the arena reserves a large range of address space that has
/// no access rights and costs no physical memory. As allocations push the
/// bump pointer forward, pages are committed (made readable, writable and
/// physically backed) just in time, one syscall per frontier advance:
///
/// ```text
///   begin          current     commit                             end
///   ▼              ▼           ▼                                  ▼
///   ┌──────────────┬───────────┬──────────────────────────────────┐
///   │  allocated   │ committed │         reserved only            │
///   │              │  (spare)  │     (PROT_NONE / NOACCESS)       │
///   └──────────────┴───────────┴──────────────────────────────────┘
/// ```
///
/// [`reset`](Self::reset) rewinds `current` without giving pages back, so
/// a workload that repeatedly resets and refills up to the same high-water
/// mark pays for commits only once.
///
/// The arena owns its range exclusively and returns it to the OS in one
/// call when dropped (or via the explicit [`free`](Self::free)).
pub struct VMemArena {
  base: NonNull<u8>,
  begin: usize,
  end: usize,
  current: usize,
  commit: usize,
}

impl VMemArena {
  /// Reserves an arena of at least `size` bytes, rounded up to the native
  /// page size.
  ///
  /// No physical memory is consumed yet. Fails when the rounding overflows
  /// or the OS cannot reserve the range.
  pub fn new(size: usize) -> Result<Self, ReserveError> {
    let size = arith::align_up(size, page::page_size()).ok_or(ReserveError)?;
    let base = page::reserve(size).ok_or(ReserveError)?;
    let begin = base.as_ptr() as usize;

    log::debug!("vmem arena reserved {size} bytes at {base:p}");

    Ok(Self {
      base,
      begin,
      end: begin + size,
      current: begin,
      commit: begin,
    })
  }

  /// Allocates `size` bytes aligned to `align` (a power of two),
  /// committing further pages if the allocation crosses the committed
  /// frontier.
  ///
  /// Returns `None` — with `current` and the frontier untouched — on
  /// arithmetic overflow, on insufficient reserved space, or when the OS
  /// refuses to commit. Backing growth is all-or-nothing: a failed commit
  /// never advances any state.
  pub fn alloc_bytes(
    &mut self,
    size: usize,
    align: usize,
  ) -> Option<NonNull<u8>> {
    let alloc_start = arith::align_up(self.current, align)?;
    let current = alloc_start.checked_add(size)?;

    // Strict bound, as in `BufferedArena`: ending exactly on `end` fails.
    if current >= self.end {
      return None;
    }

    if current > self.commit {
      // Commit up to the page boundary past the new bump pointer. Since
      // `end` is page-aligned and `current < end`, the new frontier never
      // passes `end`.
      let commit = arith::align_up(current, page::page_size())?;
      let frontier = unsafe { self.base.add(self.commit - self.begin) };

      if !unsafe { page::commit(frontier, commit - self.commit) } {
        return None;
      }

      self.commit = commit;
    }

    self.current = current;

    Some(unsafe { self.base.add(alloc_start - self.begin) })
  }

  /// Allocates `count` times `size` bytes aligned to `align`, with the
  /// multiplication overflow-checked.
  pub fn alloc_bytes_n(
    &mut self,
    size: usize,
    align: usize,
    count: usize,
  ) -> Option<NonNull<u8>> {
    self.alloc_bytes(size.checked_mul(count)?, align)
  }

  /// Allocates space for a single `T`.
  pub fn alloc<T>(&mut self) -> Option<NonNull<T>> {
    let layout = Layout::new::<T>();

    Some(self.alloc_bytes(layout.size(), layout.align())?.cast())
  }

  /// Allocates space for `count` contiguous `T`s.
  pub fn alloc_n<T>(
    &mut self,
    count: usize,
  ) -> Option<NonNull<T>> {
    let layout = Layout::new::<T>();

    Some(self.alloc_bytes_n(layout.size(), layout.align(), count)?.cast())
  }

  /// Rewinds the bump pointer to the start of the range.
  ///
  /// Committed pages are kept committed: refilling up to the previous
  /// high-water mark incurs no further syscalls, at the price of holding
  /// on to the physical memory. Previously returned pointers are stale and
  /// may be silently overwritten by later allocations.
  pub fn reset(&mut self) {
    self.current = self.begin;
  }

  /// Returns the entire reserved range to the OS.
  ///
  /// Consuming the arena makes further allocation impossible, but the
  /// borrow checker cannot see the raw pointers the arena handed out:
  /// using any of them after this call is undefined behavior. Dropping the
  /// arena has the same effect; `free` only makes the release visible at
  /// the call site.
  pub fn free(self) {}

  /// Size of the reserved range in bytes. A page-size multiple.
  pub fn capacity(&self) -> usize {
    self.end - self.begin
  }

  /// Bytes consumed since creation or the last [`reset`](Self::reset).
  pub fn used(&self) -> usize {
    self.current - self.begin
  }

  /// Bytes of the range that are physically backed. A page-size multiple;
  /// never decreases during the arena's lifetime.
  pub fn committed(&self) -> usize {
    self.commit - self.begin
  }
}

impl Drop for VMemArena {
  fn drop(&mut self) {
    unsafe { page::release(self.base, self.end - self.begin) };
  }
}
