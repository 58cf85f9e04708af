use std::{alloc::Layout, ptr::NonNull};

use crate::arith;

/// Bump allocator over a caller-supplied, fully-backed block of memory.
///
/// The arena never owns the block: the caller keeps the buffer alive (and
/// otherwise untouched) for as long as the arena or any pointer it returned
/// is in use. There is nothing to release; dropping the arena only discards
/// the cursor.
///
/// Addresses are tracked as `usize` so that every step of the allocation
/// arithmetic is overflow-checked; a raw pointer is only rebuilt from the
/// block base at the moment an allocation is handed out.
pub struct BufferedArena {
  base: NonNull<u8>,
  begin: usize,
  end: usize,
  current: usize,
}

impl BufferedArena {
  /// Binds a new arena to `[start, start + size)`.
  ///
  /// # Safety
  ///
  /// `[start, start + size)` must be a single readable and writable
  /// allocation that outlives every use of the arena and of every pointer
  /// the arena returns, and `start + size` must not wrap around the
  /// address space.
  pub unsafe fn new(
    start: NonNull<u8>,
    size: usize,
  ) -> Self {
    let begin = start.as_ptr() as usize;

    Self {
      base: start,
      begin,
      end: begin + size,
      current: begin,
    }
  }

  /// Allocates `size` bytes aligned to `align` (a power of two).
  ///
  /// Returns `None` — leaving the arena untouched — when the arithmetic
  /// would overflow or the block has insufficient space left. The two
  /// causes are not distinguished; callers that care must pre-check
  /// `size` against [`capacity`](Self::capacity) minus
  /// [`used`](Self::used).
  pub fn alloc_bytes(
    &mut self,
    size: usize,
    align: usize,
  ) -> Option<NonNull<u8>> {
    let alloc_start = arith::align_up(self.current, align)?;
    let current = alloc_start.checked_add(size)?;

    // Strict bound: an allocation ending exactly on `end` is rejected.
    if current >= self.end {
      return None;
    }

    self.current = current;

    // begin <= alloc_start <= current < end, so the offset stays inside
    // the block the caller vouched for in `new`.
    Some(unsafe { self.base.add(alloc_start - self.begin) })
  }

  /// Allocates `count` times `size` bytes aligned to `align`.
  ///
  /// The multiplication is overflow-checked; on overflow the arena is
  /// untouched and `None` is returned.
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

  /// Rewinds the bump pointer to the start of the block.
  ///
  /// Memory contents are not cleared and nothing is reclaimed; every
  /// pointer previously returned by this arena is logically stale and may
  /// be silently overwritten by later allocations.
  pub fn reset(&mut self) {
    self.current = self.begin;
  }

  /// Size of the backing block in bytes.
  pub fn capacity(&self) -> usize {
    self.end - self.begin
  }

  /// Bytes consumed since creation or the last [`reset`](Self::reset).
  pub fn used(&self) -> usize {
    self.current - self.begin
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // Test buffers need a known alignment so that tests can predict the
  // exact addresses the arena returns.
  #[repr(C, align(16))]
  struct Buf<const N: usize>([u8; N]);

  impl<const N: usize> Buf<N> {
    fn new() -> Self {
      Self([0; N])
    }

    fn arena(&mut self) -> BufferedArena {
      unsafe { BufferedArena::new(NonNull::new(self.0.as_mut_ptr()).unwrap(), N) }
    }
  }

  #[test]
  fn test_second_allocation_failure_leaves_cursor() {
    let mut buf = Buf::<64>::new();
    let mut arena = buf.arena();

    let first = arena.alloc_bytes(32, 8).unwrap();
    assert_eq!(first.as_ptr(), buf.0.as_mut_ptr());
    assert_eq!(arena.used(), 32);

    // 32 + 40 = 72 > 64.
    assert!(arena.alloc_bytes(40, 8).is_none());
    assert_eq!(arena.used(), 32);
  }

  #[test]
  fn test_allocations_are_aligned_ordered_and_disjoint() {
    let mut buf = Buf::<256>::new();
    let mut arena = buf.arena();

    let mut previous_end = buf.0.as_mut_ptr() as usize;

    for (size, align) in [(1, 1), (3, 8), (17, 2), (8, 16), (1, 64)] {
      let start = arena.alloc_bytes(size, align).unwrap().as_ptr() as usize;

      assert_eq!(start % align, 0);
      assert!(start >= previous_end);

      previous_end = start + size;
    }
  }

  #[test]
  fn test_allocation_ending_on_end_is_rejected() {
    let mut buf = Buf::<64>::new();
    let mut arena = buf.arena();

    // Ending exactly on `end` fails; one byte short succeeds.
    assert!(arena.alloc_bytes(64, 1).is_none());
    assert_eq!(arena.used(), 0);

    assert!(arena.alloc_bytes(63, 1).is_some());
    assert_eq!(arena.used(), 63);
  }

  #[test]
  fn test_reset_rewinds_and_is_idempotent() {
    let mut buf = Buf::<64>::new();
    let mut arena = buf.arena();

    let first = arena.alloc_bytes(16, 8).unwrap();

    arena.reset();
    assert_eq!(arena.used(), 0);

    arena.reset();
    assert_eq!(arena.used(), 0);

    // The next allocation reuses the block from the start.
    let second = arena.alloc_bytes(16, 8).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn test_overflowing_count_is_rejected() {
    let mut buf = Buf::<64>::new();
    let mut arena = buf.arena();

    assert!(arena.alloc_bytes_n(usize::MAX / 2, 1, 3).is_none());
    assert_eq!(arena.used(), 0);
  }

  #[test]
  fn test_typed_allocations_are_usable() {
    let mut buf = Buf::<64>::new();
    let mut arena = buf.arena();

    unsafe {
      let value = arena.alloc::<u64>().unwrap();
      value.write(0x1122334455667788);

      let slots = arena.alloc_n::<u16>(6).unwrap();
      for i in 0..6 {
        slots.add(i).write(i as u16);
      }

      assert_eq!(value.read(), 0x1122334455667788);
      for i in 0..6 {
        assert_eq!(slots.add(i).read(), i as u16);
      }
    }
  }

  #[test]
  fn test_zero_sized_allocation_succeeds() {
    let mut buf = Buf::<64>::new();
    let mut arena = buf.arena();

    let first = arena.alloc_bytes(0, 8).unwrap();
    let second = arena.alloc_bytes(0, 8).unwrap();

    assert_eq!(first, second);
    assert_eq!(arena.used(), 0);
  }

  #[cfg(not(miri))]
  mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
      #[test]
      fn returned_pointers_are_multiples_of_align(
        requests in proptest::collection::vec((0usize..48, 0u32..5), 1..24),
      ) {
        let mut buf = Buf::<1024>::new();
        let mut arena = buf.arena();

        for (size, shift) in requests {
          let align = 1usize << shift;

          if let Some(start) = arena.alloc_bytes(size, align) {
            prop_assert_eq!(start.as_ptr() as usize % align, 0);
          }
        }
      }

      #[test]
      fn regions_are_disjoint_and_in_call_order(
        requests in proptest::collection::vec((1usize..48, 0u32..5), 1..24),
      ) {
        let mut buf = Buf::<1024>::new();
        let mut arena = buf.arena();

        let mut previous_end = buf.0.as_mut_ptr() as usize;
        let mut previous_used = 0;

        for (size, shift) in requests {
          let align = 1usize << shift;

          if let Some(start) = arena.alloc_bytes(size, align) {
            let start = start.as_ptr() as usize;

            prop_assert!(start >= previous_end);
            previous_end = start + size;
          }

          // The cursor never moves backwards, failed or not.
          prop_assert!(arena.used() >= previous_used);
          previous_used = arena.used();
        }
      }
    }
  }
}
