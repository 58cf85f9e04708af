/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two. Returns `None` when the intermediate
/// addition `value + (align - 1)` would wrap around; in that case the
/// rounding was not performed and no result exists to use.
///
/// Overflow-prone size and address math everywhere else in the crate is
/// covered by [`usize::checked_add`] and [`usize::checked_mul`]; this is
/// the one operation the standard library does not provide checked.
///
/// # Examples
///
/// ```rust
/// use varena::arith::align_up;
///
/// assert_eq!(align_up(13, 8), Some(16));
/// assert_eq!(align_up(16, 8), Some(16));
/// assert_eq!(align_up(0, 4096), Some(0));
/// assert_eq!(align_up(usize::MAX, 8), None);
/// ```
pub fn align_up(
  value: usize,
  align: usize,
) -> Option<usize> {
  debug_assert!(align.is_power_of_two());

  let mask = align - 1;
  Some(value.checked_add(mask)? & !mask)
}
