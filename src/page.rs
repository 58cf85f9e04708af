use std::ptr::NonNull;

#[cfg(unix)]
mod sys {
  use std::ptr;

  use libc::{
    _SC_PAGESIZE, MAP_ANON, MAP_FAILED, MAP_PRIVATE, PROT_NONE, PROT_READ, PROT_WRITE, c_void,
    mmap, mprotect, munmap, sysconf,
  };

  pub fn page_size() -> usize {
    let size = unsafe { sysconf(_SC_PAGESIZE) };

    if size < 1 {
      log::warn!("sysconf(_SC_PAGESIZE) failed, assuming 4096-byte pages");
      return 4096;
    }

    size as usize
  }

  pub fn reserve(size: usize) -> *mut u8 {
    let start = unsafe { mmap(ptr::null_mut(), size, PROT_NONE, MAP_PRIVATE | MAP_ANON, -1, 0) };

    if start == MAP_FAILED {
      return ptr::null_mut();
    }

    start as *mut u8
  }

  pub unsafe fn commit(
    start: *mut u8,
    size: usize,
  ) -> bool {
    unsafe { mprotect(start as *mut c_void, size, PROT_READ | PROT_WRITE) == 0 }
  }

  pub unsafe fn release(
    start: *mut u8,
    size: usize,
  ) {
    unsafe {
      munmap(start as *mut c_void, size);
    }
  }
}

#[cfg(windows)]
mod sys {
  use std::{ffi::c_void, mem, ptr};

  use windows_sys::Win32::System::Memory::{
    MEM_COMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_NOACCESS, PAGE_READWRITE, VirtualAlloc, VirtualFree,
  };
  use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

  pub fn page_size() -> usize {
    let mut info: SYSTEM_INFO = unsafe { mem::zeroed() };

    unsafe { GetSystemInfo(&mut info) };

    info.dwPageSize as usize
  }

  pub fn reserve(size: usize) -> *mut u8 {
    unsafe { VirtualAlloc(ptr::null(), size, MEM_RESERVE, PAGE_NOACCESS) as *mut u8 }
  }

  pub unsafe fn commit(
    start: *mut u8,
    size: usize,
  ) -> bool {
    !unsafe { VirtualAlloc(start as *const c_void, size, MEM_COMMIT, PAGE_READWRITE) }.is_null()
  }

  pub unsafe fn release(
    start: *mut u8,
    _size: usize,
  ) {
    // Releasing a whole reservation requires a size of zero on Windows.
    unsafe { VirtualFree(start as *mut c_void, 0, MEM_RELEASE) };
  }
}

/// Native page granularity in bytes. Always a power of two.
pub fn page_size() -> usize {
  sys::page_size()
}

/// Reserves `size` bytes of address space with no access rights and no
/// physical backing. `size` must be a page-size multiple. Returns `None`
/// when the OS refuses (address-space exhaustion, resource limits).
pub fn reserve(size: usize) -> Option<NonNull<u8>> {
  let start = NonNull::new(sys::reserve(size))?;

  log::trace!("reserved {size} bytes of address space at {start:p}");

  Some(start)
}

/// Grants read/write access and physical backing to `[start, start + size)`.
/// Idempotent on sub-ranges that are already committed.
///
/// # Safety
///
/// `[start, start + size)` must lie within a single range previously
/// returned by [`reserve`], with `start` and `size` page-aligned.
pub unsafe fn commit(
  start: NonNull<u8>,
  size: usize,
) -> bool {
  let ok = unsafe { sys::commit(start.as_ptr(), size) };

  if ok {
    log::trace!("committed {size} bytes at {start:p}");
  } else {
    log::debug!("commit of {size} bytes at {start:p} failed");
  }

  ok
}

/// Returns an entire reserved range to the OS. Every address in the range
/// becomes invalid.
///
/// # Safety
///
/// `start` and `size` must describe exactly one full range previously
/// returned by [`reserve`], not a sub-range, and the range must not be
/// released twice.
pub unsafe fn release(
  start: NonNull<u8>,
  size: usize,
) {
  log::trace!("releasing {size} bytes at {start:p}");

  unsafe { sys::release(start.as_ptr(), size) };
}
