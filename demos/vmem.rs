use std::io::Read;

use varena::VMemArena;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect the process mappings with tools like
/// `pmap`, `htop`, or `/proc/<pid>/smaps` and watch the reserved range gain
/// committed pages as the arena grows.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_arena_state(
  label: &str,
  arena: &VMemArena,
) {
  println!(
    "[{}] PID = {}, capacity = {} bytes, used = {} bytes, committed = {} bytes",
    label,
    std::process::id(),
    arena.capacity(),
    arena.used(),
    arena.committed(),
  );
}

fn main() {
  // --------------------------------------------------------------------
  // 1) Reserve a 4 MiB arena.
  //    Only address space is claimed: `pmap` shows the whole range with
  //    no access rights and the committed counter reads zero.
  // --------------------------------------------------------------------
  let mut arena = match VMemArena::new(4 * 1024 * 1024) {
    Ok(arena) => arena,
    Err(err) => {
      eprintln!("couldn't reserve memory for the arena: {err}");
      std::process::exit(1);
    }
  };

  println!("[1] Reserved a 4 MiB arena");
  print_arena_state("after reserve", &arena);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Allocate a 100-byte character buffer and write a string into it.
  //    Crossing into unbacked territory commits the first page.
  // --------------------------------------------------------------------
  let Some(buffer) = arena.alloc_n::<u8>(100) else {
    eprintln!("allocation failure");
    std::process::exit(1);
  };

  let message = b"The cake is a lie!";

  unsafe {
    std::ptr::copy_nonoverlapping(message.as_ptr(), buffer.as_ptr(), message.len());
    buffer.add(message.len()).write(0);

    let text = std::str::from_utf8(std::slice::from_raw_parts(buffer.as_ptr(), message.len()));
    println!("\n[2] Wrote and read back: {}", text.unwrap());
  }

  print_arena_state("after first alloc", &arena);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Allocate past the first page to watch the commit frontier move
  //    one page boundary at a time.
  // --------------------------------------------------------------------
  let Some(big) = arena.alloc_n::<u64>(1024) else {
    eprintln!("allocation failure");
    std::process::exit(1);
  };

  unsafe {
    for i in 0..1024 {
      big.add(i).write(i as u64);
    }
  }

  println!("\n[3] Allocated and filled [u64; 1024]");
  print_arena_state("after large alloc", &arena);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Reset the arena. The cursor rewinds, the committed pages stay:
  //    refilling up to the same high-water mark costs no syscalls.
  // --------------------------------------------------------------------
  arena.reset();
  println!("\n[4] Reset the arena");
  print_arena_state("after reset", &arena);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Release the whole range back to the OS in a single call. Every
  //    pointer the arena ever returned is now invalid.
  // --------------------------------------------------------------------
  arena.free();
  println!("\n[5] Freed the arena. The reservation is gone from the mappings.");
}
