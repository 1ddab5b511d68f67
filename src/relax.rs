//! # Relax
//!
//! The scheduling hint issued between spin attempts.
//!
//! Every busy loop in this crate calls [`relax`] once per failed iteration.
//! Which hint it issues depends on how the crate was built:
//!
//! - **`std`**: [`std::thread::yield_now`], giving the scheduler a chance to
//!   run the thread that currently holds the lock.
//! - **`no_std`**: [`core::hint::spin_loop`], a CPU pause instruction.
//! - **`--cfg loom`**: `loom::thread::yield_now`, which the model checker
//!   needs to make progress through spin loops.
//!
//! None of these block the thread at the OS level.

/// Offers the scheduler (or the CPU) a chance to do other work.
///
/// # Examples
/// ```
/// use core::sync::atomic::{AtomicBool, Ordering};
/// use atomic_spinlock::relax;
///
/// let ready = AtomicBool::new(true);
/// while !ready.load(Ordering::Acquire) {
///     relax();
/// }
/// ```
#[inline]
pub fn relax() {
    #[cfg(loom)]
    loom::thread::yield_now();

    #[cfg(all(not(loom), feature = "std"))]
    std::thread::yield_now();

    #[cfg(all(not(loom), not(feature = "std")))]
    core::hint::spin_loop();
}
