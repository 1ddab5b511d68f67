//! # RawSpinLock
//!
//! The bare mutual-exclusion gate: a single atomic flag with no data attached.
//!
//! [`RawSpinLock`] is the building block the rest of the crate is made of. It
//! protects nothing by itself; callers associate a resource with a lock
//! instance by convention, or use [`SpinLock`](crate::SpinLock) which does the
//! association for them.
//!
//! ## Protocol
//! - **acquire**: load the flag with `Acquire`; only if it reads unlocked,
//!   attempt one CAS unlocked → locked (`Acquire` on success, `Relaxed` on
//!   failure). On any miss, [`relax`](fn@crate::relax) and retry.
//! - **try_acquire**: the same load and CAS, exactly once.
//! - **release**: unconditional `Release` store of unlocked.
//! - **wait**: spin on the `Acquire` load until it reads unlocked, never
//!   touching the flag.
//!
//! Loading before the CAS keeps waiters on a shared cache line while the lock
//! is visibly held instead of hammering it with read-for-ownership traffic.
//!
//! ## Caveats
//! - **Not fair.** Any waiter may win next, including the newest arrival.
//! - **Not reentrant.** Acquiring twice from one thread deadlocks that thread.
//! - **No owner.** [`RawSpinLock::release`] unlocks regardless of who holds the
//!   lock. Prefer [`RawSpinLock::lock`], whose guard releases exactly once.
//!
//! ## Example
//! ```rust
//! use atomic_spinlock::RawSpinLock;
//!
//! static GATE: RawSpinLock = RawSpinLock::new();
//!
//! assert!(GATE.try_acquire());
//! assert!(!GATE.try_acquire());
//! GATE.release();
//!
//! {
//!     let _guard = GATE.lock();
//!     assert!(GATE.is_locked());
//! }
//! assert!(!GATE.is_locked());
//! ```

use core::fmt;

use static_assertions::assert_impl_all;

use crate::relax;
use crate::sync::{
    AtomicBool,
    Ordering::{Acquire, Relaxed, Release},
};

const UNLOCKED: bool = false;
const LOCKED: bool = true;

/// A spin-based mutual exclusion flag.
///
/// Created unlocked. Dropping a `RawSpinLock` forces it back to unlocked; this
/// is a best-effort reset and cannot synchronize with a thread that still
/// believes it holds the lock.
pub struct RawSpinLock {
    state: AtomicBool,
}

assert_impl_all!(RawSpinLock: Send, Sync, Default);
#[cfg(not(loom))]
static_assertions::assert_eq_size!(RawSpinLock, bool);

/// Releases the [`RawSpinLock`] it was obtained from when dropped.
#[must_use = "if unused the lock is released immediately"]
pub struct RawSpinGuard<'a> {
    lock: &'a RawSpinLock,
}

impl RawSpinLock {
    /// Creates a new, unlocked [`RawSpinLock`].
    ///
    /// # Example
    /// ```
    /// use atomic_spinlock::RawSpinLock;
    ///
    /// let lock = RawSpinLock::new();
    /// assert!(!lock.is_locked());
    /// ```
    #[cfg(not(loom))]
    #[inline(always)]
    pub const fn new() -> Self {
        RawSpinLock {
            state: AtomicBool::new(UNLOCKED),
        }
    }

    #[cfg(loom)]
    pub fn new() -> Self {
        RawSpinLock {
            state: AtomicBool::new(UNLOCKED),
        }
    }

    /// Acquires the lock, spinning until this thread wins the CAS.
    ///
    /// There is no bound on the number of attempts and no way to abort.
    /// Between attempts the thread calls [`relax`](fn@crate::relax).
    #[inline]
    pub fn acquire(&self) {
        loop {
            if self.try_acquire() {
                return;
            }
            relax();
        }
    }

    /// Makes a single attempt to acquire the lock.
    ///
    /// Returns `true` if this call took the lock, `false` if it was already
    /// held or another thread won the race for it.
    ///
    /// # Example
    /// ```
    /// use atomic_spinlock::RawSpinLock;
    ///
    /// let lock = RawSpinLock::new();
    /// assert!(lock.try_acquire());
    /// assert!(!lock.try_acquire(), "not reentrant");
    /// ```
    #[inline]
    pub fn try_acquire(&self) -> bool {
        self.state.load(Acquire) == UNLOCKED
            && self
                .state
                .compare_exchange(UNLOCKED, LOCKED, Acquire, Relaxed)
                .is_ok()
    }

    /// Unlocks the lock.
    ///
    /// The store is unconditional: it does not check that the lock is held,
    /// nor that the caller is the one holding it. Releasing a lock someone
    /// else holds silently breaks their critical section.
    #[inline]
    pub fn release(&self) {
        self.state.store(UNLOCKED, Release);
    }

    /// Spins until the lock is observed unlocked, without acquiring it.
    ///
    /// Another thread may take the lock again before the caller acts on the
    /// observation. Use [`acquire`](Self::acquire) when that matters.
    #[inline]
    pub fn wait(&self) {
        while self.state.load(Acquire) == LOCKED {
            relax();
        }
    }

    /// Acquires the lock and returns a guard that releases it on drop.
    #[inline]
    pub fn lock(&self) -> RawSpinGuard<'_> {
        self.acquire();
        RawSpinGuard { lock: self }
    }

    /// Attempts [`try_acquire`](Self::try_acquire), wrapping a success in a
    /// guard.
    #[inline]
    pub fn try_lock(&self) -> Option<RawSpinGuard<'_>> {
        if self.try_acquire() {
            Some(RawSpinGuard { lock: self })
        } else {
            None
        }
    }

    /// Returns whether the lock is held right now.
    ///
    /// The answer may be stale by the time the caller sees it.
    #[inline(always)]
    pub fn is_locked(&self) -> bool {
        self.state.load(Relaxed) == LOCKED
    }
}

impl Default for RawSpinLock {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RawSpinLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSpinLock")
            .field("locked", &self.is_locked())
            .finish()
    }
}

impl Drop for RawSpinLock {
    fn drop(&mut self) {
        #[cfg(feature = "log")]
        if self.is_locked() {
            log::warn!("RawSpinLock at {:p} dropped while held; forcing it unlocked", self);
        }
        self.release();
    }
}

impl Drop for RawSpinGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.lock.release();
    }
}

impl fmt::Debug for RawSpinGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSpinGuard").finish_non_exhaustive()
    }
}
