//! [`lock_api`] integration.
//!
//! Implements [`lock_api::RawMutex`] for [`RawSpinLock`], so the lock plugs
//! into the `lock_api` ecosystem: mapped guards, `ArcMutexGuard`, and code
//! generic over any `RawMutex`.
//!
//! ```rust
//! use atomic_spinlock::mutex::{Mutex, MutexGuard};
//!
//! static LOG: Mutex<Vec<&str>> = Mutex::new(Vec::new());
//!
//! LOG.lock().push("boot");
//! let first = MutexGuard::map(LOG.lock(), |v| &mut v[0]);
//! assert_eq!(*first, "boot");
//! ```

use lock_api::GuardSend;

use crate::RawSpinLock;

/// A [`lock_api::Mutex`] backed by [`RawSpinLock`].
pub type Mutex<T> = lock_api::Mutex<RawSpinLock, T>;

/// The guard returned by [`Mutex::lock`].
pub type MutexGuard<'a, T> = lock_api::MutexGuard<'a, RawSpinLock, T>;

/// A guard narrowed to a part of the protected data by [`MutexGuard::map`].
pub type MappedMutexGuard<'a, T> = lock_api::MappedMutexGuard<'a, RawSpinLock, T>;

// Safety: `try_acquire` only succeeds for one caller until `release`, and the
// Acquire/Release pair orders the critical sections.
unsafe impl lock_api::RawMutex for RawSpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: RawSpinLock = RawSpinLock::new();

    type GuardMarker = GuardSend;

    #[inline]
    fn lock(&self) {
        self.acquire();
    }

    #[inline]
    fn try_lock(&self) -> bool {
        self.try_acquire()
    }

    #[inline]
    unsafe fn unlock(&self) {
        self.release();
    }

    #[inline]
    fn is_locked(&self) -> bool {
        RawSpinLock::is_locked(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_unlocked() {
        let raw = <RawSpinLock as lock_api::RawMutex>::INIT;
        assert!(!lock_api::RawMutex::is_locked(&raw));
    }

    #[test]
    fn test_mutex_guard_roundtrip() {
        let mutex = Mutex::new(1u32);
        {
            let mut guard = mutex.lock();
            *guard += 1;
            assert!(mutex.try_lock().is_none());
        }
        assert!(!mutex.is_locked());
        assert_eq!(*mutex.lock(), 2);
    }

    #[test]
    fn test_mapped_guard_releases() {
        let mutex = Mutex::new((0u8, String::from("x")));
        {
            let mut name: MappedMutexGuard<'_, String> = MutexGuard::map(mutex.lock(), |p| &mut p.1);
            name.push('y');
        }
        assert_eq!(mutex.lock().1, "xy");
    }

    #[test]
    fn test_raw_trait_and_inherent_agree() {
        let raw = RawSpinLock::new();
        assert!(lock_api::RawMutex::try_lock(&raw));
        assert!(raw.is_locked());
        assert!(!raw.try_acquire());
        unsafe { lock_api::RawMutex::unlock(&raw) };
        assert!(!raw.is_locked());
    }
}
