//! # SpinLock
//!
//! A `no_std`-compatible spinlock that owns the data it protects.
//!
//! [`SpinLock<T>`] pairs a [`RawSpinLock`] with a `T` and only hands out access
//! through a [`SpinGuard`], so every acquisition is matched by exactly one
//! release when the guard goes out of scope.
//!
//! ## Features
//! - ✅ `no_std` compatible, `const` constructor usable in `static`s
//! - ✅ Read-before-CAS acquisition with cooperative yielding
//! - ✅ `try_lock`, `wait` and `with_lock()` for scoped access
//!
//! ## Safety
//! - The `SpinLock` is **not fair**: starvation is possible under heavy contention.
//! - It is **not reentrant**: locking it twice on one thread never returns.
//! - It should **not** be held across system calls or long-running operations.
//!
//! ## Example
//! ```rust
//! use atomic_spinlock::SpinLock;
//!
//! static COUNTER: SpinLock<u32> = SpinLock::new(0);
//!
//! fn increment() {
//!     let mut guard = COUNTER.lock();
//!     *guard += 1;
//! }
//!
//! fn read_value() -> u32 {
//!     *COUNTER.lock()
//! }
//!
//! fn main() {
//!     increment();
//!     assert_eq!(read_value(), 1);
//! }
//! ```

use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use static_assertions::{assert_impl_all, assert_not_impl_any};

use crate::RawSpinLock;

/// A spin-based mutual exclusion primitive guarding a value of type `T`.
///
/// See the [module-level documentation](self) for examples and caveats.
pub struct SpinLock<T: ?Sized> {
    raw: RawSpinLock,
    data: UnsafeCell<T>,
}

/// A guard that releases the [`SpinLock`] when dropped.
///
/// This is returned from [`SpinLock::lock`] and implements [`Deref`] and
/// [`DerefMut`] to access the underlying data.
#[must_use = "if unused the SpinLock is released immediately"]
pub struct SpinGuard<'a, T: ?Sized> {
    lock: &'a SpinLock<T>,
    // Shared guards hand out `&T`, so the guard is only `Sync` when `T` is.
    _marker: PhantomData<&'a mut T>,
}

// Safety: SpinLock enforces mutual exclusion via atomic operations.
unsafe impl<T: ?Sized + Send> Send for SpinLock<T> {}
unsafe impl<T: ?Sized + Send> Sync for SpinLock<T> {}

assert_impl_all!(SpinLock<core::cell::Cell<u8>>: Send, Sync);
assert_impl_all!(SpinGuard<'static, u8>: Send, Sync);
assert_not_impl_any!(SpinGuard<'static, core::cell::Cell<u8>>: Sync);

impl<T> SpinLock<T> {
    /// Creates a new, unlocked [`SpinLock`] wrapping the given data.
    ///
    /// # Example
    /// ```
    /// use atomic_spinlock::SpinLock;
    ///
    /// let lock = SpinLock::new(123);
    /// assert_eq!(*lock.lock(), 123);
    /// ```
    #[cfg(not(loom))]
    #[inline(always)]
    pub const fn new(data: T) -> Self {
        SpinLock {
            raw: RawSpinLock::new(),
            data: UnsafeCell::new(data),
        }
    }

    #[cfg(loom)]
    pub fn new(data: T) -> Self {
        SpinLock {
            raw: RawSpinLock::new(),
            data: UnsafeCell::new(data),
        }
    }

    /// Consumes the lock and returns the protected value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> SpinLock<T> {
    /// Acquires the lock, spinning until it becomes available.
    ///
    /// Returns a [`SpinGuard`] which automatically releases the lock on drop.
    #[inline]
    pub fn lock(&self) -> SpinGuard<'_, T> {
        self.raw.acquire();
        SpinGuard::new(self)
    }

    /// Attempts to acquire the lock without blocking.
    ///
    /// Returns `Some(SpinGuard)` if the lock was free, or `None` otherwise.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinGuard<'_, T>> {
        if self.raw.try_acquire() {
            Some(SpinGuard::new(self))
        } else {
            None
        }
    }

    /// Checks whether the lock is currently held.
    #[inline(always)]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Spins until the lock is observed free, without taking it.
    ///
    /// The lock may be taken again by the time this returns.
    #[inline]
    pub fn wait(&self) {
        self.raw.wait();
    }

    /// Runs a closure with exclusive access to the data.
    ///
    /// This is a convenience wrapper around [`lock()`](Self::lock) that
    /// automatically releases the lock when the closure returns.
    ///
    /// # Example
    /// ```
    /// use atomic_spinlock::SpinLock;
    /// let lock = SpinLock::new(0i32);
    /// let doubled = lock.with_lock(|data| {
    ///     *data += 1;
    ///     *data * 2
    /// });
    /// assert_eq!(doubled, 2);
    /// ```
    #[inline]
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    /// Returns a mutable reference to the data.
    ///
    /// No locking is needed: `&mut self` already proves exclusive access.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Forcibly releases the lock, whoever holds it.
    ///
    /// # Safety
    /// - Only call this if no live [`SpinGuard`] for this lock exists, e.g. one
    ///   was leaked with [`core::mem::forget`].
    /// - Misuse lets two threads reach the data at once.
    #[inline]
    pub unsafe fn force_unlock(&self) {
        self.raw.release();
    }
}

impl<T: Default> Default for SpinLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for SpinLock<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SpinLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("SpinLock");
        match self.try_lock() {
            Some(guard) => d.field("data", &&*guard),
            None => d.field("data", &format_args!("<locked>")),
        };
        d.finish_non_exhaustive()
    }
}

impl<'a, T: ?Sized> SpinGuard<'a, T> {
    #[inline(always)]
    fn new(lock: &'a SpinLock<T>) -> Self {
        SpinGuard {
            lock,
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> Drop for SpinGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        self.lock.raw.release();
    }
}

impl<T: ?Sized> Deref for SpinGuard<'_, T> {
    type Target = T;
    #[inline(always)]
    fn deref(&self) -> &T {
        unsafe { &*(self.lock.data.get()) }
    }
}

impl<T: ?Sized> DerefMut for SpinGuard<'_, T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SpinGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for SpinGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

#[cfg(all(test, not(loom)))]
mod test {
    use crate::SpinLock;

    #[test]
    fn test_static_lock_held_for_guard_lifetime() {
        static SLOTS: SpinLock<[u8; 4]> = SpinLock::new([0; 4]);

        {
            let mut slots = SLOTS.lock();
            slots[1] = 7;
            assert!(SLOTS.is_locked());
            assert!(SLOTS.try_lock().is_none());
        }

        assert!(!SLOTS.is_locked());
        assert_eq!(*SLOTS.lock(), [0, 7, 0, 0]);
    }

    #[test]
    fn test_try_lock_behavior() {
        let lock = SpinLock::new(42);

        let guard = lock.lock();
        assert!(lock.try_lock().is_none(), "Lock should not be acquirable while held");
        assert!(lock.is_locked(), "Failed try_lock should not release");

        drop(guard);
        let guard2 = lock.try_lock();
        assert_eq!(guard2.as_deref(), Some(&42));
    }

    #[test]
    fn test_with_lock_returns_closure_value() {
        let lock = SpinLock::new(vec![1, 2, 3]);
        let len = lock.with_lock(|v| {
            v.push(4);
            v.len()
        });
        assert_eq!(len, 4);
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_get_mut_and_into_inner() {
        let mut lock = SpinLock::new(String::from("a"));
        lock.get_mut().push('b');
        assert_eq!(lock.into_inner(), "ab");
    }

    #[test]
    fn test_force_unlock_after_leak() {
        let lock = SpinLock::new(0u8);
        core::mem::forget(lock.lock());
        assert!(lock.is_locked());

        unsafe { lock.force_unlock() };
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn test_unsized_data() {
        let lock: &SpinLock<[u8]> = &SpinLock::new([1u8, 2, 3]);
        lock.lock()[0] = 9;
        assert_eq!(&*lock.lock(), &[9, 2, 3]);
    }

    #[test]
    fn test_debug_does_not_block() {
        let lock = SpinLock::new(7);
        assert_eq!(format!("{lock:?}"), "SpinLock { data: 7, .. }");

        let guard = lock.lock();
        assert_eq!(format!("{lock:?}"), "SpinLock { data: <locked>, .. }");
        assert_eq!(format!("{guard:?} {guard}"), "7 7");
    }

    #[test]
    fn test_default_and_from() {
        let a: SpinLock<u32> = SpinLock::default();
        let b = SpinLock::from(3u32);
        assert_eq!(*a.lock() + *b.lock(), 3);
    }

    /// Each critical section appends to a `Vec`, a multi-word update that
    /// tears without exclusion.
    #[cfg(feature = "std")]
    #[test]
    fn test_with_lock_serializes_appends() {
        use std::sync::Arc;
        use std::thread;

        const THREADS: usize = 8;
        const PER_THREAD: usize = 10_000;

        let journal = Arc::new(SpinLock::new(Vec::new()));
        let handles: Vec<_> = (0..THREADS)
            .map(|id| {
                let journal = journal.clone();
                thread::spawn(move || {
                    for seq in 0..PER_THREAD {
                        journal.with_lock(|entries| entries.push((id, seq)));
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let entries = Arc::try_unwrap(journal).ok().unwrap().into_inner();
        assert_eq!(entries.len(), THREADS * PER_THREAD);
        for id in 0..THREADS {
            let seen: Vec<_> = entries
                .iter()
                .filter(|(owner, _)| *owner == id)
                .map(|(_, seq)| *seq)
                .collect();
            assert_eq!(seen, (0..PER_THREAD).collect::<Vec<_>>(), "thread {id} lost or reordered entries");
        }
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_wait_sees_writes_of_previous_holder() {
        use std::sync::Arc;
        use std::thread;
        use std::time::Duration;

        let lock = Arc::new(SpinLock::new(0u32));
        let mut guard = lock.lock();

        let waiter = {
            let lock = lock.clone();
            thread::spawn(move || {
                lock.wait();
                *lock.lock()
            })
        };

        thread::sleep(Duration::from_millis(20));
        *guard = 99;
        drop(guard);

        assert_eq!(waiter.join().unwrap(), 99);
    }
}
