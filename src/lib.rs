//! # atomic-spinlock 🌀
//!
//! A lightweight, **`no_std`-compatible** crate providing a minimal
//! **compare-and-swap spinlock** for very short critical sections, where an OS
//! context switch would cost more than the work it protects.
//!
//! The crate includes:
//!
//! - [`RawSpinLock`] — the bare gate: `acquire`, `try_acquire`, `release`, `wait`.
//! - [`SpinLock<T>`] — a data-owning lock with an RAII [`SpinGuard`].
//! - [`relax`](fn@relax) — the cooperative hint issued between spin attempts.
//!
//! Nothing in this crate sleeps, parks, or blocks on a kernel primitive.
//!
//! ## ✨ Features
//!
//! - ✅ `no_std` compatible (uses `core` only without the `std` feature)
//! - ⚙️ `std` (default): spin loops yield with `std::thread::yield_now()`
//! - 🧩 `lock_api`: [`RawSpinLock`] implements `lock_api::RawMutex`
//! - 📝 `log`: warns when a lock is dropped while still held
//! - 🖥️ `demo`: the `atomic-spinlock` contention demo binary (`cargo run --features demo`)
//!
//! ## 🚀 Quick Example
//!
//! ```rust
//! use atomic_spinlock::{RawSpinLock, SpinLock};
//!
//! // Example 1: Using SpinLock
//! let lock = SpinLock::new(0);
//! {
//!     let mut guard = lock.lock();
//!     *guard += 1;
//! } // automatically unlocked when guard is dropped
//! assert_eq!(*lock.lock(), 1);
//!
//! // Example 2: Using the raw gate
//! let gate = RawSpinLock::new();
//! assert!(gate.try_acquire());
//! assert!(!gate.try_acquire());
//! gate.release();
//! gate.wait(); // returns at once, the gate is open
//! ```
//!
//! ## 🧠 Design
//!
//! `RawSpinLock` is a single [`AtomicBool`](core::sync::atomic::AtomicBool).
//! Acquisition loads the flag first and only issues the CAS when it reads
//! unlocked, using **Acquire** on success; release is a plain **Release**
//! store. Everything the previous holder wrote before releasing is visible to
//! the next holder.
//!
//! ## ⚠️ Safety & Usage Notes
//!
//! - Prefer spinlocks for **short critical sections** only.
//! - Never hold a spinlock during blocking or long-running operations.
//! - Locks are **not fair** and **not reentrant**.
//! - The raw lock records no owner: `release` unlocks whoever holds it.
//!
//! ## 📦 Modules
//!
//! - [`raw`] — the bare atomic gate and its guard.
//! - [`spinlock`] — data-owning spinlock.
//! - [`relax`](mod@relax) — spin-loop scheduling hint.
//! - `mutex` — `lock_api` aliases (feature `lock_api`).

#![cfg_attr(not(any(feature = "std", test, loom)), no_std)]

pub mod raw;
pub mod relax;
pub mod spinlock;
mod sync;

#[cfg(all(feature = "lock_api", not(loom)))]
pub mod mutex;

pub use raw::{RawSpinGuard, RawSpinLock};
pub use relax::relax;
pub use spinlock::{SpinGuard, SpinLock};
