//! Atomic primitives used by the locks.
//!
//! Under `--cfg loom` these resolve to loom's instrumented types so the model
//! checker can explore every interleaving; otherwise they are plain `core`
//! atomics.

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{AtomicBool, Ordering};
