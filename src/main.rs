//! Contention demo for the `atomic-spinlock` crate.
//!
//! Spawns a number of threads that each increment a shared counter many times,
//! either through a `SpinLock<u64>` guard or through a bare `RawSpinLock` paired
//! with an unsynchronized cell, then checks that no update was lost.

use std::cell::UnsafeCell;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, ensure, Context, Result};
use atomic_spinlock::{RawSpinLock, SpinLock};
use clap::{Parser, ValueEnum};
use log::{debug, info, LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "atomic-spinlock", about = "Hammer a spinlock from many threads")]
struct Args {
    /// Number of worker threads.
    #[arg(short, long, default_value_t = 8)]
    threads: usize,

    /// Increments performed by each thread.
    #[arg(short, long, default_value_t = 100_000)]
    iterations: u64,

    /// Which lock API the workers go through.
    #[arg(short, long, value_enum, default_value_t = Mode::Guard)]
    mode: Mode,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// `SpinLock<u64>` with RAII guards.
    Guard,
    /// `RawSpinLock::acquire` / `release` around a plain cell.
    Raw,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}

/// A counter with no synchronization of its own.
struct Counter(UnsafeCell<u64>);

// Safety: the raw-mode workers only touch the cell while holding the gate.
unsafe impl Sync for Counter {}

fn run_guard(threads: usize, iterations: u64) -> Result<u64> {
    let lock = Arc::new(SpinLock::new(0u64));

    let handles: Vec<_> = (0..threads)
        .map(|id| {
            let lock = lock.clone();
            thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || {
                    for _ in 0..iterations {
                        *lock.lock() += 1;
                    }
                    debug!("worker {id} done");
                })
                .context("spawning worker")
        })
        .collect::<Result<_>>()?;

    join_all(handles)?;
    let total = *lock.lock();
    Ok(total)
}

fn run_raw(threads: usize, iterations: u64) -> Result<u64> {
    let shared = Arc::new((RawSpinLock::new(), Counter(UnsafeCell::new(0))));

    let handles: Vec<_> = (0..threads)
        .map(|id| {
            let shared = shared.clone();
            thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || {
                    let (gate, counter) = &*shared;
                    for _ in 0..iterations {
                        gate.acquire();
                        unsafe { *counter.0.get() += 1 };
                        gate.release();
                    }
                    debug!("worker {id} done");
                })
                .context("spawning worker")
        })
        .collect::<Result<_>>()?;

    join_all(handles)?;
    let (gate, counter) = &*shared;
    let _guard = gate.lock();
    Ok(unsafe { *counter.0.get() })
}

fn join_all(handles: Vec<thread::JoinHandle<()>>) -> Result<()> {
    for h in handles {
        let name = h.thread().name().unwrap_or("worker").to_owned();
        h.join().map_err(|_| anyhow!("{name} panicked"))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    ensure!(args.threads > 0, "--threads must be at least 1");
    let expected = args
        .iterations
        .checked_mul(args.threads as u64)
        .context("threads * iterations overflows u64")?;

    info!(
        "starting {} threads x {} increments ({:?} mode)",
        args.threads, args.iterations, args.mode
    );

    let start = Instant::now();
    let total = match args.mode {
        Mode::Guard => run_guard(args.threads, args.iterations)?,
        Mode::Raw => run_raw(args.threads, args.iterations)?,
    };
    let elapsed = start.elapsed();

    println!("Final counter value: {total} in {elapsed:.2?}");
    ensure!(
        total == expected,
        "lost updates: expected {expected}, got {total}"
    );
    Ok(())
}
