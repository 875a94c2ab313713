//! # Lock Adapter
//!
//! Uniform read/write acquisition over shared, exclusive, or no-op locking,
//! selected at the type level. Every cache in this crate is generic over a
//! [`SyncPolicy`], so single-threaded and thread-safe variants compile from
//! identical code.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                        SyncPolicy (family)                       │
//!   │                                                                  │
//!   │   type Cell<T>: SyncCell<T>       const MT_SAFE: bool            │
//!   └───────────┬──────────────────────┬──────────────────┬────────────┘
//!               │                      │                  │
//!               ▼                      ▼                  ▼
//!   ┌───────────────────┐  ┌────────────────────┐  ┌─────────────────┐
//!   │ Shared            │  │ Exclusive          │  │ Unsync          │
//!   │                   │  │                    │  │                 │
//!   │ parking_lot::     │  │ parking_lot::      │  │ RefCell<T>      │
//!   │   RwLock<T>       │  │   Mutex<T>         │  │                 │
//!   │ read  → shared    │  │ read  → exclusive  │  │ read  → borrow  │
//!   │ write → exclusive │  │ write → exclusive  │  │ write → borrow  │
//!   │ MT_SAFE = true    │  │ MT_SAFE = true     │  │ MT_SAFE = false │
//!   └───────────────────┘  └────────────────────┘  └─────────────────┘
//! ```
//!
//! ## Key Concepts
//!
//! - **Read acquisition** is shared when the underlying lock supports it
//!   ([`Shared`]) and silently degrades to exclusive when it does not
//!   ([`Exclusive`]).
//! - **No-op locking** is [`Unsync`]: a `RefCell` stands in for the lock, so
//!   the cell is `!Sync` and the single-threaded restriction is enforced by
//!   the compiler rather than by the caller's discipline.
//! - `MT_SAFE` backs the `is_mt_safe()` predicate on every cache: it reports
//!   `false` exactly when the no-op variant is selected.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::cache::LruCache;
//! use memokit::sync::{Shared, Unsync};
//!
//! let concurrent: LruCache<u64, String, Shared> = LruCache::try_new(16).unwrap();
//! assert!(concurrent.is_mt_safe());
//!
//! let local: LruCache<u64, String, Unsync> = LruCache::try_new(16).unwrap();
//! assert!(!local.is_mt_safe());
//! ```

use std::cell::RefCell;

use parking_lot::{Mutex, RwLock};

/// Scoped read/write access to a value behind some synchronization primitive.
///
/// The closure-based shape guarantees release on all exit paths; a guard can
/// never outlive the operation it serves.
pub trait SyncCell<T> {
    /// Wraps a value in the cell.
    fn new(value: T) -> Self;

    /// Runs `f` with shared (or degraded-to-exclusive) access to the value.
    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R;

    /// Runs `f` with exclusive access to the value.
    fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;

    /// Consumes the cell and returns the inner value.
    fn into_inner(self) -> T;
}

/// Type-level selection of a [`SyncCell`] family.
///
/// Caches take a `SyncPolicy` parameter instead of a concrete lock so that
/// the locking regime is part of the cache type, the way the eviction policy
/// is.
pub trait SyncPolicy {
    /// `false` exactly when the no-op variant is selected.
    const MT_SAFE: bool;

    /// The cell used to hold cache state under this policy.
    type Cell<T>: SyncCell<T>;
}

/// Reader-writer locking: reads are shared, writes are exclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shared;

/// Plain mutual exclusion: reads degrade to exclusive acquisition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exclusive;

/// No-op locking for single-threaded or externally synchronized use.
///
/// Cells under this policy are `!Sync`, so selecting it is a compile-time
/// claim, not a runtime promise.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsync;

/// Constructs a cell of the policy's family around `value`.
pub fn new_cell<S: SyncPolicy, T>(value: T) -> S::Cell<T> {
    <S::Cell<T> as SyncCell<T>>::new(value)
}

impl SyncPolicy for Shared {
    const MT_SAFE: bool = true;
    type Cell<T> = RwLock<T>;
}

impl SyncPolicy for Exclusive {
    const MT_SAFE: bool = true;
    type Cell<T> = Mutex<T>;
}

impl SyncPolicy for Unsync {
    const MT_SAFE: bool = false;
    type Cell<T> = RefCell<T>;
}

impl<T> SyncCell<T> for RwLock<T> {
    #[inline]
    fn new(value: T) -> Self {
        RwLock::new(value)
    }

    #[inline]
    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&RwLock::read(self))
    }

    #[inline]
    fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut RwLock::write(self))
    }

    #[inline]
    fn into_inner(self) -> T {
        RwLock::into_inner(self)
    }
}

impl<T> SyncCell<T> for Mutex<T> {
    #[inline]
    fn new(value: T) -> Self {
        Mutex::new(value)
    }

    #[inline]
    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&Mutex::lock(self))
    }

    #[inline]
    fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut Mutex::lock(self))
    }

    #[inline]
    fn into_inner(self) -> T {
        Mutex::into_inner(self)
    }
}

impl<T> SyncCell<T> for RefCell<T> {
    #[inline]
    fn new(value: T) -> Self {
        RefCell::new(value)
    }

    #[inline]
    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.borrow())
    }

    #[inline]
    fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.borrow_mut())
    }

    #[inline]
    fn into_inner(self) -> T {
        RefCell::into_inner(self)
    }
}
