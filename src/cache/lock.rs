//! Poison-tolerant acquisition of the std locks guarding cache state.
//!
//! A panic while holding a guard poisons the lock; for a cache that is an
//! availability problem, not a correctness one, since the guarded maps are
//! replaced wholesale rather than mutated in place. Acquisition therefore
//! recovers the guard and logs the event instead of propagating the poison.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

fn recover<G>(
    result: Result<G, PoisonError<G>>,
    kind: &'static str,
    target: &'static str,
    op: &'static str,
) -> G {
    result.unwrap_or_else(|poisoned| {
        warn!(
            op,
            target_module = target,
            lock_kind = kind,
            "Recovered from poisoned cache lock; guarded state follows the last completed update"
        );
        poisoned.into_inner()
    })
}

pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    target: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    recover(lock.read(), "rwlock.read", target, op)
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    target: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    recover(lock.write(), "rwlock.write", target, op)
}

pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    target: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    recover(lock.lock(), "mutex.lock", target, op)
}
