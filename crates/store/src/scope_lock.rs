//! Per-scope mutual exclusion for number reservation.
//!
//! A reservation reads the scope (lowest FREE record, highest minted
//! sequence) and then writes one record; two interleaved reservations in the
//! same scope would hand out the same number. `ScopeLocks` serializes that
//! read-then-write critical section per [`ScopeKey`], with a bounded wait so
//! a stuck holder surfaces as `ConcurrencyTimeout` instead of a hang.
//! Distinct scopes never contend.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use werkorder_core::{DomainError, DomainResult};
use werkorder_numbering::ScopeKey;

#[derive(Debug, Default)]
pub struct ScopeLocks {
    held: Mutex<HashSet<ScopeKey>>,
    released: Condvar,
}

impl ScopeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive lock for a scope, waiting at most `timeout`.
    ///
    /// The returned guard releases the scope on drop and wakes waiters.
    pub fn acquire(&self, scope: ScopeKey, timeout: Duration) -> DomainResult<ScopeGuard<'_>> {
        let deadline = Instant::now() + timeout;
        let mut held = self
            .held
            .lock()
            .map_err(|_| DomainError::storage("scope lock poisoned"))?;

        while held.contains(&scope) {
            let now = Instant::now();
            if now >= deadline {
                return Err(DomainError::timeout(format!("scope {scope}")));
            }
            let (guard, wait) = self
                .released
                .wait_timeout(held, deadline - now)
                .map_err(|_| DomainError::storage("scope lock poisoned"))?;
            held = guard;
            if wait.timed_out() && held.contains(&scope) {
                return Err(DomainError::timeout(format!("scope {scope}")));
            }
        }

        held.insert(scope);
        Ok(ScopeGuard { locks: self, scope })
    }
}

/// RAII handle to a held scope.
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    locks: &'a ScopeLocks,
    scope: ScopeKey,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut held) = self.locks.held.lock() {
            held.remove(&self.scope);
        }
        self.locks.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use werkorder_numbering::Series;

    fn so_scope() -> ScopeKey {
        Series::ServiceOrder.scope(2026, 2)
    }

    #[test]
    fn a_scope_can_be_reacquired_after_the_guard_drops() {
        let locks = ScopeLocks::new();
        let guard = locks.acquire(so_scope(), Duration::from_millis(10)).unwrap();
        drop(guard);
        assert!(locks.acquire(so_scope(), Duration::from_millis(10)).is_ok());
    }

    #[test]
    fn distinct_scopes_do_not_contend() {
        let locks = ScopeLocks::new();
        let _so = locks.acquire(so_scope(), Duration::from_millis(10)).unwrap();
        let po = locks.acquire(
            Series::PurchaseOrder.scope(2026, 2),
            Duration::from_millis(10),
        );
        assert!(po.is_ok());
    }

    #[test]
    fn a_contended_acquire_times_out_with_concurrency_timeout() {
        let locks = Arc::new(ScopeLocks::new());
        let _held = locks.acquire(so_scope(), Duration::from_millis(10)).unwrap();

        let contender = Arc::clone(&locks);
        let result = thread::spawn(move || {
            contender
                .acquire(so_scope(), Duration::from_millis(50))
                .map(|_| ())
        })
        .join()
        .unwrap();

        assert!(matches!(result, Err(DomainError::ConcurrencyTimeout(_))));
    }

    #[test]
    fn a_waiter_proceeds_once_the_holder_releases() {
        let locks = Arc::new(ScopeLocks::new());
        let guard = locks.acquire(so_scope(), Duration::from_millis(10)).unwrap();

        let contender = Arc::clone(&locks);
        let waiter = thread::spawn(move || {
            contender
                .acquire(so_scope(), Duration::from_secs(5))
                .map(|_| ())
        });

        thread::sleep(Duration::from_millis(20));
        drop(guard);

        assert!(waiter.join().unwrap().is_ok());
    }
}
