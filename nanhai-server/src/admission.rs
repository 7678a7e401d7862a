//! Admission control for live push connections
//!
//! A bounded counter of connected event-stream clients. A permit is taken when
//! a client connects and released when its stream is dropped. Only the push
//! endpoint consults the limiter; HTTP game requests are never gated.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Debug)]
pub struct ConnectionLimiter {
    inner: Arc<LimiterState>,
}

#[derive(Debug)]
struct LimiterState {
    max: usize,
    active: AtomicUsize,
}

/// Held for the lifetime of one admitted connection
#[derive(Debug)]
pub struct ConnectionPermit {
    limiter: ConnectionLimiter,
}

impl ConnectionLimiter {
    pub fn new(max: usize) -> Self {
        Self {
            inner: Arc::new(LimiterState {
                max,
                active: AtomicUsize::new(0),
            }),
        }
    }

    /// Admit a connection if the cap has room
    pub fn try_acquire(&self) -> Option<ConnectionPermit> {
        let max = self.inner.max;
        let previous = self
            .inner
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .ok()?;

        info!("User connected. Active users: {}/{}", previous + 1, max);
        Some(ConnectionPermit {
            limiter: self.clone(),
        })
    }

    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::Acquire)
    }

    pub fn max(&self) -> usize {
        self.inner.max
    }
}

impl Drop for ConnectionPermit {
    fn drop(&mut self) {
        let previous = self.limiter.inner.active.fetch_sub(1, Ordering::AcqRel);
        info!(
            "User disconnected. Active users: {}/{}",
            previous.saturating_sub(1),
            self.limiter.inner.max
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_connections() {
        let limiter = ConnectionLimiter::new(2);

        let a = limiter.try_acquire();
        let b = limiter.try_acquire();
        let c = limiter.try_acquire();

        assert!(a.is_some());
        assert!(b.is_some());
        assert!(c.is_none());
        assert_eq!(limiter.active(), 2);
    }

    #[test]
    fn test_drop_releases_slot() {
        let limiter = ConnectionLimiter::new(1);

        let permit = limiter.try_acquire().unwrap();
        assert!(limiter.try_acquire().is_none());

        drop(permit);
        assert_eq!(limiter.active(), 0);
        assert!(limiter.try_acquire().is_some());
    }

    #[test]
    fn test_zero_cap_rejects_everyone() {
        let limiter = ConnectionLimiter::new(0);
        assert!(limiter.try_acquire().is_none());
        assert_eq!(limiter.max(), 0);
    }

    #[test]
    fn test_concurrent_acquire_never_exceeds_cap() {
        let limiter = ConnectionLimiter::new(3);
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || limiter.try_acquire())
            })
            .collect();

        let permits: Vec<ConnectionPermit> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(permits.len(), 3);
        assert_eq!(limiter.active(), 3);
    }
}
