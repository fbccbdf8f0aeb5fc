//! Time seam for the convergence loop
//!
//! Production code waits on tokio timers; tests substitute a clock that
//! records requested waits and returns immediately.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Source of the current time and of waits between polls
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current wall-clock time, used for sliding windows
    fn now(&self) -> DateTime<Utc>;

    /// Waits for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the system time and `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[async_trait]
impl<'a, T: Clock + ?Sized> Clock for &'a T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_sleeps() {
        let started = tokio::time::Instant::now();
        TokioClock.sleep(Duration::from_secs(300)).await;
        assert!(started.elapsed() >= Duration::from_secs(300));
    }
}
