//! Bounded-concurrency execution for I/O-bound batches.
//!
//! Realizes the tile-request admission-control contract with a
//! `tokio::sync::Semaphore`: at most N futures make progress at any
//! instant, and a limit of 0 means unlimited. The limit protects the
//! upstream tile provider, it is not a correctness requirement.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

/// Runs batches of futures with at most a fixed number in flight.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Option<Arc<Semaphore>>,
    limit: usize,
}

impl ConcurrencyLimiter {
    /// Creates a limiter admitting at most `limit` futures at once.
    ///
    /// A limit of 0 disables limiting entirely.
    pub fn new(limit: usize) -> Self {
        let semaphore = (limit > 0).then(|| Arc::new(Semaphore::new(limit)));
        Self { semaphore, limit }
    }

    /// The configured limit; 0 means unlimited.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Drives all `tasks` to completion with at most `limit` in flight,
    /// returning their outputs in input order.
    pub async fn run<T, F>(&self, tasks: Vec<F>) -> Vec<T>
    where
        F: Future<Output = T>,
    {
        let guarded = tasks.into_iter().map(|task| {
            let semaphore = self.semaphore.clone();
            async move {
                let _permit = match &semaphore {
                    Some(semaphore) => Some(
                        semaphore
                            .acquire()
                            .await
                            .expect("limiter semaphore closed"),
                    ),
                    None => None,
                };
                task.await
            }
        });
        futures::future::join_all(guarded).await
    }
}
