//! Bounded worker pool
//!
//! Executes an ordered batch of independent async tasks with at most `limit`
//! task bodies in flight, isolating per-task failure. Results come back in
//! task-submission order regardless of completion order; a failed task is
//! logged and reported as `None` at its position without disturbing its
//! siblings.

use crate::ConfigError;
use futures::future::join_all;
use std::fmt::Display;
use std::future::Future;
use tokio::sync::Semaphore;

/// A reusable concurrency bound for batches of fallible async tasks
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    limit: usize,
}

impl WorkerPool {
    /// Creates a pool with the given concurrency limit
    ///
    /// A limit of zero can never make progress and fails fast with a
    /// configuration error. A limit larger than any batch behaves as
    /// unlimited concurrency for that batch.
    pub fn new(limit: usize) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(Self { limit })
    }

    /// The configured concurrency limit
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Runs every task to settlement and returns one output per input, in
    /// input order
    ///
    /// All futures are polled on the current task; a semaphore gates how many
    /// task bodies proceed at once. An erroring task yields `None` at its
    /// position; siblings are unaffected. Returns only once every task has
    /// settled.
    pub async fn run<T, E, Fut>(&self, tasks: Vec<Fut>) -> Vec<Option<T>>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let gate = Semaphore::new(self.limit);

        let gated = tasks.into_iter().enumerate().map(|(index, task)| {
            let gate = &gate;
            async move {
                // The semaphore is never closed, but don't panic on the
                // impossible branch either.
                let _permit = match gate.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return None,
                };

                match task.await {
                    Ok(value) => Some(value),
                    Err(err) => {
                        tracing::warn!("Task {} failed: {}", index, err);
                        None
                    }
                }
            }
        });

        join_all(gated).await
    }
}
