//! Time-bounded execution of a single sub-operation
//!
//! Each sub-operation moves through
//! `Pending -> Running -> Succeeded | TimedOut | Failed`.
//! The job runs on its own named worker thread; the caller blocks on a
//! one-slot channel for at most the budget. A worker that overruns is
//! detached and whatever it sends later is dropped with the channel.

use crate::error::AnalysisError;
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Lifecycle of one bounded sub-operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    /// Created, not started
    Pending,
    /// Worker spawned, waiting for its result
    Running,
    /// Result delivered within budget
    Succeeded,
    /// Budget elapsed first
    TimedOut,
    /// Job returned an error, panicked, or could not be started
    Failed,
}

/// What the caller gets back from [`BoundedOperation::run`]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Job finished within budget
    Succeeded(T),
    /// Budget elapsed before the job finished
    TimedOut,
    /// Job failed; carries the reason for logging
    Failed(String),
}

impl<T> Outcome<T> {
    /// Value of a successful run
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the budget elapsed
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Outcome::TimedOut)
    }
}

/// One named sub-operation with its time budget
#[derive(Debug)]
pub struct BoundedOperation {
    name: String,
    budget: Duration,
    state: OperationState,
}

impl BoundedOperation {
    /// New operation in the `Pending` state
    pub fn new(name: impl Into<String>, budget: Duration) -> Self {
        Self {
            name: name.into(),
            budget,
            state: OperationState::Pending,
        }
    }

    /// Operation name used for the worker thread and in logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time budget
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Current state
    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Run `job` on a worker thread and wait at most the budget for it
    ///
    /// The job must own everything it touches (`'static`); share large
    /// buffers through `Arc`.
    pub fn run<T, F>(&mut self, job: F) -> Outcome<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, AnalysisError> + Send + 'static,
    {
        let (sender, receiver) = bounded::<Result<T, AnalysisError>>(1);

        let spawned = std::thread::Builder::new()
            .name(format!("songform-{}", self.name))
            .spawn(move || {
                // The receiver is gone if the caller already gave up
                let _ = sender.send(job());
            });

        if let Err(e) = spawned {
            self.state = OperationState::Failed;
            return Outcome::Failed(format!("Failed to spawn worker: {}", e));
        }

        self.state = OperationState::Running;
        let started = Instant::now();

        let outcome = match receiver.recv_timeout(self.budget) {
            Ok(Ok(value)) => Outcome::Succeeded(value),
            Ok(Err(e)) => Outcome::Failed(e.to_string()),
            Err(RecvTimeoutError::Timeout) => Outcome::TimedOut,
            Err(RecvTimeoutError::Disconnected) => {
                Outcome::Failed("Worker exited without a result (panicked)".to_string())
            }
        };

        self.state = match &outcome {
            Outcome::Succeeded(_) => OperationState::Succeeded,
            Outcome::TimedOut => OperationState::TimedOut,
            Outcome::Failed(_) => OperationState::Failed,
        };

        match &outcome {
            Outcome::Succeeded(_) => log::debug!(
                "Operation '{}' finished in {:.1} ms",
                self.name,
                started.elapsed().as_secs_f64() * 1000.0
            ),
            Outcome::TimedOut => log::warn!(
                "{}",
                AnalysisError::Timeout {
                    operation: self.name.clone(),
                    budget: self.budget,
                }
            ),
            Outcome::Failed(reason) => {
                log::warn!("Operation '{}' failed: {}", self.name, reason)
            }
        }

        outcome
    }
}
