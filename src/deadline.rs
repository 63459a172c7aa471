//! Deadline-bounded execution.
//!
//! [`run_with_deadline`] starts a unit of work as its own task and waits for
//! it no longer than the given deadline. A timeout means "stop waiting", not
//! "stop running": the task is detached and its eventual output is dropped.
//! Store calls have no native cancellation, so aborting them would only hide
//! the work, not stop it.

use std::{future::Future, time::Duration};

use thiserror::Error;
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum DeadlineError {
    #[error("work did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("work panicked before finishing")]
    Panicked,
    #[error("work was cancelled by the runtime")]
    Cancelled,
}

impl DeadlineError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DeadlineError::TimedOut(_))
    }
}

/// Run `work` on an independent task, returning its output if it completes
/// within `deadline`.
///
/// Calls share no state, so this is safe to invoke concurrently. `deadline`
/// should be non-zero; a zero deadline only succeeds for work that is ready
/// on its first poll.
pub async fn run_with_deadline<F, T>(work: F, deadline: Duration) -> Result<T, DeadlineError>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(work);

    match timeout(deadline, handle).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(join_err)) if join_err.is_panic() => Err(DeadlineError::Panicked),
        Ok(Err(_)) => Err(DeadlineError::Cancelled),
        // dropping the JoinHandle detaches the task; it runs to completion
        Err(_elapsed) => Err(DeadlineError::TimedOut(deadline)),
    }
}
