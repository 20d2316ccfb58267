//! Fork-join fan-out with per-branch error isolation
//!
//! A [`FanOut`] starts independent units of work on the runtime and joins
//! them. Every unit resolves to a [`BranchOutcome`]: either its value or a
//! [`ProviderSearchFailed`] describing why it produced nothing. A failing,
//! timed-out, cancelled or panicking branch never affects its siblings, and
//! joining never returns an error.
//!
//! Units must be `'static`: each one owns its inputs (e.g. its own copy of
//! the query string), so a caller mutating its own value after dispatch
//! cannot race with a running branch.
//!
//! # Example
//! ```rust,ignore
//! let fanout = FanOut::new().with_timeout(Duration::from_secs(10));
//! let a = fanout.spawn("a", async move { fetch_a(&query_a).await });
//! let b = fanout.spawn("b", async move { fetch_b(&query_b).await });
//! let (a, b) = tokio::join!(a.join(), b.join());
//! ```

use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Why a branch produced no value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BranchFailure {
    /// The unit of work itself returned an error
    #[error("{0}")]
    Provider(String),

    /// The fan-out deadline passed before the unit finished
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// The caller cancelled the fan-out
    #[error("cancelled")]
    Cancelled,

    /// The task panicked or was aborted by the runtime
    #[error("task aborted: {0}")]
    Aborted(String),
}

/// A single branch failed; recovered locally, never surfaced as an `Err`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider} search failed: {reason}")]
pub struct ProviderSearchFailed {
    pub provider: &'static str,
    pub reason: BranchFailure,
}

impl Serialize for ProviderSearchFailed {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.reason.to_string())
    }
}

/// Result slot of one branch
#[derive(Debug, Clone, PartialEq)]
pub enum BranchOutcome<T> {
    Completed(T),
    Failed(ProviderSearchFailed),
}

impl<T> BranchOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, BranchOutcome::Completed(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            BranchOutcome::Completed(value) => Some(value),
            BranchOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ProviderSearchFailed> {
        match self {
            BranchOutcome::Completed(_) => None,
            BranchOutcome::Failed(err) => Some(err),
        }
    }

    /// The value, or the type's empty value for a failed branch
    pub fn into_value_or_default(self) -> T
    where
        T: Default,
    {
        match self {
            BranchOutcome::Completed(value) => value,
            BranchOutcome::Failed(_) => T::default(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> BranchOutcome<U> {
        match self {
            BranchOutcome::Completed(value) => BranchOutcome::Completed(f(value)),
            BranchOutcome::Failed(err) => BranchOutcome::Failed(err),
        }
    }
}

/// Per-invocation dispatcher: shared deadline and cancellation for a set of
/// branches
#[derive(Debug, Clone, Default)]
pub struct FanOut {
    deadline: Option<(Instant, Duration)>,
    cancel: CancellationToken,
}

impl FanOut {
    /// No deadline, never cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Every branch must finish within `timeout` of this call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some((Instant::now() + timeout, timeout));
        self
    }

    /// Branches still running when `token` is cancelled resolve as
    /// [`BranchFailure::Cancelled`]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Start one unit of work immediately
    pub fn spawn<T, E, F>(&self, name: &'static str, task: F) -> Branch<T>
    where
        T: Send + 'static,
        E: fmt::Display,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let deadline = self.deadline;
        let cancel = self.cancel.clone();

        let handle = tokio::spawn(async move {
            let work = async move { task.await.map_err(|e| BranchFailure::Provider(e.to_string())) };
            let bounded = async move {
                match deadline {
                    Some((at, timeout)) => tokio::time::timeout_at(at, work)
                        .await
                        .unwrap_or(Err(BranchFailure::TimedOut(timeout))),
                    None => work.await,
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(BranchFailure::Cancelled),
                result = bounded => result,
            }
        });

        Branch { name, handle }
    }

    /// Run N homogeneous branches and join them all
    ///
    /// Every branch is dispatched before any is awaited. Outcomes are
    /// returned in input order.
    pub async fn join_all<T, E, F, I>(&self, tasks: I) -> Vec<BranchOutcome<T>>
    where
        T: Send + 'static,
        E: fmt::Display,
        F: Future<Output = Result<T, E>> + Send + 'static,
        I: IntoIterator<Item = (&'static str, F)>,
    {
        let branches: Vec<Branch<T>> = tasks
            .into_iter()
            .map(|(name, task)| self.spawn(name, task))
            .collect();

        futures::future::join_all(branches.into_iter().map(Branch::join)).await
    }
}

/// Handle to a running branch. Dropping it without joining aborts the task.
pub struct Branch<T> {
    name: &'static str,
    handle: JoinHandle<Result<T, BranchFailure>>,
}

impl<T> Branch<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Wait for the branch; failures are logged and folded into the outcome
    pub async fn join(mut self) -> BranchOutcome<T> {
        let result = match (&mut self.handle).await {
            Ok(result) => result,
            Err(join_err) => Err(BranchFailure::Aborted(join_err.to_string())),
        };

        match result {
            Ok(value) => {
                debug!(branch = self.name, "Branch completed");
                BranchOutcome::Completed(value)
            }
            Err(reason) => {
                warn!(
                    branch = self.name,
                    error = %reason,
                    "Branch failed (isolated, siblings unaffected)"
                );
                BranchOutcome::Failed(ProviderSearchFailed {
                    provider: self.name,
                    reason,
                })
            }
        }
    }
}

impl<T> Drop for Branch<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_join_all_preserves_order_and_isolates_failures() {
        let fanout = FanOut::new();
        let tasks = (0..4u32).map(|i| {
            let name: &'static str = ["zero", "one", "two", "three"][i as usize];
            let task = async move {
                tokio::time::sleep(Duration::from_millis(u64::from(40 - i * 10))).await;
                if i % 2 == 1 {
                    Err(format!("branch {} broke", i))
                } else {
                    Ok(i)
                }
            };
            (name, task)
        });

        let outcomes = fanout.join_all(tasks).await;

        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes[0], BranchOutcome::Completed(0));
        assert_eq!(outcomes[2], BranchOutcome::Completed(2));
        let err = outcomes[1].error().expect("branch one failed");
        assert_eq!(err.provider, "one");
        assert_eq!(err.reason, BranchFailure::Provider("branch 1 broke".to_string()));
        assert!(!outcomes[3].is_completed());
    }

    #[tokio::test]
    async fn test_branches_run_concurrently() {
        let fanout = FanOut::new();
        let start = std::time::Instant::now();

        let tasks = ["a", "b", "c"].into_iter().map(|name| {
            (name, async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok::<_, String>(name)
            })
        });
        let outcomes = fanout.join_all(tasks).await;

        assert!(outcomes.iter().all(BranchOutcome::is_completed));
        assert!(
            start.elapsed() < Duration::from_millis(550),
            "three 200ms branches should overlap, took {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_timeout_fails_only_slow_branch() {
        let fanout = FanOut::new().with_timeout(Duration::from_millis(100));

        let fast = fanout.spawn("fast", async { Ok::<_, String>("done") });
        let slow = fanout.spawn("slow", async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, String>("never")
        });
        let (fast, slow) = tokio::join!(fast.join(), slow.join());

        assert_eq!(fast, BranchOutcome::Completed("done"));
        assert_eq!(
            slow.error().map(|e| e.reason.clone()),
            Some(BranchFailure::TimedOut(Duration::from_millis(100)))
        );
    }

    #[tokio::test]
    async fn test_cancellation_resolves_pending_branches() {
        let token = CancellationToken::new();
        let fanout = FanOut::new().with_cancellation(token.clone());

        let pending = fanout.spawn("pending", async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, String>(())
        });

        token.cancel();
        let outcome = pending.join().await;
        assert_eq!(
            outcome.error().map(|e| e.reason.clone()),
            Some(BranchFailure::Cancelled)
        );
    }

    #[tokio::test]
    async fn test_panicking_branch_is_contained() {
        let fanout = FanOut::new();
        let ok = fanout.spawn("ok", async { Ok::<_, String>(1) });
        let boom = fanout.spawn("boom", async {
            if true {
                panic!("provider exploded");
            }
            Ok::<_, String>(2)
        });

        let (ok, boom) = tokio::join!(ok.join(), boom.join());
        assert_eq!(ok.into_value_or_default(), 1);
        assert!(matches!(
            boom.error().map(|e| &e.reason),
            Some(BranchFailure::Aborted(_))
        ));
        assert_eq!(boom.into_value_or_default(), 0);
    }

    #[tokio::test]
    async fn test_dropped_branch_is_aborted() {
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finished);

        let fanout = FanOut::new();
        let branch = fanout.spawn("dropped", async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(())
        });
        drop(branch);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_outcome_map_keeps_failure() {
        let failed: BranchOutcome<Vec<u8>> = BranchOutcome::Failed(ProviderSearchFailed {
            provider: "x",
            reason: BranchFailure::Cancelled,
        });
        let mapped = failed.map(|v| v.len());
        assert_eq!(mapped.error().map(|e| e.provider), Some("x"));
        assert_eq!(
            mapped.error().map(ToString::to_string).as_deref(),
            Some("x search failed: cancelled")
        );
    }
}
