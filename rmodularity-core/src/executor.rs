//! Dispatch of independent trials across a worker pool.
//!
//! A [`TrialExecutor`] lives for exactly one top-level estimator call. Each
//! [`TrialExecutor::dispatch`] is a barrier: it returns once every task of the
//! batch has finished. Every task gets its own entropy-seeded RNG on the
//! worker that runs it, and panics are caught and reported instead of being
//! dropped from the aggregate.

use std::{
    any::Any,
    num::NonZeroUsize,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use rand::{SeedableRng, rngs::SmallRng};
#[cfg(feature = "parallel")]
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use tracing::debug;

use crate::{Result, error::RModularityError};

/// Selects how trials are executed.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use rmodularity_core::ExecutionStrategy;
///
/// assert_eq!(ExecutionStrategy::default(), ExecutionStrategy::Parallel { threads: None });
/// let pinned = ExecutionStrategy::with_threads(NonZeroUsize::new(2).expect("non-zero"));
/// assert!(matches!(pinned, ExecutionStrategy::Parallel { threads: Some(_) }));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Run trials on a dedicated pool. `None` sizes the pool to the available
    /// hardware parallelism.
    Parallel {
        /// Explicit worker count.
        threads: Option<NonZeroUsize>,
    },
    /// Run trials one after another on the calling thread.
    Sequential,
}

impl Default for ExecutionStrategy {
    fn default() -> Self {
        Self::Parallel { threads: None }
    }
}

impl ExecutionStrategy {
    /// Parallel execution with a fixed number of workers.
    #[must_use]
    pub const fn with_threads(threads: NonZeroUsize) -> Self {
        Self::Parallel {
            threads: Some(threads),
        }
    }
}

/// Worker pool scoped to one estimator call.
///
/// Dropping the executor releases the pool.
pub(crate) struct TrialExecutor {
    #[cfg(feature = "parallel")]
    pool: Option<ThreadPool>,
}

impl TrialExecutor {
    /// Starts an executor for `strategy`.
    ///
    /// # Errors
    /// Returns [`RModularityError::ThreadPool`] when the pool cannot be built
    /// and [`RModularityError::BackendUnavailable`] when parallel execution was
    /// requested from a build without the `parallel` feature.
    pub(crate) fn new(strategy: ExecutionStrategy) -> Result<Self> {
        match strategy {
            ExecutionStrategy::Sequential => Ok(Self::sequential()),
            #[cfg(feature = "parallel")]
            ExecutionStrategy::Parallel { threads } => {
                let threads = threads
                    .or_else(|| std::thread::available_parallelism().ok())
                    .map_or(1, NonZeroUsize::get);
                let pool = ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|index| format!("rmodularity-worker-{index}"))
                    .build()
                    .map_err(|error| RModularityError::ThreadPool {
                        message: Arc::from(error.to_string()),
                    })?;
                debug!(threads, "worker pool started");
                Ok(Self { pool: Some(pool) })
            }
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Parallel { .. } => {
                Err(RModularityError::BackendUnavailable { requested: strategy })
            }
        }
    }

    fn sequential() -> Self {
        Self {
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    /// Whether tasks run on a worker pool.
    pub(crate) fn is_parallel(&self) -> bool {
        #[cfg(feature = "parallel")]
        {
            self.pool.is_some()
        }
        #[cfg(not(feature = "parallel"))]
        {
            false
        }
    }

    /// Limits a detector's internal threads to one while a pool is active.
    ///
    /// `set` is called with `Some(1)` now and with `None` when the returned
    /// guard drops. Sequential executors leave the detector untouched.
    pub(crate) fn limit_detector_threads<F>(&self, set: F) -> DetectorThreadGuard<F>
    where
        F: Fn(Option<NonZeroUsize>),
    {
        if self.is_parallel() {
            set(Some(NonZeroUsize::MIN));
            DetectorThreadGuard { reset: Some(set) }
        } else {
            DetectorThreadGuard { reset: None }
        }
    }

    /// Runs `job` once per input and waits for all of them.
    ///
    /// Results keep input order. The first failing task aborts the batch with
    /// its error; a panicking task becomes [`RModularityError::WorkerPanicked`].
    pub(crate) fn dispatch<I, T, F>(&self, inputs: Vec<I>, job: F) -> Result<Vec<T>>
    where
        I: Send,
        T: Send,
        F: Fn(I, &mut SmallRng) -> Result<T> + Sync + Send,
    {
        let run = |input: I| {
            run_isolated(|| {
                let mut rng = SmallRng::from_entropy();
                job(input, &mut rng)
            })
        };

        #[cfg(feature = "parallel")]
        if let Some(pool) = &self.pool {
            return pool.install(|| inputs.into_par_iter().map(run).collect());
        }

        inputs.into_iter().map(run).collect()
    }
}

/// Restores a detector's thread limit on drop.
pub(crate) struct DetectorThreadGuard<F: Fn(Option<NonZeroUsize>)> {
    reset: Option<F>,
}

impl<F: Fn(Option<NonZeroUsize>)> Drop for DetectorThreadGuard<F> {
    fn drop(&mut self) {
        if let Some(reset) = &self.reset {
            reset(None);
        }
    }
}

fn run_isolated<T>(task: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(|payload| {
        Err(RModularityError::WorkerPanicked {
            message: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> Arc<str> {
    if let Some(message) = payload.downcast_ref::<&str>() {
        Arc::from(*message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        Arc::from(message.as_str())
    } else {
        Arc::from("non-string panic payload")
    }
}
