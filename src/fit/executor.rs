//! Execution of independent fitting tasks.
//!
//! Bootstrap trials are embarrassingly parallel. An [`Executor`] either runs
//! them in order on the calling thread or on a dedicated rayon pool sized by
//! the run configuration. Results always come back in task order, so the
//! output does not depend on scheduling.

use std::sync::Arc;

use rayon::ThreadPool;
use rayon::prelude::*;

use crate::error::OcError;

#[derive(Debug, Clone)]
pub enum Executor {
    Sequential,
    Pool(Arc<ThreadPool>),
}

impl Executor {
    /// `None` uses every logical core; `Some(1)` stays on the calling thread.
    pub fn new(threads: Option<usize>) -> Result<Self, OcError> {
        if threads == Some(1) {
            return Ok(Self::Sequential);
        }
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("oc-bootstrap-{i}"));
        if let Some(n) = threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| OcError::invalid("threads", format!("cannot start worker pool: {e}")))?;
        Ok(Self::Pool(Arc::new(pool)))
    }

    pub fn threads(&self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Pool(pool) => pool.current_num_threads(),
        }
    }

    /// Run `task(0..n)` and collect the results in order.
    ///
    /// The first failing task aborts the batch.
    pub fn map_tasks<T, E, F>(&self, n: usize, task: F) -> Result<Vec<T>, E>
    where
        T: Send,
        E: Send,
        F: Fn(usize) -> Result<T, E> + Sync + Send,
    {
        match self {
            Self::Sequential => (0..n).map(task).collect(),
            Self::Pool(pool) => pool.install(|| (0..n).into_par_iter().map(task).collect()),
        }
    }
}
