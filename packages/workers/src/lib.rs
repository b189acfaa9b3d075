#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod pipeline;
pub mod pool;

use std::{any::Any, fmt, thread::ScopedJoinHandle};

pub use pipeline::{Item, Pipeline, PipelineConfig, PipelineError, PipelineReport};
pub use pool::{JobOutput, PoolConfig, PoolError, WorkerPool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Joins a scoped thread, re-raising its panic on the current thread.
fn join<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload: Box<dyn Any + Send>| std::panic::resume_unwind(payload))
}
