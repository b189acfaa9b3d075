//! Fixed-size pool of scoped worker threads.
//!
//! Jobs travel to the workers through one bounded queue and results come
//! back through another:
//!
//! * the caller's thread feeds jobs and closes the job queue after the last
//! * each worker receives until the job queue is closed and drained
//! * the result queue closes when the last worker drops its sender
//!
//! Since the threads are scoped, `work` may borrow from the caller.

use std::thread;

use handoff_channel::{
    CancellationToken, Receiver, RecvTimeoutError, SendTimeoutError, Sender, bounded,
};
use handoff_fault::{Panicked, recover};
use handoff_logging::debug_or_trace;

use crate::{WorkerId, join};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub workers: usize,
    /// Capacity of both the job queue and the result queue. `0` hands every
    /// job over directly.
    pub queue_capacity: usize,
}

impl PoolConfig {
    #[must_use]
    pub const fn new(workers: usize, queue_capacity: usize) -> Self {
        Self {
            workers,
            queue_capacity,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(4, 16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("A worker pool needs at least one worker")]
    NoWorkers,
}

/// Result of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutput<R> {
    /// Position of the job in the input.
    pub index: usize,
    pub worker: WorkerId,
    pub result: Result<R, Panicked>,
}

#[derive(Debug, Clone)]
pub struct WorkerPool {
    config: PoolConfig,
}

impl WorkerPool {
    /// # Errors
    ///
    /// * [`PoolError::NoWorkers`] if `config.workers` is zero
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        if config.workers == 0 {
            return Err(PoolError::NoWorkers);
        }

        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Runs `work` on every job and returns the outputs sorted by job index.
    pub fn run<J, R, F>(&self, jobs: impl IntoIterator<Item = J>, work: F) -> Vec<JobOutput<R>>
    where
        J: Send,
        R: Send,
        F: Fn(WorkerId, J) -> R + Sync,
    {
        self.run_until(jobs, work, &CancellationToken::new())
    }

    /// Like [`WorkerPool::run`], but once `token` is cancelled no further job
    /// is fed or started. Jobs already running finish and are reported.
    pub fn run_until<J, R, F>(
        &self,
        jobs: impl IntoIterator<Item = J>,
        work: F,
        token: &CancellationToken,
    ) -> Vec<JobOutput<R>>
    where
        J: Send,
        R: Send,
        F: Fn(WorkerId, J) -> R + Sync,
    {
        let (job_tx, job_rx) = bounded::<(usize, J)>(self.config.queue_capacity);
        let (result_tx, result_rx) = bounded::<JobOutput<R>>(self.config.queue_capacity);
        let work = &work;

        let mut outputs = thread::scope(|s| {
            for id in (0..self.config.workers).map(WorkerId) {
                let jobs = job_rx.clone();
                let results = result_tx.clone();
                s.spawn(move || worker(id, &jobs, &results, work, token));
            }
            drop(job_rx);
            drop(result_tx);

            let collector = s.spawn(move || result_rx.iter().collect::<Vec<_>>());

            feed(&job_tx, jobs, token);

            join(collector)
        });

        outputs.sort_by_key(|output| output.index);
        log::debug!("pool: {} job(s) completed", outputs.len());

        outputs
    }
}

fn feed<J>(
    job_tx: &Sender<(usize, J)>,
    jobs: impl IntoIterator<Item = J>,
    token: &CancellationToken,
) {
    let mut fed = 0;

    for (index, job) in jobs.into_iter().enumerate() {
        if token.is_cancelled() {
            log::debug!("pool: cancelled after feeding {fed} job(s)");
            break;
        }

        match job_tx.send_cancellable((index, job), token) {
            Ok(()) => fed += 1,
            Err(SendTimeoutError::Cancelled(_)) => {
                log::debug!("pool: cancelled after feeding {fed} job(s)");
                break;
            }
            Err(e) => {
                log::debug!("pool: workers stopped before job {index}: {e}");
                break;
            }
        }
    }

    if let Err(e) = job_tx.close() {
        log::warn!("pool: job queue: {e}");
    }
}

fn worker<J, R>(
    id: WorkerId,
    jobs: &Receiver<(usize, J)>,
    results: &Sender<JobOutput<R>>,
    work: &impl Fn(WorkerId, J) -> R,
    token: &CancellationToken,
) {
    log::debug!("{id}: started");

    loop {
        let (index, job) = match jobs.recv_cancellable(token) {
            Ok(job) => job,
            Err(RecvTimeoutError::Cancelled) => {
                log::debug!("{id}: cancelled");
                break;
            }
            Err(RecvTimeoutError::Closed | RecvTimeoutError::Timeout) => break,
        };

        if token.is_cancelled() {
            log::debug!("{id}: cancelled, dropping job {index}");
            break;
        }

        let result = recover(|| work(id, job));

        match &result {
            Ok(_) => debug_or_trace!(
                ("{id}: finished job"),
                ("{id}: finished job {index}")
            ),
            Err(e) => log::warn!("{id}: job {index} {e}"),
        }

        if let Err(e) = results.send(JobOutput {
            index,
            worker: id,
            result,
        }) {
            log::error!("{id}: could not report job {index}: {e}");
            break;
        }
    }

    log::debug!("{id}: stopped");
}
