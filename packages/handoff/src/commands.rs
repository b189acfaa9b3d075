//! The work behind each subcommand. Output formatting lives in `main`.

use std::{
    cell::RefCell,
    thread,
    time::{Duration, Instant},
};

use handoff_channel::{SelectTimeoutError, Sender, bounded, select};
use handoff_fault::{PaintError, Palette, ResultExt as _, defer, paint, paint_all, recover};
use handoff_sync::Counter;
use handoff_workers::{
    JobOutput, Pipeline, PipelineConfig, PipelineError, PipelineReport, PoolConfig, PoolError,
    WorkerPool,
};

/// Job number that panics in [`squares`].
pub const UNLUCKY_JOB: u64 = 13;

/// # Errors
///
/// * If there are no producers or no consumers
pub fn pipeline(
    producers: usize,
    consumers: usize,
    capacity: usize,
    items: usize,
) -> Result<PipelineReport, PipelineError> {
    let pipeline = Pipeline::new(PipelineConfig {
        producers,
        consumers,
        capacity,
        items_per_producer: items,
    })?;

    Ok(pipeline.run())
}

/// Squares `1..=jobs` on a worker pool. Job [`UNLUCKY_JOB`] panics.
///
/// # Errors
///
/// * If `workers` is zero
pub fn squares(
    workers: usize,
    capacity: usize,
    jobs: u64,
) -> Result<Vec<JobOutput<u64>>, PoolError> {
    let pool = WorkerPool::new(PoolConfig::new(workers, capacity))?;

    Ok(pool.run(1..=jobs, |worker, n| {
        log::trace!("{worker}: squaring {n}");
        assert!(n != UNLUCKY_JOB, "job {n} is unlucky");
        n * n
    }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Number(u64),
    Word(String),
}

#[derive(Debug, Default)]
pub struct SelectSummary {
    /// Queue index and message, in the order they were selected.
    pub received: Vec<(usize, Message)>,
    pub timeouts: usize,
}

const WORDS: [&str; 4] = ["handoff", "rendezvous", "select", "close"];

/// Receives from a queue of numbers and a queue of words until both are
/// closed. Each `select_timeout` that sees nothing within `timeout` is
/// counted.
#[must_use]
pub fn select_messages(timeout: Duration, items: u64) -> SelectSummary {
    let (numbers_tx, numbers) = bounded(1);
    let (words_tx, words) = bounded(1);
    let mut summary = SelectSummary::default();

    thread::scope(|s| {
        s.spawn(move || {
            produce(&numbers_tx, (0..items).map(Message::Number), Duration::ZERO);
        });
        s.spawn(move || {
            produce(
                &words_tx,
                WORDS.iter().map(|w| Message::Word((*w).to_string())),
                timeout * 2,
            );
        });

        loop {
            match select::select_timeout(&[&numbers, &words], timeout) {
                Ok(selected) => summary.received.push(selected),
                Err(SelectTimeoutError::Timeout | SelectTimeoutError::Cancelled) => {
                    log::debug!("select: nothing within {timeout:?}");
                    summary.timeouts += 1;
                }
                Err(SelectTimeoutError::AllClosed) => break,
            }
        }
    });

    summary
}

fn produce(tx: &Sender<Message>, messages: impl Iterator<Item = Message>, pause: Duration) {
    for message in messages {
        thread::sleep(pause);
        if let Err(e) = tx.send(message) {
            log::error!("select producer: {e}");
            return;
        }
    }

    if let Err(e) = tx.close() {
        log::warn!("select producer: {e}");
    }
}

/// Spawns `tasks` threads that each increment one shared counter once.
#[must_use]
pub fn count(tasks: usize) -> i64 {
    let counter = Counter::new(0);
    let started = Instant::now();

    let handles: Vec<_> = (0..tasks)
        .map(|_| {
            let counter = counter.clone();
            thread::spawn(move || counter.increment())
        })
        .collect();

    for handle in handles {
        if let Err(payload) = handle.join() {
            std::panic::resume_unwind(payload);
        }
    }

    log::debug!("counter: {tasks} task(s) in {:?}", started.elapsed());

    counter.get()
}

/// Walks through returned errors, declared errors, a recovered panic and
/// deferred cleanup. Returns one line per event, in the order they happened.
#[must_use]
pub fn recover_demo() -> Vec<String> {
    let lines = RefCell::new(vec![]);
    let say = |line: String| lines.borrow_mut().push(line);

    let mut palette = Palette::new([("red", 1), ("blue", 0)]);

    match paint_all(["red", "red"], &mut palette) {
        Ok(painted) => say(format!("painted {painted} wall(s)")),
        Err(e) => say(format!("error: {e}")),
    }

    match paint("blue", &mut palette) {
        Err(PaintError::OutOfPaint { color }) => say(format!("declared error: no {color} left")),
        Err(e) => say(format!("unexpected error: {e}")),
        Ok(()) => say("painted blue".to_string()),
    }

    if let Err(e) = paint("mauve", &mut palette).context("while trying to paint mauve") {
        say(format!("error: {e}"));
    }

    {
        say("enter".to_string());
        let _executed = defer(|| say("executed".to_string()));
        {
            let _block = defer(|| say("block exit".to_string()));
        }
        say("exit".to_string());
    }

    let caught = recover(|| {
        let _cleanup = defer(|| say("cleanup while unwinding".to_string()));
        panic!("we are screwed");
    });
    match caught {
        Ok(()) => say("no panic".to_string()),
        Err(e) => say(format!("recovered: {}", e.message)),
    }

    lines.into_inner()
}
