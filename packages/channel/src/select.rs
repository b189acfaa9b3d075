//! Multiplexed receive over several queues.
//!
//! Every function takes a slice of receivers of the same value type and
//! returns the index of the queue that produced the value. When several
//! queues are ready at once, the scan starts at a random index so no queue is
//! starved. Queues that are closed and drained are skipped; once every queue
//! is in that state (or the slice is empty) the select fails with
//! `AllClosed` instead of blocking forever.
//!
//! A select is not counted as a blocked receiver, so a non-blocking
//! [`try_send`](crate::Sender::try_send) on a rendezvous queue does not hand
//! its value to a waiting select. Blocking sends do.
//!
//! ```rust
//! use handoff_channel::{bounded, select};
//!
//! let (numbers_tx, numbers) = bounded::<u32>(1);
//! let (_other_tx, other) = bounded::<u32>(1);
//!
//! numbers_tx.send(42).unwrap();
//!
//! assert_eq!(select::select(&[&other, &numbers]), Ok((1, 42)));
//! ```

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    CancellationToken, Receiver, SelectError, SelectTimeoutError, TrySelectError,
    cancel::Wait,
    queue::Poll,
    signal::Signal,
};

enum Scan<T> {
    Ready(usize, T),
    AllClosed,
    Pending,
}

fn start_index(len: usize) -> usize {
    if len <= 1 { 0 } else { rand::random_range(0..len) }
}

/// Tries every queue once, registering `signal` with the ones still open.
/// On return the signal is registered exactly with the queues that were
/// `Pending`, unless the scan found a value.
fn scan<T>(receivers: &[&Receiver<T>], signal: &Arc<Signal>) -> Scan<T> {
    let len = receivers.len();
    let start = start_index(len);
    let mut closed = 0;

    for offset in 0..len {
        let index = (start + offset) % len;

        match receivers[index].queue().poll_recv(signal) {
            Poll::Ready(value) => {
                unregister(receivers, signal);
                return Scan::Ready(index, value);
            }
            Poll::Closed => closed += 1,
            Poll::Pending => {}
        }
    }

    if closed == len {
        Scan::AllClosed
    } else {
        Scan::Pending
    }
}

fn unregister<T>(receivers: &[&Receiver<T>], signal: &Arc<Signal>) {
    for receiver in receivers {
        receiver.queue().unregister_receiver(signal);
    }
}

fn select_with<T>(
    receivers: &[&Receiver<T>],
    wait: &Wait<'_>,
) -> Result<(usize, T), SelectTimeoutError> {
    let signal = Arc::new(Signal::new());

    loop {
        signal.reset();

        match scan(receivers, &signal) {
            Scan::Ready(index, value) => {
                log::trace!("select: queue index {index} ready");
                return Ok((index, value));
            }
            Scan::AllClosed => {
                unregister(receivers, &signal);
                return Err(SelectTimeoutError::AllClosed);
            }
            Scan::Pending => {}
        }

        if let Some(interrupt) = wait.interrupted() {
            unregister(receivers, &signal);
            return Err(SelectTimeoutError::interrupted(interrupt));
        }

        wait.block(&signal);
        unregister(receivers, &signal);
    }
}

/// Receives from whichever queue is ready first, without blocking.
///
/// # Errors
///
/// * [`TrySelectError::NothingReady`] if every open queue is empty
/// * [`TrySelectError::AllClosed`] if every queue is closed and drained
pub fn try_select<T>(receivers: &[&Receiver<T>]) -> Result<(usize, T), TrySelectError> {
    let len = receivers.len();
    let start = start_index(len);
    let mut closed = 0;

    for offset in 0..len {
        let index = (start + offset) % len;

        match receivers[index].try_recv() {
            Ok(value) => return Ok((index, value)),
            Err(crate::TryRecvError::Closed) => closed += 1,
            Err(crate::TryRecvError::Empty) => {}
        }
    }

    if closed == len {
        Err(TrySelectError::AllClosed)
    } else {
        Err(TrySelectError::NothingReady)
    }
}

/// Blocks until one of the queues yields a value.
///
/// # Errors
///
/// * [`SelectError::AllClosed`] if every queue is closed and drained
pub fn select<T>(receivers: &[&Receiver<T>]) -> Result<(usize, T), SelectError> {
    match select_with(receivers, &Wait::forever()) {
        Ok(selected) => Ok(selected),
        Err(SelectTimeoutError::AllClosed) => Err(SelectError::AllClosed),
        Err(SelectTimeoutError::Timeout | SelectTimeoutError::Cancelled) => {
            unreachable!("a wait without deadline or token is never interrupted")
        }
    }
}

/// Like [`select`], giving up after `timeout`.
///
/// # Errors
///
/// * [`SelectTimeoutError::Timeout`] if nothing arrived in time
/// * [`SelectTimeoutError::AllClosed`] if every queue is closed and drained
pub fn select_timeout<T>(
    receivers: &[&Receiver<T>],
    timeout: Duration,
) -> Result<(usize, T), SelectTimeoutError> {
    select_with(receivers, &Wait::timeout(timeout))
}

/// Like [`select`], giving up at `deadline`.
///
/// # Errors
///
/// * [`SelectTimeoutError::Timeout`] if nothing arrived in time
/// * [`SelectTimeoutError::AllClosed`] if every queue is closed and drained
pub fn select_deadline<T>(
    receivers: &[&Receiver<T>],
    deadline: Instant,
) -> Result<(usize, T), SelectTimeoutError> {
    select_with(receivers, &Wait::deadline(deadline))
}

/// Like [`select`], giving up when `token` is cancelled.
///
/// # Errors
///
/// * [`SelectTimeoutError::Cancelled`] if the token was cancelled first
/// * [`SelectTimeoutError::AllClosed`] if every queue is closed and drained
pub fn select_cancellable<T>(
    receivers: &[&Receiver<T>],
    token: &CancellationToken,
) -> Result<(usize, T), SelectTimeoutError> {
    select_with(receivers, &Wait::cancellable(token))
}
