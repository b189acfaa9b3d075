#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Bounded multi-producer, multi-consumer queue with blocking handoff.
//!
//! [`bounded`] creates a queue of fixed capacity and returns a [`Sender`] and
//! a [`Receiver`]. Both handles can be cloned and moved across threads.
//!
//! * [`Sender::send`] blocks while the queue is full.
//! * [`Receiver::recv`] blocks while the queue is empty and still open.
//! * [`Sender::close`] marks the queue closed: further sends fail, buffered
//!   values stay receivable, and once they are drained every receive reports
//!   [`RecvError::Closed`].
//! * A capacity of `0` makes every send a rendezvous: the sender only returns
//!   once a receiver has taken its value.
//! * [`select`] receives from whichever of several queues is ready first.
//!
//! Every blocking operation also comes in `_timeout`, `_deadline` and
//! `_cancellable` variants (see [`CancellationToken`]).
//!
//! Values from one producer are received in the order they were sent; there
//! is no ordering between different producers.
//!
//! # Example
//!
//! ```rust
//! use std::thread;
//! use handoff_channel::{RecvError, bounded};
//!
//! let (tx, rx) = bounded::<u32>(3);
//!
//! let producer = thread::spawn(move || {
//!     for i in 1..=5 {
//!         tx.send(i).unwrap();
//!     }
//!     tx.close().unwrap();
//! });
//!
//! let received: Vec<u32> = rx.iter().collect();
//! producer.join().unwrap();
//!
//! assert_eq!(received, vec![1, 2, 3, 4, 5]);
//! assert_eq!(rx.recv(), Err(RecvError::Closed));
//! ```
//!
//! # Handle lifetimes
//!
//! Dropping the last [`Sender`] closes the queue, so consumers never wait on a
//! queue nobody can send to. Dropping the last [`Receiver`] disconnects it:
//! sends fail with `Disconnected` and hand the value back.

mod cancel;
mod error;
mod queue;
pub mod select;
mod signal;

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

pub use cancel::CancellationToken;
pub use error::{
    CloseError, RecvError, RecvTimeoutError, SelectError, SelectTimeoutError, SendError,
    SendTimeoutError, TryRecvError, TrySelectError, TrySendError,
};

use cancel::Wait;
use queue::Queue;

/// Creates a queue that buffers at most `capacity` values.
///
/// A `capacity` of `0` creates a rendezvous queue.
#[must_use]
pub fn bounded<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    let queue = Arc::new(Queue::new(capacity));

    (
        Sender {
            queue: queue.clone(),
        },
        Receiver { queue },
    )
}

/// The sending half of a queue.
pub struct Sender<T> {
    queue: Arc<Queue<T>>,
}

impl<T> Sender<T> {
    /// Enqueues `value`, blocking while the queue is full.
    ///
    /// On a rendezvous queue this returns once a receiver took the value.
    ///
    /// # Errors
    ///
    /// * [`SendError::Closed`] if the queue is (or becomes, while waiting) closed
    /// * [`SendError::Disconnected`] if every receiver has been dropped
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        match self.queue.send(value, &Wait::forever()) {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Closed(value)) => Err(SendError::Closed(value)),
            Err(SendTimeoutError::Disconnected(value)) => Err(SendError::Disconnected(value)),
            Err(SendTimeoutError::Timeout(_) | SendTimeoutError::Cancelled(_)) => {
                unreachable!("a wait without deadline or token is never interrupted")
            }
        }
    }

    /// Enqueues `value` only if that can be done without blocking.
    ///
    /// On a rendezvous queue this succeeds only when a receiver is currently
    /// blocked in a receive call.
    ///
    /// # Errors
    ///
    /// * [`TrySendError::Full`] if there is no room
    /// * [`TrySendError::Closed`] if the queue is closed
    /// * [`TrySendError::Disconnected`] if every receiver has been dropped
    pub fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        self.queue.try_send(value)
    }

    /// Like [`Sender::send`], giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// * [`SendTimeoutError::Timeout`] if no room appeared in time
    /// * [`SendTimeoutError::Closed`] if the queue is closed
    /// * [`SendTimeoutError::Disconnected`] if every receiver has been dropped
    pub fn send_timeout(&self, value: T, timeout: Duration) -> Result<(), SendTimeoutError<T>> {
        self.queue.send(value, &Wait::timeout(timeout))
    }

    /// Like [`Sender::send`], giving up at `deadline`.
    ///
    /// # Errors
    ///
    /// * [`SendTimeoutError::Timeout`] if no room appeared in time
    /// * [`SendTimeoutError::Closed`] if the queue is closed
    /// * [`SendTimeoutError::Disconnected`] if every receiver has been dropped
    pub fn send_deadline(&self, value: T, deadline: Instant) -> Result<(), SendTimeoutError<T>> {
        self.queue.send(value, &Wait::deadline(deadline))
    }

    /// Like [`Sender::send`], giving up when `token` is cancelled.
    ///
    /// # Errors
    ///
    /// * [`SendTimeoutError::Cancelled`] if the token was cancelled first
    /// * [`SendTimeoutError::Closed`] if the queue is closed
    /// * [`SendTimeoutError::Disconnected`] if every receiver has been dropped
    pub fn send_cancellable(
        &self,
        value: T,
        token: &CancellationToken,
    ) -> Result<(), SendTimeoutError<T>> {
        self.queue.send(value, &Wait::cancellable(token))
    }

    /// Closes the queue.
    ///
    /// Wakes every blocked receiver and sender. Buffered values remain
    /// receivable; blocked and future sends fail with `Closed`.
    ///
    /// # Errors
    ///
    /// * [`CloseError::AlreadyClosed`] if the queue was already closed
    pub fn close(&self) -> Result<(), CloseError> {
        self.queue.close()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// `true` once every receiver has been dropped.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.queue.is_disconnected()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Always `true` for a rendezvous queue.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        self.queue.add_sender();
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        self.queue.drop_sender();
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("queue", &self.queue.id())
            .field("capacity", &self.queue.capacity())
            .finish_non_exhaustive()
    }
}

/// The receiving half of a queue.
pub struct Receiver<T> {
    queue: Arc<Queue<T>>,
}

impl<T> Receiver<T> {
    pub(crate) fn queue(&self) -> &Queue<T> {
        &self.queue
    }

    /// Dequeues the next value, blocking while the queue is empty and open.
    ///
    /// # Errors
    ///
    /// * [`RecvError::Closed`] once the queue is closed and drained
    pub fn recv(&self) -> Result<T, RecvError> {
        match self.queue.recv(&Wait::forever()) {
            Ok(value) => Ok(value),
            Err(RecvTimeoutError::Closed) => Err(RecvError::Closed),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Cancelled) => {
                unreachable!("a wait without deadline or token is never interrupted")
            }
        }
    }

    /// Dequeues the next value as a `(value, open)` pair.
    ///
    /// Returns `(Some(value), true)` when a value was received and
    /// `(None, false)` once the queue is closed and drained.
    pub fn recv_open(&self) -> (Option<T>, bool) {
        match self.recv() {
            Ok(value) => (Some(value), true),
            Err(RecvError::Closed) => (None, false),
        }
    }

    /// Dequeues a value only if one is ready.
    ///
    /// On a rendezvous queue this succeeds when a sender is blocked offering
    /// a value.
    ///
    /// # Errors
    ///
    /// * [`TryRecvError::Empty`] if no value is ready
    /// * [`TryRecvError::Closed`] if the queue is closed and drained
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.queue.try_recv()
    }

    /// Like [`Receiver::recv`], giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// * [`RecvTimeoutError::Timeout`] if nothing arrived in time
    /// * [`RecvTimeoutError::Closed`] once the queue is closed and drained
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.queue.recv(&Wait::timeout(timeout))
    }

    /// Like [`Receiver::recv`], giving up at `deadline`.
    ///
    /// # Errors
    ///
    /// * [`RecvTimeoutError::Timeout`] if nothing arrived in time
    /// * [`RecvTimeoutError::Closed`] once the queue is closed and drained
    pub fn recv_deadline(&self, deadline: Instant) -> Result<T, RecvTimeoutError> {
        self.queue.recv(&Wait::deadline(deadline))
    }

    /// Like [`Receiver::recv`], giving up when `token` is cancelled.
    ///
    /// # Errors
    ///
    /// * [`RecvTimeoutError::Cancelled`] if the token was cancelled first
    /// * [`RecvTimeoutError::Closed`] once the queue is closed and drained
    pub fn recv_cancellable(&self, token: &CancellationToken) -> Result<T, RecvTimeoutError> {
        self.queue.recv(&Wait::cancellable(token))
    }

    /// Blocking iterator that ends once the queue is closed and drained.
    #[must_use]
    pub const fn iter(&self) -> Iter<'_, T> {
        Iter { receiver: self }
    }

    /// Non-blocking iterator over the values that are ready right now.
    #[must_use]
    pub const fn try_iter(&self) -> TryIter<'_, T> {
        TryIter { receiver: self }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        self.queue.add_receiver();
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        self.queue.drop_receiver();
    }
}

impl<T> fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("queue", &self.queue.id())
            .field("capacity", &self.queue.capacity())
            .finish_non_exhaustive()
    }
}

/// Blocking iterator returned by [`Receiver::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    receiver: &'a Receiver<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.receiver.recv().ok()
    }
}

/// Non-blocking iterator returned by [`Receiver::try_iter`].
#[derive(Debug)]
pub struct TryIter<'a, T> {
    receiver: &'a Receiver<T>,
}

impl<T> Iterator for TryIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

/// Owning blocking iterator, see [`Receiver::iter`].
#[derive(Debug)]
pub struct IntoIter<T> {
    receiver: Receiver<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.receiver.recv().ok()
    }
}

impl<T> IntoIterator for Receiver<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { receiver: self }
    }
}

impl<'a, T> IntoIterator for &'a Receiver<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test_log::test]
    fn send_then_recv_in_order() {
        let (tx, rx) = bounded(4);

        tx.send(1).unwrap();
        tx.send(2).unwrap();

        assert_eq!(rx.len(), 2);
        assert_eq!(rx.recv(), Ok(1));
        assert_eq!(rx.recv(), Ok(2));
        assert!(rx.is_empty());
    }

    #[test_log::test]
    fn try_send_reports_full_at_capacity() {
        let (tx, _rx) = bounded(2);

        tx.try_send('a').unwrap();
        tx.try_send('b').unwrap();

        assert!(tx.is_full());
        assert_eq!(tx.try_send('c'), Err(TrySendError::Full('c')));
    }

    #[test_log::test]
    fn recv_open_reports_closed_pair() {
        let (tx, rx) = bounded(1);

        tx.send("hello").unwrap();
        tx.close().unwrap();

        assert_eq!(rx.recv_open(), (Some("hello"), true));
        assert_eq!(rx.recv_open(), (None, false));
    }

    #[test_log::test]
    fn try_iter_drains_without_blocking() {
        let (tx, rx) = bounded(3);

        for i in 0..3 {
            tx.send(i).unwrap();
        }

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test_log::test]
    fn rendezvous_queue_reports_zero_len() {
        let (tx, rx) = bounded::<u8>(0);

        assert_eq!(tx.capacity(), 0);
        assert!(tx.is_full());
        assert!(rx.is_empty());
    }

    #[test_log::test]
    fn debug_shows_capacity_without_values() {
        let (tx, _rx) = bounded::<Vec<u8>>(5);
        let debug = format!("{tx:?}");

        assert!(debug.starts_with("Sender {"));
        assert!(debug.contains("capacity: 5"));
    }
}
