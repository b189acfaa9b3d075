//! The shared queue core behind [`Sender`](crate::Sender) and
//! [`Receiver`](crate::Receiver).
//!
//! All state sits behind one mutex. Blocked operations park on a [`Signal`]
//! registered in `send_waiters` or `recv_waiters`; every state change that
//! could unblock the other side drains the matching list and notifies each
//! signal, and the woken operation re-checks the state under the lock.
//!
//! A capacity of zero is a rendezvous queue: the buffer holds at most one
//! *offer*, and the sender that made it stays blocked until a receiver has
//! taken it (tracked with the `sent`/`received` counters).

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    RecvTimeoutError, SendTimeoutError, TryRecvError, TrySendError,
    cancel::{Interrupt, Wait},
    error::CloseError,
    signal::Signal,
};

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

pub(crate) struct Queue<T> {
    id: usize,
    capacity: usize,
    state: Mutex<State<T>>,
}

struct State<T> {
    buffer: VecDeque<T>,
    closed: bool,
    senders: usize,
    receivers: usize,
    sent: u64,
    received: u64,
    /// Receivers parked inside a receive call. Only these can complete a
    /// non-blocking rendezvous send.
    blocked_receivers: usize,
    send_waiters: Vec<Arc<Signal>>,
    recv_waiters: Vec<Arc<Signal>>,
}

/// Outcome of a non-blocking receive attempt made on behalf of a select.
pub(crate) enum Poll<T> {
    Ready(T),
    Closed,
    Pending,
}

impl<T> State<T> {
    fn wake_senders(&mut self) {
        for signal in self.send_waiters.drain(..) {
            signal.notify();
        }
    }

    fn wake_receivers(&mut self) {
        for signal in self.recv_waiters.drain(..) {
            signal.notify();
        }
    }

    fn push(&mut self, value: T) -> u64 {
        self.buffer.push_back(value);
        let ticket = self.sent;
        self.sent += 1;
        self.wake_receivers();
        ticket
    }

    fn pop(&mut self) -> Option<T> {
        let value = self.buffer.pop_front()?;
        self.received += 1;
        self.wake_senders();
        Some(value)
    }

    fn unregister_sender(&mut self, signal: &Arc<Signal>) {
        self.send_waiters.retain(|x| !Arc::ptr_eq(x, signal));
    }

    fn unregister_receiver(&mut self, signal: &Arc<Signal>) {
        self.recv_waiters.retain(|x| !Arc::ptr_eq(x, signal));
    }
}

impl<T> Queue<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        log::trace!("queue#{id}: created capacity={capacity}");

        Self {
            id,
            capacity,
            state: Mutex::new(State {
                buffer: VecDeque::with_capacity(capacity.max(1)),
                closed: false,
                senders: 1,
                receivers: 1,
                sent: 0,
                received: 0,
                blocked_receivers: 0,
                send_waiters: vec![],
                recv_waiters: vec![],
            }),
        }
    }

    pub(crate) const fn id(&self) -> usize {
        self.id
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The buffer may hold one more value than a rendezvous queue's capacity:
    /// the pending offer.
    const fn slots(&self) -> usize {
        if self.capacity == 0 { 1 } else { self.capacity }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of buffered values. A pending rendezvous offer is not counted.
    pub(crate) fn len(&self) -> usize {
        self.lock().buffer.len().min(self.capacity)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub(crate) fn is_disconnected(&self) -> bool {
        self.lock().receivers == 0
    }

    pub(crate) fn add_sender(&self) {
        self.lock().senders += 1;
    }

    pub(crate) fn add_receiver(&self) {
        self.lock().receivers += 1;
    }

    /// The last sender going away closes the queue so receivers drain and
    /// stop instead of blocking forever.
    pub(crate) fn drop_sender(&self) {
        let mut state = self.lock();
        state.senders -= 1;

        if state.senders == 0 && !state.closed {
            log::debug!("queue#{}: last sender dropped, closing", self.id);
            state.closed = true;
            state.wake_receivers();
            state.wake_senders();
        }
    }

    pub(crate) fn drop_receiver(&self) {
        let mut state = self.lock();
        state.receivers -= 1;

        if state.receivers == 0 {
            log::debug!(
                "queue#{}: last receiver dropped, disconnecting ({} value(s) left behind)",
                self.id,
                state.buffer.len(),
            );
            state.wake_senders();
        }
    }

    pub(crate) fn close(&self) -> Result<(), CloseError> {
        let mut state = self.lock();

        if state.closed {
            log::warn!("queue#{}: close called on an already closed queue", self.id);
            return Err(CloseError::AlreadyClosed);
        }

        state.closed = true;
        log::debug!(
            "queue#{}: closed with {} buffered value(s)",
            self.id,
            state.buffer.len()
        );
        state.wake_receivers();
        state.wake_senders();

        Ok(())
    }

    pub(crate) fn try_send(&self, value: T) -> Result<(), TrySendError<T>> {
        let mut state = self.lock();

        if state.receivers == 0 {
            return Err(TrySendError::Disconnected(value));
        }
        if state.closed {
            return Err(TrySendError::Closed(value));
        }

        let accepted = if self.capacity == 0 {
            state.buffer.is_empty() && state.blocked_receivers > 0
        } else {
            state.buffer.len() < self.capacity
        };

        if !accepted {
            return Err(TrySendError::Full(value));
        }

        state.push(value);
        drop(state);
        log::trace!("queue#{}: try_send accepted", self.id);

        Ok(())
    }

    pub(crate) fn send(&self, value: T, wait: &Wait<'_>) -> Result<(), SendTimeoutError<T>> {
        let signal = Arc::new(Signal::new());
        let mut state = self.lock();

        loop {
            if state.receivers == 0 {
                return Err(SendTimeoutError::Disconnected(value));
            }
            if state.closed {
                return Err(SendTimeoutError::Closed(value));
            }

            if state.buffer.len() < self.slots() {
                let ticket = state.push(value);

                if self.capacity == 0 {
                    return self.await_pickup(state, ticket, wait, &signal);
                }

                return Ok(());
            }

            if let Some(interrupt) = wait.interrupted() {
                return Err(SendTimeoutError::interrupted(interrupt, value));
            }

            log::trace!("queue#{}: send blocked, queue full", self.id);
            signal.reset();
            state.send_waiters.push(signal.clone());
            drop(state);

            wait.block(&signal);

            state = self.lock();
            state.unregister_sender(&signal);
        }
    }

    /// Blocks a rendezvous sender until a receiver has taken the offer with
    /// the given ticket. If the wait ends first, the offer is taken back
    /// (it is the only value a rendezvous buffer can hold).
    fn await_pickup<'a>(
        &'a self,
        mut state: MutexGuard<'a, State<T>>,
        ticket: u64,
        wait: &Wait<'_>,
        signal: &Arc<Signal>,
    ) -> Result<(), SendTimeoutError<T>> {
        loop {
            if state.received > ticket {
                log::trace!("queue#{}: rendezvous completed", self.id);
                return Ok(());
            }

            let failure: Option<fn(T) -> SendTimeoutError<T>> = if state.receivers == 0 {
                Some(SendTimeoutError::Disconnected)
            } else if state.closed {
                Some(SendTimeoutError::Closed)
            } else {
                match wait.interrupted() {
                    Some(Interrupt::Timeout) => Some(SendTimeoutError::Timeout),
                    Some(Interrupt::Cancelled) => Some(SendTimeoutError::Cancelled),
                    None => None,
                }
            };

            if let Some(failure) = failure {
                let Some(value) = state.buffer.pop_back() else {
                    return Ok(());
                };
                state.sent -= 1;
                state.wake_senders();
                log::trace!("queue#{}: rendezvous offer withdrawn", self.id);
                return Err(failure(value));
            }

            signal.reset();
            state.send_waiters.push(signal.clone());
            drop(state);

            wait.block(signal);

            state = self.lock();
            state.unregister_sender(signal);
        }
    }

    pub(crate) fn try_recv(&self) -> Result<T, TryRecvError> {
        let mut state = self.lock();

        if let Some(value) = state.pop() {
            return Ok(value);
        }
        if state.closed {
            return Err(TryRecvError::Closed);
        }

        Err(TryRecvError::Empty)
    }

    pub(crate) fn recv(&self, wait: &Wait<'_>) -> Result<T, RecvTimeoutError> {
        let signal = Arc::new(Signal::new());
        let mut state = self.lock();
        let mut blocked = false;

        let result = loop {
            // A value is taken even when the wait has just expired: a
            // rendezvous sender may have handed it to this receiver.
            if let Some(value) = state.pop() {
                break Ok(value);
            }
            if state.closed {
                break Err(RecvTimeoutError::Closed);
            }
            if let Some(interrupt) = wait.interrupted() {
                break Err(RecvTimeoutError::interrupted(interrupt));
            }

            if !blocked {
                blocked = true;
                state.blocked_receivers += 1;
            }

            log::trace!("queue#{}: recv blocked, queue empty", self.id);
            signal.reset();
            state.recv_waiters.push(signal.clone());
            drop(state);

            wait.block(&signal);

            state = self.lock();
            state.unregister_receiver(&signal);
        };

        if blocked {
            state.blocked_receivers -= 1;
        }

        result
    }

    /// Takes a value if one is ready; otherwise registers `signal` to be
    /// notified when this queue changes. Used by select.
    pub(crate) fn poll_recv(&self, signal: &Arc<Signal>) -> Poll<T> {
        let mut state = self.lock();

        if let Some(value) = state.pop() {
            return Poll::Ready(value);
        }
        if state.closed {
            return Poll::Closed;
        }

        state.recv_waiters.push(signal.clone());
        Poll::Pending
    }

    pub(crate) fn unregister_receiver(&self, signal: &Arc<Signal>) {
        self.lock().unregister_receiver(signal);
    }
}
