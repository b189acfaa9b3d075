//! Error types for queue operations.
//!
//! Send errors hand the rejected value back; use `into_inner` to recover it.
//! Their `Debug` output never prints the value, so they can be unwrapped for
//! any `T`.

use std::fmt;

use crate::cancel::Interrupt;

/// Error returned by [`Sender::send`](crate::Sender::send).
#[derive(Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError<T> {
    /// The queue was closed before the value could be enqueued.
    #[error("sending on a closed queue")]
    Closed(T),
    /// Every receiver has been dropped.
    #[error("sending on a disconnected queue")]
    Disconnected(T),
}

/// Error returned by [`Sender::try_send`](crate::Sender::try_send).
#[derive(Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TrySendError<T> {
    /// The queue is at capacity (or, for a rendezvous queue, no receiver is
    /// waiting).
    #[error("sending on a full queue")]
    Full(T),
    #[error("sending on a closed queue")]
    Closed(T),
    #[error("sending on a disconnected queue")]
    Disconnected(T),
}

/// Error returned by the timed and cancellable send operations.
#[derive(Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendTimeoutError<T> {
    #[error("timed out waiting on send operation")]
    Timeout(T),
    #[error("send operation was cancelled")]
    Cancelled(T),
    #[error("sending on a closed queue")]
    Closed(T),
    #[error("sending on a disconnected queue")]
    Disconnected(T),
}

/// Error returned by [`Receiver::recv`](crate::Receiver::recv).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecvError {
    /// The queue is closed and every buffered value has been received.
    #[error("receiving on a closed and drained queue")]
    Closed,
}

/// Error returned by [`Receiver::try_recv`](crate::Receiver::try_recv).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TryRecvError {
    #[error("receiving on an empty queue")]
    Empty,
    #[error("receiving on a closed and drained queue")]
    Closed,
}

/// Error returned by the timed and cancellable receive operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecvTimeoutError {
    #[error("timed out waiting on receive operation")]
    Timeout,
    #[error("receive operation was cancelled")]
    Cancelled,
    #[error("receiving on a closed and drained queue")]
    Closed,
}

/// Error returned by [`Sender::close`](crate::Sender::close).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CloseError {
    /// `close` was already called on this queue. The queue state is unchanged.
    #[error("queue is already closed")]
    AlreadyClosed,
}

/// Error returned by [`select`](crate::select::select).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    /// Every watched queue is closed and drained (or none was given).
    #[error("all queues are closed and drained")]
    AllClosed,
}

/// Error returned by [`try_select`](crate::select::try_select).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TrySelectError {
    #[error("no queue is ready")]
    NothingReady,
    #[error("all queues are closed and drained")]
    AllClosed,
}

/// Error returned by the timed and cancellable select operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectTimeoutError {
    #[error("timed out waiting on select")]
    Timeout,
    #[error("select was cancelled")]
    Cancelled,
    #[error("all queues are closed and drained")]
    AllClosed,
}

macro_rules! value_error {
    ($name:ident { $($variant:ident),+ $(,)? }) => {
        impl<T> $name<T> {
            /// Returns the value that could not be sent.
            pub fn into_inner(self) -> T {
                match self {
                    $(Self::$variant(value))|+ => value,
                }
            }
        }

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$variant(..) => f.write_str(concat!(stringify!($variant), "(..)")),)+
                }
            }
        }
    };
}

value_error!(SendError { Closed, Disconnected });
value_error!(TrySendError {
    Full,
    Closed,
    Disconnected
});
value_error!(SendTimeoutError {
    Timeout,
    Cancelled,
    Closed,
    Disconnected,
});

impl<T> SendError<T> {
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(..))
    }

    #[must_use]
    pub const fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected(..))
    }
}

impl<T> TrySendError<T> {
    #[must_use]
    pub const fn is_full(&self) -> bool {
        matches!(self, Self::Full(..))
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(..))
    }

    #[must_use]
    pub const fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected(..))
    }
}

impl<T> SendTimeoutError<T> {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(..))
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(..))
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(..))
    }

    pub(crate) fn interrupted(interrupt: Interrupt, value: T) -> Self {
        match interrupt {
            Interrupt::Timeout => Self::Timeout(value),
            Interrupt::Cancelled => Self::Cancelled(value),
        }
    }
}

impl<T> From<SendError<T>> for TrySendError<T> {
    fn from(err: SendError<T>) -> Self {
        match err {
            SendError::Closed(value) => Self::Closed(value),
            SendError::Disconnected(value) => Self::Disconnected(value),
        }
    }
}

impl<T> From<SendError<T>> for SendTimeoutError<T> {
    fn from(err: SendError<T>) -> Self {
        match err {
            SendError::Closed(value) => Self::Closed(value),
            SendError::Disconnected(value) => Self::Disconnected(value),
        }
    }
}

impl RecvTimeoutError {
    pub(crate) const fn interrupted(interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::Timeout => Self::Timeout,
            Interrupt::Cancelled => Self::Cancelled,
        }
    }
}

impl From<RecvError> for TryRecvError {
    fn from(_: RecvError) -> Self {
        Self::Closed
    }
}

impl From<RecvError> for RecvTimeoutError {
    fn from(_: RecvError) -> Self {
        Self::Closed
    }
}

impl SelectTimeoutError {
    pub(crate) const fn interrupted(interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::Timeout => Self::Timeout,
            Interrupt::Cancelled => Self::Cancelled,
        }
    }
}

impl From<SelectError> for TrySelectError {
    fn from(_: SelectError) -> Self {
        Self::AllClosed
    }
}

impl From<SelectError> for SelectTimeoutError {
    fn from(_: SelectError) -> Self {
        Self::AllClosed
    }
}
