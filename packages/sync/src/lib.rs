#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Scoped lock acquisition.
//!
//! The types here never hand out guards. Callers pass a closure that runs
//! while the lock is held, and the lock is released as soon as the closure
//! returns, returns an `Err`, or panics.
//!
//! A panic inside a critical section poisons the std lock. The wrappers
//! recover the inner value instead of propagating the poison, and log a
//! warning when they do.

mod counter;
mod guarded;
mod shared;

use std::sync::{LockResult, PoisonError};

pub use counter::Counter;
pub use guarded::Guarded;
pub use shared::Shared;

fn recover_poison<G>(result: LockResult<G>, what: &str) -> G {
    result.unwrap_or_else(|poisoned: PoisonError<G>| {
        log::warn!("{what}: recovering value from a poisoned lock");
        poisoned.into_inner()
    })
}
