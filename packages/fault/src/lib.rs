#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Two kinds of failure, handled two ways.
//!
//! Recoverable errors are values. They propagate with `?` and can be wrapped
//! with a [`context`](ResultExt::context) message on the way up.
//!
//! Panics are not values. [`recover`] is the boundary that turns one back
//! into a [`Panicked`] error, and [`defer`] guards run their cleanup while the
//! stack unwinds through them.

mod context;
mod defer;
mod paint;
mod recover;

pub use context::{ContextError, ResultExt};
pub use defer::{Deferred, defer};
pub use paint::{PaintError, Palette, paint, paint_all};
pub use recover::{Panicked, recover};
