use std::sync::Arc;

use crate::Guarded;

/// A shared counter. Clones refer to the same value.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<Guarded<i64>>,
}

impl Counter {
    #[must_use]
    pub fn new(initial: i64) -> Self {
        Self {
            value: Arc::new(Guarded::new(initial)),
        }
    }

    /// Adds one and returns the new value.
    pub fn increment(&self) -> i64 {
        self.add(1)
    }

    /// Adds `delta` and returns the new value. Saturates at the bounds of
    /// `i64`.
    pub fn add(&self, delta: i64) -> i64 {
        self.value.with(|value| {
            let previous = *value;
            *value = previous.saturating_add(delta);
            if *value != previous.wrapping_add(delta) {
                log::warn!("counter: {previous} + {delta} saturated at {value}");
            }
            log::trace!("counter: {previous} -> {value}");
            *value
        })
    }

    #[must_use]
    pub fn get(&self) -> i64 {
        self.value.with(|value| *value)
    }

    /// Sets the counter back to zero, returning the previous value.
    pub fn reset(&self) -> i64 {
        self.value.with(std::mem::take)
    }
}
