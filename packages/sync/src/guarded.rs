use std::sync::Mutex;

use crate::recover_poison;

/// A value that is only reachable while holding its mutex.
#[derive(Debug, Default)]
pub struct Guarded<T> {
    inner: Mutex<T>,
}

impl<T> Guarded<T> {
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Runs `f` with exclusive access to the value.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = recover_poison(self.inner.lock(), "Guarded::with");
        f(&mut guard)
    }

    /// Runs a fallible `f` with exclusive access to the value. The lock is
    /// released before the result reaches the caller, whichever way it went.
    ///
    /// # Errors
    ///
    /// * Whatever error `f` returns
    pub fn try_with<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let mut guard = recover_poison(self.inner.lock(), "Guarded::try_with");
        f(&mut guard)
    }

    /// Whether a panic happened while the lock was held.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.inner.is_poisoned()
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        recover_poison(self.inner.into_inner(), "Guarded::into_inner")
    }
}

impl<T> From<T> for Guarded<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use pretty_assertions::assert_eq;

    use super::*;

    #[test_log::test]
    fn with_returns_closure_result() {
        let guarded = Guarded::new(vec![1, 2]);

        let len = guarded.with(|v| {
            v.push(3);
            v.len()
        });

        assert_eq!(len, 3);
        assert_eq!(guarded.into_inner(), vec![1, 2, 3]);
    }

    #[test_log::test]
    fn try_with_releases_lock_on_error() {
        let guarded = Guarded::new(0_u32);

        let result: Result<(), &str> = guarded.try_with(|x| {
            *x += 1;
            Err("nope")
        });

        assert_eq!(result, Err("nope"));
        assert_eq!(guarded.with(|x| *x), 1);
    }

    #[test_log::test]
    fn value_stays_usable_after_panic_in_critical_section() {
        let guarded = Arc::new(Guarded::new(String::from("before")));

        let result = {
            let guarded = guarded.clone();
            thread::spawn(move || {
                guarded.with::<()>(|s| {
                    s.push_str(" during");
                    panic!("boom");
                })
            })
            .join()
        };
        assert!(result.is_err());
        assert!(guarded.is_poisoned());

        assert_eq!(guarded.with(|s| s.clone()), "before during");
    }
}
