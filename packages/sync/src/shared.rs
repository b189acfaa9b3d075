use std::sync::RwLock;

use crate::recover_poison;

/// A value readable by many at once and writable by one at a time.
#[derive(Debug, Default)]
pub struct Shared<T> {
    inner: RwLock<T>,
}

impl<T> Shared<T> {
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = recover_poison(self.inner.read(), "Shared::read");
        f(&guard)
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = recover_poison(self.inner.write(), "Shared::write");
        f(&mut guard)
    }

    /// # Errors
    ///
    /// * Whatever error `f` returns
    pub fn try_write<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let mut guard = recover_poison(self.inner.write(), "Shared::try_write");
        f(&mut guard)
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        recover_poison(self.inner.into_inner(), "Shared::into_inner")
    }
}

impl<T> From<T> for Shared<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}
