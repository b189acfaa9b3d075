use std::error::Error;

/// An error wrapped with a message describing what was being attempted.
///
/// Displays as `"<context>: <source>"`. The wrapped error stays reachable
/// through [`Error::source`] and [`ContextError::inner`].
#[derive(Debug, thiserror::Error)]
#[error("{context}: {source}")]
pub struct ContextError<E> {
    context: String,
    source: E,
}

impl<E> ContextError<E> {
    pub fn new(context: impl Into<String>, source: E) -> Self {
        Self {
            context: context.into(),
            source,
        }
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    #[must_use]
    pub const fn inner(&self) -> &E {
        &self.source
    }

    #[must_use]
    pub fn into_inner(self) -> E {
        self.source
    }
}

pub trait ResultExt<T, E> {
    /// Wraps the error, if any, with `context`.
    ///
    /// # Errors
    ///
    /// * The error, wrapped in a [`ContextError`]
    fn context(self, context: impl Into<String>) -> Result<T, ContextError<E>>;

    /// Like [`ResultExt::context`], only building the message on failure.
    ///
    /// # Errors
    ///
    /// * The error, wrapped in a [`ContextError`]
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T, ContextError<E>>;
}

impl<T, E: Error> ResultExt<T, E> for Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T, ContextError<E>> {
        self.map_err(|source| ContextError::new(context, source))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T, ContextError<E>> {
        self.map_err(|source| ContextError::new(f(), source))
    }
}
