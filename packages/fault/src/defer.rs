use std::fmt;

/// Runs a closure when dropped, unless [cancelled](Deferred::cancel).
///
/// Guards are dropped in reverse declaration order, at the end of the
/// enclosing block, and also while a panic unwinds through that block.
#[must_use = "the closure runs as soon as an unbound guard is dropped"]
pub struct Deferred<F: FnOnce()> {
    f: Option<F>,
}

/// Schedules `f` to run when the returned guard goes out of scope.
///
/// ```rust
/// use std::cell::RefCell;
///
/// let order = RefCell::new(vec![]);
/// {
///     let _first = handoff_fault::defer(|| order.borrow_mut().push("first"));
///     let _second = handoff_fault::defer(|| order.borrow_mut().push("second"));
///     order.borrow_mut().push("body");
/// }
///
/// assert_eq!(order.into_inner(), vec!["body", "second", "first"]);
/// ```
pub const fn defer<F: FnOnce()>(f: F) -> Deferred<F> {
    Deferred { f: Some(f) }
}

impl<F: FnOnce()> Deferred<F> {
    /// Disarms the guard without running the closure.
    pub fn cancel(mut self) {
        self.f = None;
    }
}

impl<F: FnOnce()> Drop for Deferred<F> {
    fn drop(&mut self) {
        if let Some(f) = self.f.take() {
            f();
        }
    }
}

impl<F: FnOnce()> fmt::Debug for Deferred<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("armed", &self.f.is_some())
            .finish()
    }
}
