use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
};

/// A panic caught by [`recover`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("panicked: {message}")]
pub struct Panicked {
    pub message: String,
}

impl Panicked {
    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<non-string panic payload>".to_string());

        Self { message }
    }
}

/// Runs `f`, converting a panic into [`Panicked`].
///
/// The closure is treated as unwind safe. Anything it shared with the caller
/// may be left half-updated after a panic; the locks in `handoff_sync`
/// recover from that on their own.
///
/// The panic hook still runs, so the panic message is printed as usual
/// unless the hook was replaced.
///
/// # Errors
///
/// * [`Panicked`] if `f` panicked
pub fn recover<T>(f: impl FnOnce() -> T) -> Result<T, Panicked> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let panicked = Panicked::from_payload(&*payload);
        log::debug!("recover: caught panic: {}", panicked.message);
        panicked
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test_log::test]
    fn returns_value_when_no_panic() {
        assert_eq!(recover(|| 21 * 2), Ok(42));
    }

    #[test_log::test]
    fn static_str_payload() {
        let result: Result<(), _> = recover(|| panic!("we are screwed"));

        assert_eq!(
            result,
            Err(Panicked {
                message: "we are screwed".to_string()
            })
        );
    }

    #[test_log::test]
    fn formatted_payload() {
        let value = 7;
        let err = recover(|| -> u8 { panic!("bad value {value}") }).unwrap_err();

        assert_eq!(err.message, "bad value 7");
        assert_eq!(err.to_string(), "panicked: bad value 7");
    }

    #[test_log::test]
    fn non_string_payload() {
        let err = recover::<()>(|| std::panic::panic_any(12_u32)).unwrap_err();

        assert_eq!(err.message, "<non-string panic payload>");
    }
}
