use std::sync::Mutex;

use handoff_fault::{PaintError, Palette, Panicked, ResultExt as _, defer, paint, recover};
use pretty_assertions::assert_eq;

#[test_log::test]
fn deferred_cleanup_runs_in_reverse_order_while_unwinding() {
    let order = Mutex::new(vec![]);
    let push = |step: &'static str| order.lock().unwrap().push(step);

    let result = recover::<()>(|| {
        let _outer = defer(|| push("outer cleanup"));
        let _inner = defer(|| push("inner cleanup"));
        push("work");
        panic!("we are screwed");
    });

    assert_eq!(
        result,
        Err(Panicked {
            message: "we are screwed".to_string()
        })
    );
    assert_eq!(
        order.into_inner().unwrap(),
        vec!["work", "inner cleanup", "outer cleanup"]
    );
}

#[test_log::test]
fn recovered_error_and_returned_error_compose() {
    fn risky(palette: &mut Palette) -> Result<(), Box<dyn std::error::Error>> {
        paint("red", palette).context("while trying to paint red")?;
        Ok(())
    }

    let mut palette = Palette::new([("red", 0)]);

    let outcome = recover(|| risky(&mut palette).map_err(|e| e.to_string()));

    assert_eq!(
        outcome,
        Ok(Err("while trying to paint red: out of red paint".to_string()))
    );
}

#[test_log::test]
fn declared_error_survives_context_wrapping() {
    let mut palette = Palette::new([("white", 1)]);

    let err = paint("black", &mut palette)
        .with_context(|| "while trying to paint black".to_string())
        .unwrap_err();

    assert!(matches!(err.inner(), PaintError::Exploded));
    assert!(matches!(err.into_inner(), PaintError::Exploded));
}
