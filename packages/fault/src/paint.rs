use std::collections::BTreeMap;

use crate::{ContextError, ResultExt as _};

/// Declared failures of [`paint`]. Match on the variant to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaintError {
    #[error("out of {color} paint")]
    OutOfPaint { color: String },
    #[error("damn thing exploded")]
    Exploded,
}

/// Paint left per color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    paint: BTreeMap<String, u32>,
}

impl Palette {
    pub fn new<S: Into<String>>(paint: impl IntoIterator<Item = (S, u32)>) -> Self {
        Self {
            paint: paint
                .into_iter()
                .map(|(color, amount)| (color.into(), amount))
                .collect(),
        }
    }

    #[must_use]
    pub fn remaining(&self, color: &str) -> Option<u32> {
        self.paint.get(color).copied()
    }
}

/// Uses one unit of `color` from the palette.
///
/// # Errors
///
/// * [`PaintError::OutOfPaint`] if the color is used up
/// * [`PaintError::Exploded`] if the palette never had the color
pub fn paint(color: &str, palette: &mut Palette) -> Result<(), PaintError> {
    let Some(amount) = palette.paint.get_mut(color) else {
        log::debug!("paint: {color} is not on the palette");
        return Err(PaintError::Exploded);
    };

    if *amount == 0 {
        return Err(PaintError::OutOfPaint {
            color: color.to_string(),
        });
    }

    *amount -= 1;
    log::trace!("paint: used {color}, {amount} left");

    Ok(())
}

/// Paints every color in order, stopping at the first failure.
///
/// # Errors
///
/// * The first [`PaintError`], wrapped with the color being painted
pub fn paint_all<'a>(
    colors: impl IntoIterator<Item = &'a str>,
    palette: &mut Palette,
) -> Result<usize, ContextError<PaintError>> {
    let mut painted = 0;

    for color in colors {
        paint(color, palette).with_context(|| format!("while trying to paint {color}"))?;
        painted += 1;
    }

    Ok(painted)
}
