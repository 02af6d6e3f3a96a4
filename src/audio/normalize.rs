use rayon::prelude::*;

use super::features::{round_to, NoteFrame};

/// Global min/max over every note level of every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteBounds {
    pub min: f64,
    pub max: f64,
}

impl NoteBounds {
    /// Divisor for the rescale. Falls back to 1 when all values are equal,
    /// which sends every value to exactly 0.
    pub fn range(&self) -> f64 {
        if self.max == self.min {
            1.0
        } else {
            self.max - self.min
        }
    }

    pub fn rescale(&self, value: f64) -> f64 {
        round_to((value - self.min) / self.range(), 4)
    }
}

/// Reduce pass: `None` when no frame holds any note.
pub fn note_bounds(frames: &[NoteFrame]) -> Option<NoteBounds> {
    frames
        .par_iter()
        .flat_map_iter(|frame| frame.notes.values())
        .fold(
            || None,
            |acc: Option<NoteBounds>, v| Some(widen(acc, NoteBounds { min: v, max: v })),
        )
        .reduce(|| None, |a, b| match (a, b) {
            (Some(a), Some(b)) => Some(widen(Some(a), b)),
            (a, None) => a,
            (None, b) => b,
        })
}

fn widen(acc: Option<NoteBounds>, other: NoteBounds) -> NoteBounds {
    match acc {
        Some(b) => NoteBounds {
            min: b.min.min(other.min),
            max: b.max.max(other.max),
        },
        None => other,
    }
}

/// Rewrite pass: rescale every note level in place. Volumes are left alone.
pub fn normalize_notes(frames: &mut [NoteFrame], bounds: NoteBounds) {
    frames.par_iter_mut().for_each(|frame| {
        for level in frame.notes.values_mut() {
            *level = bounds.rescale(*level);
        }
    });
}

/// Both passes back to back. Returns the bounds that were applied.
pub fn normalize(frames: &mut [NoteFrame]) -> Option<NoteBounds> {
    let bounds = note_bounds(frames)?;
    normalize_notes(frames, bounds);
    Some(bounds)
}
