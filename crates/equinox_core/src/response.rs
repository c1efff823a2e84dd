//! Filter Response Curve
//!
//! Samples a magnitude function once per horizontal pixel across the
//! log-frequency axis and traces it as an open polyline.

use crate::analyzer_path::{map_to_log10, MAX_DISPLAY_FREQ, MIN_DISPLAY_FREQ};
use crate::path::{PathSink, Point, Rect};

/// Map a dB value onto the vertical extent of `bounds`.
/// `range_db` is the half-range: `+range_db` lands on top, `-range_db` at the bottom.
#[inline]
pub fn db_to_y(db: f64, range_db: f64, bounds: &Rect) -> f64 {
    let bottom = bounds.bottom() as f64;
    let top = bounds.top() as f64;
    bottom + (db + range_db) / (2.0 * range_db) * (top - bottom)
}

/// Frequency shown at horizontal offset `i` of a `width`-pixel axis
#[inline]
pub fn frequency_at(i: usize, width: usize) -> f64 {
    map_to_log10(
        i as f64 / width.max(1) as f64,
        MIN_DISPLAY_FREQ as f64,
        MAX_DISPLAY_FREQ as f64,
    )
}

/// Trace `magnitude_db` (frequency in Hz -> dB) across `bounds`.
///
/// Points whose dB value or mapped position is not finite are skipped; the
/// line simply continues from the last good point. Bounds without a finite,
/// positive area yield an empty path.
pub fn response_curve<P, F>(bounds: Rect, range_db: f64, magnitude_db: F) -> P
where
    P: PathSink + Default,
    F: Fn(f64) -> f64,
{
    let mut path = P::default();
    if !bounds.is_valid() {
        return path;
    }
    let width = bounds.width as usize;
    path.preallocate(width);

    let mut started = false;
    for i in 0..width {
        let db = magnitude_db(frequency_at(i, width));
        let y = db_to_y(db, range_db, &bounds) as f32;
        let point = Point::new(bounds.left() + i as f32, y);
        if !point.is_finite() {
            continue;
        }

        if started {
            path.line_to(point);
        } else {
            path.start_new_sub_path(point);
            started = true;
        }
    }

    path
}
