//! Axis Grid Geometry
//!
//! Positions and labels for the analyzer background: vertical frequency
//! lines on the log axis and horizontal gain lines on the dB axis. Painting
//! them is the renderer's job.

use crate::analyzer_path::{map_from_log10, MAX_DISPLAY_FREQ, MIN_DISPLAY_FREQ};
use crate::path::Rect;
use crate::response::db_to_y;

/// Frequencies that get a grid line (Hz)
pub const GRID_FREQUENCIES: [f32; 28] = [
    20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, //
    100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0, 900.0, //
    1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0, 7000.0, 8000.0, 9000.0, //
    10000.0, 20000.0,
];

/// Gains that get a grid line (dB)
pub const GRID_GAINS: [f32; 5] = [24.0, 12.0, 0.0, -12.0, -24.0];

/// One line of the background grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    /// x for frequency lines, y for gain lines
    pub position: f32,
    /// Drawn brighter (decades, 0dB)
    pub major: bool,
    pub label: Option<String>,
}

pub fn is_power_of_ten(value: f32) -> bool {
    if value <= 0.0 {
        return false;
    }
    let log = value.log10();
    (log - log.round()).abs() < 1e-6
}

/// "20", "500", "1k", "20k"
pub fn frequency_label(freq: f32) -> String {
    if freq >= 1000.0 {
        format!("{}k", freq / 1000.0)
    } else {
        format!("{}", freq)
    }
}

/// "+12", "0", "-24"
pub fn gain_label(db: f32) -> String {
    if db > 0.0 {
        format!("+{}", db)
    } else {
        format!("{}", db)
    }
}

/// Vertical lines at [`GRID_FREQUENCIES`]. The 1-2-5 steps of each decade are labelled.
pub fn frequency_grid(bounds: &Rect) -> Vec<GridLine> {
    GRID_FREQUENCIES
        .iter()
        .map(|&freq| {
            let labelled = is_power_of_ten(freq)
                || is_power_of_ten(freq / 2.0)
                || is_power_of_ten(freq / 5.0);
            GridLine {
                position: bounds.left()
                    + bounds.width * map_from_log10(freq, MIN_DISPLAY_FREQ, MAX_DISPLAY_FREQ),
                major: is_power_of_ten(freq),
                label: labelled.then(|| frequency_label(freq)),
            }
        })
        .collect()
}

/// Horizontal lines at [`GRID_GAINS`] over a `±range_db` axis
pub fn gain_grid(bounds: &Rect, range_db: f32) -> Vec<GridLine> {
    GRID_GAINS
        .iter()
        .filter(|db| db.abs() <= range_db)
        .map(|&db| GridLine {
            position: db_to_y(db as f64, range_db as f64, bounds) as f32,
            major: db == 0.0,
            label: Some(gain_label(db)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_of_ten() {
        assert!(is_power_of_ten(10.0));
        assert!(is_power_of_ten(1000.0));
        assert!(!is_power_of_ten(20.0));
        assert!(!is_power_of_ten(0.0));
        assert!(!is_power_of_ten(-100.0));
    }

    #[test]
    fn test_labels() {
        assert_eq!(frequency_label(20.0), "20");
        assert_eq!(frequency_label(500.0), "500");
        assert_eq!(frequency_label(2000.0), "2k");
        assert_eq!(frequency_label(20000.0), "20k");
        assert_eq!(gain_label(12.0), "+12");
        assert_eq!(gain_label(0.0), "0");
        assert_eq!(gain_label(-24.0), "-24");
    }

    #[test]
    fn test_frequency_grid() {
        let bounds = Rect::new(20.0, 0.0, 600.0, 200.0);
        let grid = frequency_grid(&bounds);
        assert_eq!(grid.len(), GRID_FREQUENCIES.len());

        assert!((grid[0].position - 20.0).abs() < 1e-3);
        assert!((grid[grid.len() - 1].position - 620.0).abs() < 1e-3);
        assert!(grid.windows(2).all(|w| w[0].position < w[1].position));

        let labels: Vec<&str> = grid.iter().filter_map(|g| g.label.as_deref()).collect();
        assert_eq!(
            labels,
            vec!["20", "50", "100", "200", "500", "1k", "2k", "5k", "10k", "20k"]
        );

        let majors = grid.iter().filter(|g| g.major).count();
        assert_eq!(majors, 3); // 100, 1k, 10k
    }

    #[test]
    fn test_gain_grid() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 480.0);
        let grid = gain_grid(&bounds, 24.0);
        let positions: Vec<f32> = grid.iter().map(|g| g.position).collect();
        assert_eq!(positions, vec![0.0, 120.0, 240.0, 360.0, 480.0]);
        assert!(grid[2].major);
        assert_eq!(grid[0].label.as_deref(), Some("+24"));

        // Narrower axis hides lines beyond its range
        assert_eq!(gain_grid(&bounds, 12.0).len(), 3);
    }
}
