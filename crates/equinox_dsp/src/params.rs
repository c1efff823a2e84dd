//! Filter Parameters
//!
//! The user-facing settings of the three-stage equalizer: a low-cut, a
//! parametric peak and a high-cut. The host owns these values; the analysis
//! side only ever reads them as a complete snapshot.

use serde::{Deserialize, Serialize};

/// Lowest frequency exposed to the user (Hz)
pub const MIN_FREQUENCY: f32 = 20.0;

/// Highest frequency exposed to the user (Hz)
pub const MAX_FREQUENCY: f32 = 20000.0;

/// Peak gain range (dB)
pub const MAX_PEAK_GAIN_DB: f32 = 24.0;

/// Peak quality factor range
pub const MIN_PEAK_QUALITY: f32 = 0.1;
pub const MAX_PEAK_QUALITY: f32 = 10.0;

/// Roll-off of a cut stage, in steps of one second-order section (12 dB/oct)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Slope {
    #[default]
    Db12,
    Db24,
    Db36,
    Db48,
}

impl Slope {
    /// Every selectable slope, steepest last
    pub const ALL: [Slope; 4] = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];

    /// Number of cascaded biquad sections this slope enables (1-4)
    pub fn sections(self) -> usize {
        match self {
            Slope::Db12 => 1,
            Slope::Db24 => 2,
            Slope::Db36 => 3,
            Slope::Db48 => 4,
        }
    }

    /// Asymptotic roll-off in dB per octave
    pub fn db_per_octave(self) -> f32 {
        12.0 * self.sections() as f32
    }

    /// Inverse of [`Slope::sections`]
    pub fn from_sections(sections: usize) -> Option<Self> {
        match sections {
            1 => Some(Slope::Db12),
            2 => Some(Slope::Db24),
            3 => Some(Slope::Db36),
            4 => Some(Slope::Db48),
            _ => None,
        }
    }
}

/// Complete parameter snapshot for the filter chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    pub peak_freq: f32,
    pub peak_gain_db: f32,
    pub peak_quality: f32,
    pub low_cut_freq: f32,
    pub low_cut_slope: Slope,
    pub high_cut_freq: f32,
    pub high_cut_slope: Slope,
    #[serde(default)]
    pub peak_bypassed: bool,
    #[serde(default)]
    pub low_cut_bypassed: bool,
    #[serde(default)]
    pub high_cut_bypassed: bool,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            peak_freq: 750.0,
            peak_gain_db: 0.0,
            peak_quality: 1.0,
            low_cut_freq: MIN_FREQUENCY,
            low_cut_slope: Slope::Db12,
            high_cut_freq: MAX_FREQUENCY,
            high_cut_slope: Slope::Db12,
            peak_bypassed: false,
            low_cut_bypassed: false,
            high_cut_bypassed: false,
        }
    }
}

impl FilterParameters {
    pub fn set_peak_freq(&mut self, hz: f32) {
        self.peak_freq = hz.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
    }

    pub fn set_peak_gain_db(&mut self, db: f32) {
        self.peak_gain_db = db.clamp(-MAX_PEAK_GAIN_DB, MAX_PEAK_GAIN_DB);
    }

    pub fn set_peak_quality(&mut self, q: f32) {
        self.peak_quality = q.clamp(MIN_PEAK_QUALITY, MAX_PEAK_QUALITY);
    }

    pub fn set_low_cut_freq(&mut self, hz: f32) {
        self.low_cut_freq = hz.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
    }

    pub fn set_high_cut_freq(&mut self, hz: f32) {
        self.high_cut_freq = hz.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope_sections() {
        let sections: Vec<usize> = Slope::ALL.iter().map(|s| s.sections()).collect();
        assert_eq!(sections, vec![1, 2, 3, 4]);
        assert_eq!(Slope::Db48.db_per_octave(), 48.0);
    }

    #[test]
    fn test_slope_from_sections() {
        for slope in Slope::ALL {
            assert_eq!(Slope::from_sections(slope.sections()), Some(slope));
        }
        assert_eq!(Slope::from_sections(0), None);
        assert_eq!(Slope::from_sections(5), None);
    }

    #[test]
    fn test_default_parameters_are_neutral() {
        let params = FilterParameters::default();
        assert_eq!(params.peak_gain_db, 0.0);
        assert_eq!(params.low_cut_freq, MIN_FREQUENCY);
        assert_eq!(params.high_cut_freq, MAX_FREQUENCY);
        assert_eq!(params.low_cut_slope, Slope::Db12);
        assert!(!params.peak_bypassed);
    }

    #[test]
    fn test_setters_clamp() {
        let mut params = FilterParameters::default();

        params.set_peak_gain_db(100.0);
        assert_eq!(params.peak_gain_db, MAX_PEAK_GAIN_DB);

        params.set_peak_quality(0.0);
        assert_eq!(params.peak_quality, MIN_PEAK_QUALITY);

        params.set_low_cut_freq(5.0);
        assert_eq!(params.low_cut_freq, MIN_FREQUENCY);

        params.set_high_cut_freq(96000.0);
        assert_eq!(params.high_cut_freq, MAX_FREQUENCY);
    }

    #[test]
    fn test_missing_bypass_flags_default_to_active() {
        let json = r#"{
            "peak_freq": 1000.0,
            "peak_gain_db": 6.0,
            "peak_quality": 2.0,
            "low_cut_freq": 80.0,
            "low_cut_slope": "Db24",
            "high_cut_freq": 12000.0,
            "high_cut_slope": "Db48"
        }"#;
        let params: FilterParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.low_cut_slope, Slope::Db24);
        assert_eq!(params.high_cut_slope, Slope::Db48);
        assert!(!params.peak_bypassed);
        assert!(!params.high_cut_bypassed);
    }
}
