//! Analyzer Curve Generator
//!
//! Converts dB spectra into a fillable closed curve: per-bin attack/decay
//! envelope smoothing, then a log-frequency / linear-dB mapping into the
//! caller's bounds. Bins are visited with a stride that widens towards
//! Nyquist, and neighbouring samples are joined by quadratic segments through
//! their midpoint, so the path stays small without looking jagged.

use crate::fifo::{fifo, FifoReader, FifoWriter};
use crate::error::AnalysisResult;
use crate::path::{CurvePath, PathSink, Point, Rect};

/// Lower edge of the displayed frequency axis (Hz)
pub const MIN_DISPLAY_FREQ: f32 = 20.0;

/// Upper edge of the displayed frequency axis (Hz)
pub const MAX_DISPLAY_FREQ: f32 = 20000.0;

/// Normalized [0, 1] position of `freq` on a log axis spanning `min..max`
#[inline]
pub fn map_from_log10(freq: f32, min: f32, max: f32) -> f32 {
    (freq / min).log10() / (max / min).log10()
}

/// Inverse of [`map_from_log10`]
#[inline]
pub fn map_to_log10(normalized: f64, min: f64, max: f64) -> f64 {
    min * (max / min).powf(normalized)
}

/// Linear remap of `value` from `src_min..src_max` onto `dst_min..dst_max`
#[inline]
pub fn jmap(value: f32, src_min: f32, src_max: f32, dst_min: f32, dst_max: f32) -> f32 {
    dst_min + (value - src_min) / (src_max - src_min) * (dst_max - dst_min)
}

/// Frame-to-frame smoothing of a spectrum, one state value per bin
#[derive(Debug, Clone)]
pub struct Envelope {
    values: Vec<f32>,
    /// Fraction of the gap closed per frame when rising
    attack: f32,
    /// dB lost per frame when falling
    decay_db: f32,
}

impl Envelope {
    pub fn new(attack: f32, decay_db: f32) -> Self {
        Self {
            values: Vec::new(),
            attack,
            decay_db,
        }
    }

    /// Seed every bin to `floor_db`
    pub fn reset(&mut self, bins: usize, floor_db: f32) {
        self.values.clear();
        self.values.resize(bins, floor_db);
    }

    /// Advance one frame towards `input`. Reseeds on a bin-count change.
    pub fn update(&mut self, input: &[f32], floor_db: f32) {
        if self.values.len() != input.len() {
            self.reset(input.len(), floor_db);
        }

        for (env, &value) in self.values.iter_mut().zip(input) {
            // Non-finite bins read as silence so the state stays finite
            let value = if value.is_finite() { value } else { floor_db };
            if !env.is_finite() {
                *env = floor_db;
            }

            if value > *env {
                *env += (value - *env) * self.attack;
            } else {
                // Linear fall, never below the true value
                *env = (*env - self.decay_db).max(value);
            }
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn set_attack(&mut self, attack: f32) {
        self.attack = attack;
    }

    pub fn set_decay_db(&mut self, decay_db: f32) {
        self.decay_db = decay_db;
    }
}

/// Bin stride range used while walking the spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathResolution {
    pub min_stride: usize,
    pub max_stride: usize,
}

impl Default for PathResolution {
    fn default() -> Self {
        Self {
            min_stride: 2,
            max_stride: 20,
        }
    }
}

impl PathResolution {
    /// Stride to the next sampled bin, growing linearly from DC to Nyquist
    #[inline]
    pub fn stride(&self, bin: usize, num_bins: usize) -> usize {
        let span = self.max_stride.saturating_sub(self.min_stride);
        let stride = self.min_stride + bin * span / num_bins.max(1);
        stride.max(1)
    }
}

/// Builds analyzer curves and queues them for the renderer
pub struct AnalyzerPathGenerator<P = CurvePath> {
    envelope: Envelope,
    resolution: PathResolution,
    output: FifoWriter<P>,
}

impl<P: PathSink + Default> AnalyzerPathGenerator<P> {
    /// Create a generator and the reader for its curves
    pub fn new(
        attack: f32,
        decay_db: f32,
        resolution: PathResolution,
        capacity: usize,
    ) -> AnalysisResult<(Self, FifoReader<P>)> {
        let (output, reader) = fifo(capacity)?;
        let generator = Self {
            envelope: Envelope::new(attack, decay_db),
            resolution,
            output,
        };
        Ok((generator, reader))
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }

    pub fn set_resolution(&mut self, resolution: PathResolution) {
        self.resolution = resolution;
    }

    /// Smooth `spectrum` into the envelope, build a curve and queue it.
    ///
    /// Returns false if the curve FIFO was full or `bounds` has no drawable
    /// area. The envelope advances either way.
    pub fn generate(
        &mut self,
        spectrum: &[f32],
        bounds: Rect,
        fft_size: usize,
        bin_width: f32,
        negative_infinity_db: f32,
    ) -> bool {
        let num_bins = (fft_size / 2).min(spectrum.len());
        debug_assert_eq!(spectrum.len(), fft_size / 2, "Spectrum does not match FFT size");

        self.envelope.update(spectrum, negative_infinity_db);
        if !bounds.is_valid() {
            return false;
        }

        let path = build_path::<P>(
            &self.envelope.values()[..num_bins],
            bounds,
            bin_width,
            negative_infinity_db,
            self.resolution,
        );
        self.output.write(path)
    }
}

/// Trace `envelope` (dB per bin) into a closed contour.
///
/// Starts at the bottom-left corner (the floor), rises to the first plotted
/// bin, follows the spectrum and returns to the floor at the bottom-right
/// corner. Non-finite samples are skipped. Bounds without a finite, positive
/// area yield an empty path.
pub fn build_path<P: PathSink + Default>(
    envelope: &[f32],
    bounds: Rect,
    bin_width: f32,
    negative_infinity_db: f32,
    resolution: PathResolution,
) -> P {
    let mut path = P::default();
    if !bounds.is_valid() {
        return path;
    }

    let num_bins = envelope.len();
    let (left, right) = (bounds.left(), bounds.right());
    let (top, bottom) = (bounds.top(), bounds.bottom());

    let map_y = |db: f32| jmap(db, negative_infinity_db, 0.0, bottom, top);
    let map_x = |freq: f32| {
        let x = left + bounds.width * map_from_log10(freq, MIN_DISPLAY_FREQ, MAX_DISPLAY_FREQ);
        // Sub-20Hz bins (and DC's -inf) pin to the left edge
        x.clamp(left, right)
    };
    let point_at = |bin: usize| {
        let freq = bin as f32 * bin_width;
        (Point::new(map_x(freq), map_y(envelope[bin])), freq)
    };

    path.preallocate(3 * bounds.width as usize + 4);
    path.start_new_sub_path(Point::new(left, bottom));

    let mut started = false;
    let mut bin = 1;
    while bin < num_bins {
        let stride = resolution.stride(bin, num_bins);
        let (point, freq) = point_at(bin);

        if point.is_finite() {
            if !started {
                path.line_to(Point::new(left, point.y));
                started = true;
            }

            let next = bin + stride;
            let beyond_display = freq >= MAX_DISPLAY_FREQ;
            let next_point = (next < num_bins && !beyond_display)
                .then(|| point_at(next).0)
                .filter(|p| p.is_finite());

            match next_point {
                Some(next_point) => path.quadratic_to(point, point.midpoint(next_point)),
                None => path.line_to(point),
            }

            if beyond_display {
                break;
            }
        }

        bin += stride;
    }

    path.line_to(Point::new(right, bottom));
    path.close_sub_path();
    path
}
