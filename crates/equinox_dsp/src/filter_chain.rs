//! Three-Stage Filter Chain
//!
//! Low-cut -> peak -> high-cut, built from BiQuad sections based on the
//! RBJ (Robert Bristow-Johnson) Audio EQ Cookbook.
//!
//! Each cut stage always holds [`MAX_CUT_SECTIONS`] sections. The selected
//! slope enables the first `k` of them and bypasses the rest, so changing the
//! slope only toggles flags and never reallocates.

use biquad::{Biquad, Coefficients, DirectForm2Transposed, Hertz, ToHertz, Type};

use crate::error::{DspError, DspResult};
use crate::params::{FilterParameters, Slope};

/// Sections per cut stage (48 dB/oct at the steepest slope)
pub const MAX_CUT_SECTIONS: usize = 4;

/// Design frequencies are held below this fraction of the sample rate
const NYQUIST_LIMIT: f32 = 0.499;

/// Position of a stage in the chain, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPosition {
    LowCut,
    Peak,
    HighCut,
}

/// Unity-gain pass-through coefficients
fn identity() -> Coefficients<f32> {
    Coefficients {
        a1: 0.0,
        a2: 0.0,
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
    }
}

/// Evaluate |H(e^jw)| of one biquad at `frequency`
///
/// H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
fn section_magnitude(c: &Coefficients<f32>, frequency: f64, sample_rate: f64) -> f64 {
    let omega = 2.0 * std::f64::consts::PI * frequency / sample_rate;
    let (sin1, cos1) = omega.sin_cos();
    let (sin2, cos2) = (2.0 * omega).sin_cos();

    let (b0, b1, b2) = (c.b0 as f64, c.b1 as f64, c.b2 as f64);
    let (a1, a2) = (c.a1 as f64, c.a2 as f64);

    let num_re = b0 + b1 * cos1 + b2 * cos2;
    let num_im = -(b1 * sin1 + b2 * sin2);
    let den_re = 1.0 + a1 * cos1 + a2 * cos2;
    let den_im = -(a1 * sin1 + a2 * sin2);

    (num_re.hypot(num_im)) / den_re.hypot(den_im)
}

/// Q of section `index` in an order-`2 * sections` Butterworth cascade
pub fn butterworth_q(index: usize, sections: usize) -> f32 {
    let order = 2.0 * sections as f64;
    let theta = std::f64::consts::PI * (2 * index + 1) as f64 / (2.0 * order);
    (1.0 / (2.0 * theta.cos())) as f32
}

/// Design the peak stage: a single RBJ peaking-EQ biquad
pub fn make_peak_filter(params: &FilterParameters, sample_rate: f32) -> DspResult<Coefficients<f32>> {
    validate_sample_rate(sample_rate)?;
    Coefficients::<f32>::from_params(
        Type::PeakingEQ(params.peak_gain_db),
        sample_rate.hz(),
        design_frequency(params.peak_freq, sample_rate)?,
        params.peak_quality,
    )
    .map_err(|_| DspError::InvalidCoefficients {
        frequency: params.peak_freq,
        sample_rate,
    })
}

/// Design the low-cut stage (Butterworth high-pass cascade)
pub fn make_low_cut_filter(
    params: &FilterParameters,
    sample_rate: f32,
) -> DspResult<[Coefficients<f32>; MAX_CUT_SECTIONS]> {
    make_cut_filter(CutKind::LowCut, params.low_cut_freq, params.low_cut_slope, sample_rate)
}

/// Design the high-cut stage (Butterworth low-pass cascade)
pub fn make_high_cut_filter(
    params: &FilterParameters,
    sample_rate: f32,
) -> DspResult<[Coefficients<f32>; MAX_CUT_SECTIONS]> {
    make_cut_filter(CutKind::HighCut, params.high_cut_freq, params.high_cut_slope, sample_rate)
}

#[derive(Clone, Copy)]
enum CutKind {
    LowCut,
    HighCut,
}

/// Sections past the slope's count are left as identity
fn make_cut_filter(
    kind: CutKind,
    frequency: f32,
    slope: Slope,
    sample_rate: f32,
) -> DspResult<[Coefficients<f32>; MAX_CUT_SECTIONS]> {
    validate_sample_rate(sample_rate)?;
    let cutoff = design_frequency(frequency, sample_rate)?;
    let sections = slope.sections();
    let mut coeffs = [identity(); MAX_CUT_SECTIONS];

    for (i, slot) in coeffs.iter_mut().take(sections).enumerate() {
        let filter = match kind {
            CutKind::LowCut => Type::HighPass,
            CutKind::HighCut => Type::LowPass,
        };
        *slot = Coefficients::<f32>::from_params(
            filter,
            sample_rate.hz(),
            cutoff,
            butterworth_q(i, sections),
        )
        .map_err(|_| DspError::InvalidCoefficients {
            frequency,
            sample_rate,
        })?;
    }

    Ok(coeffs)
}

/// Pull `frequency` just below Nyquist so a 20kHz corner still designs at
/// 22.05kHz or 32kHz. Zero, negative and non-finite frequencies are rejected.
fn design_frequency(frequency: f32, sample_rate: f32) -> DspResult<Hertz<f32>> {
    let invalid = DspError::InvalidCoefficients {
        frequency,
        sample_rate,
    };
    if !frequency.is_finite() {
        return Err(invalid);
    }
    Hertz::<f32>::from_hz(frequency.min(NYQUIST_LIMIT * sample_rate)).map_err(|_| invalid)
}

fn validate_sample_rate(sample_rate: f32) -> DspResult<()> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(DspError::InvalidSampleRate(sample_rate))
    }
}

/// One biquad with its coefficients, delay line and enable flag
struct Section {
    coefficients: Coefficients<f32>,
    // DirectForm2Transposed: better numerical stability than DF1
    filter: DirectForm2Transposed<f32>,
    enabled: bool,
}

impl Section {
    fn new() -> Self {
        Self {
            coefficients: identity(),
            filter: DirectForm2Transposed::<f32>::new(identity()),
            enabled: false,
        }
    }

    fn set(&mut self, coefficients: Coefficients<f32>, enabled: bool) {
        self.coefficients = coefficients;
        self.filter.update_coefficients(coefficients);
        self.enabled = enabled;
    }

    /// Bypassed sections contribute unity
    fn magnitude(&self, frequency: f64, sample_rate: f64) -> f64 {
        if self.enabled {
            section_magnitude(&self.coefficients, frequency, sample_rate)
        } else {
            1.0
        }
    }

    #[inline]
    fn run(&mut self, sample: f32) -> f32 {
        if self.enabled {
            self.filter.run(sample)
        } else {
            sample
        }
    }
}

/// A cut stage: a fixed cascade of up to four Butterworth sections
struct CutFilter {
    sections: [Section; MAX_CUT_SECTIONS],
}

impl CutFilter {
    fn new() -> Self {
        Self {
            sections: core::array::from_fn(|_| Section::new()),
        }
    }

    fn update(&mut self, coeffs: &[Coefficients<f32>; MAX_CUT_SECTIONS], slope: Slope, bypassed: bool) {
        let active = if bypassed { 0 } else { slope.sections() };
        for (i, (section, c)) in self.sections.iter_mut().zip(coeffs).enumerate() {
            section.set(*c, i < active);
        }
    }

    fn enabled_sections(&self) -> usize {
        self.sections.iter().filter(|s| s.enabled).count()
    }

    fn magnitude(&self, frequency: f64, sample_rate: f64) -> f64 {
        self.sections
            .iter()
            .map(|s| s.magnitude(frequency, sample_rate))
            .product()
    }

    #[inline]
    fn run(&mut self, sample: f32) -> f32 {
        self.sections.iter_mut().fold(sample, |x, s| s.run(x))
    }

    fn reset(&mut self) {
        for section in &mut self.sections {
            section.filter.reset_state();
        }
    }
}

/// The complete low-cut / peak / high-cut cascade for one channel
///
/// Coefficient updates happen between buffers via [`FilterChain::update`].
/// Magnitude queries are pure reads of the current coefficients.
pub struct FilterChain {
    low_cut: CutFilter,
    peak: Section,
    high_cut: CutFilter,
    parameters: FilterParameters,
    sample_rate: f32,
}

impl FilterChain {
    /// Create a chain with default parameters
    pub fn new(sample_rate: f32) -> DspResult<Self> {
        Self::with_parameters(FilterParameters::default(), sample_rate)
    }

    pub fn with_parameters(parameters: FilterParameters, sample_rate: f32) -> DspResult<Self> {
        validate_sample_rate(sample_rate)?;
        let mut chain = Self {
            low_cut: CutFilter::new(),
            peak: Section::new(),
            high_cut: CutFilter::new(),
            parameters,
            sample_rate,
        };
        chain.update(&parameters)?;
        Ok(chain)
    }

    /// Recompute every stage from a parameter snapshot.
    ///
    /// All coefficients are designed before any is applied: on error the
    /// chain keeps its previous state untouched.
    pub fn update(&mut self, parameters: &FilterParameters) -> DspResult<()> {
        let peak = make_peak_filter(parameters, self.sample_rate)?;
        let low_cut = make_low_cut_filter(parameters, self.sample_rate)?;
        let high_cut = make_high_cut_filter(parameters, self.sample_rate)?;

        self.peak.set(peak, !parameters.peak_bypassed);
        self.low_cut
            .update(&low_cut, parameters.low_cut_slope, parameters.low_cut_bypassed);
        self.high_cut
            .update(&high_cut, parameters.high_cut_slope, parameters.high_cut_bypassed);
        self.parameters = *parameters;
        Ok(())
    }

    /// Change sample rate and redesign all stages for it
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> DspResult<()> {
        validate_sample_rate(sample_rate)?;
        let previous = self.sample_rate;
        self.sample_rate = sample_rate;
        let parameters = self.parameters;
        if let Err(err) = self.update(&parameters) {
            self.sample_rate = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Linear magnitude of the whole chain at `frequency` Hz
    pub fn magnitude_for_frequency(&self, frequency: f64) -> f64 {
        let sample_rate = self.sample_rate as f64;
        self.low_cut.magnitude(frequency, sample_rate)
            * self.peak.magnitude(frequency, sample_rate)
            * self.high_cut.magnitude(frequency, sample_rate)
    }

    /// Chain magnitude in dB at `frequency` Hz.
    /// May be -inf or NaN for degenerate coefficients; callers plotting it must filter.
    pub fn magnitude_db(&self, frequency: f64) -> f64 {
        20.0 * self.magnitude_for_frequency(frequency).log10()
    }

    /// Number of active sections at a stage (the peak has at most one)
    pub fn enabled_sections(&self, position: ChainPosition) -> usize {
        match position {
            ChainPosition::LowCut => self.low_cut.enabled_sections(),
            ChainPosition::Peak => usize::from(self.peak.enabled),
            ChainPosition::HighCut => self.high_cut.enabled_sections(),
        }
    }

    pub fn is_bypassed(&self, position: ChainPosition) -> bool {
        self.enabled_sections(position) == 0
    }

    pub fn parameters(&self) -> &FilterParameters {
        &self.parameters
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Process one sample through every enabled section
    ///
    /// # Real-time Safety
    /// This function performs NO allocations and NO syscalls.
    #[inline]
    pub fn process_sample(&mut self, sample: f32) -> f32 {
        let x = self.low_cut.run(sample);
        let x = self.peak.run(x);
        self.high_cut.run(x)
    }

    /// Process a mono buffer in-place
    #[inline]
    pub fn process_block(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Reset filter state (clear delay lines)
    pub fn reset(&mut self) {
        self.low_cut.reset();
        self.peak.filter.reset_state();
        self.high_cut.reset();
    }
}
