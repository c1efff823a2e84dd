//! Analysis Engine
//!
//! Owns one [`PathProducer`] per channel plus the filter chain model, and is
//! driven by the UI refresh tick (60 Hz by default). Each tick:
//!
//! 1. Every channel drains its blocks into spectra and its spectra into
//!    curves, keeping only the newest curve.
//! 2. If the parameter store's changed flag is raised, the flag is cleared
//!    and the chain is recomputed from one snapshot.
//! 3. The response curve is re-traced when the chain or the bounds changed.

use std::sync::Arc;

use equinox_dsp::{DspError, FftOrder, FilterChain};
use tracing::{debug, info, warn};

use crate::collector::{block_channel, BlockCollector};
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::parameters::ParameterStore;
use crate::path::{CurvePath, PathSink, Rect};
use crate::producer::PathProducer;
use crate::response::response_curve;

/// What one [`AnalysisEngine::tick`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Blocks consumed across all channels
    pub blocks: usize,
    /// Curves produced across all channels (only the newest per channel is kept)
    pub paths: usize,
    /// Filter chain recomputed from a new parameter snapshot
    pub chain_updated: bool,
    /// Response curve re-traced
    pub response_updated: bool,
}

pub struct AnalysisEngine<P = CurvePath> {
    config: AnalyzerConfig,
    producers: Vec<PathProducer<P>>,
    parameters: Arc<ParameterStore>,
    chain: FilterChain,
    sample_rate: f32,
    response: P,
    response_bounds: Option<Rect>,
}

impl<P: PathSink + Default> AnalysisEngine<P> {
    /// Build the engine and one audio-side [`BlockCollector`] per channel
    pub fn new(
        config: AnalyzerConfig,
        channels: usize,
        sample_rate: f32,
        parameters: Arc<ParameterStore>,
    ) -> AnalysisResult<(Self, Vec<BlockCollector>)> {
        config.validate()?;
        if channels == 0 {
            return Err(AnalysisError::InvalidConfig(
                "At least one channel is required".into(),
            ));
        }

        let chain = FilterChain::with_parameters(parameters.snapshot(), sample_rate)?;

        let mut producers = Vec::with_capacity(channels);
        let mut collectors = Vec::with_capacity(channels);
        for channel in 0..channels {
            let (collector, receiver) = block_channel(config.block_size, config.block_fifo_capacity)?;
            producers.push(PathProducer::new(channel, receiver, &config)?);
            collectors.push(collector);
        }

        info!(
            channels,
            sample_rate,
            fft_size = config.fft_size(),
            block_size = config.block_size,
            "Analysis engine created"
        );

        let engine = Self {
            config,
            producers,
            parameters,
            chain,
            sample_rate,
            response: P::default(),
            response_bounds: None,
        };
        Ok((engine, collectors))
    }

    /// One refresh: analyze pending audio, apply parameter changes, re-trace
    /// the response curve if needed
    pub fn tick(&mut self, bounds: Rect) -> TickSummary {
        let mut summary = TickSummary::default();
        let sample_rate = self.sample_rate as f64;

        for producer in &mut self.producers {
            let stats = producer.process(bounds, sample_rate);
            summary.blocks += stats.blocks;
            summary.paths += stats.paths;
        }

        if self.parameters.take_changed() {
            let snapshot = self.parameters.snapshot();
            match self.chain.update(&snapshot) {
                Ok(()) => {
                    debug!(?snapshot, "Filter chain updated");
                    summary.chain_updated = true;
                    self.response_bounds = None;
                }
                Err(e) => warn!("Rejected filter parameters, keeping previous chain: {}", e),
            }
        }

        // Undrawable bounds keep the previous response curve
        if bounds.is_valid() && self.response_bounds != Some(bounds) {
            let chain = &self.chain;
            self.response = response_curve(bounds, self.config.response_range_db as f64, |freq| {
                chain.magnitude_db(freq)
            });
            self.response_bounds = Some(bounds);
            summary.response_updated = true;
        }

        summary
    }

    /// Newest analyzer curve for `channel`
    pub fn channel_path(&self, channel: usize) -> AnalysisResult<&P> {
        self.producers
            .get(channel)
            .map(PathProducer::path)
            .ok_or(AnalysisError::ChannelOutOfRange {
                index: channel,
                channels: self.producers.len(),
            })
    }

    /// Curve of the chain's magnitude response as of the last tick
    pub fn response_path(&self) -> &P {
        &self.response
    }

    /// Chain magnitude in dB at `frequency` Hz
    pub fn magnitude_db(&self, frequency: f64) -> f64 {
        self.chain.magnitude_db(frequency)
    }

    pub fn filter_chain(&self) -> &FilterChain {
        &self.chain
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn channels(&self) -> usize {
        self.producers.len()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Follow a host sample-rate change.
    ///
    /// An unusable rate (zero, negative, non-finite) is rejected and the
    /// previous rate stays. Otherwise the analyzer follows the new rate even
    /// if the chain cannot be redesigned for it.
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> AnalysisResult<()> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(DspError::InvalidSampleRate(sample_rate).into());
        }

        info!(sample_rate, "Analysis sample rate changed");
        self.sample_rate = sample_rate;
        self.response_bounds = None;

        if let Err(e) = self.chain.set_sample_rate(sample_rate) {
            warn!("Filter chain kept its previous sample rate: {}", e);
            return Err(e.into());
        }
        Ok(())
    }

    /// Change analysis resolution on every channel
    pub fn set_fft_order(&mut self, order: FftOrder) -> AnalysisResult<()> {
        if order.fft_size() < self.config.block_size {
            return Err(AnalysisError::InvalidBlockSize {
                got: self.config.block_size,
                max: order.fft_size(),
            });
        }

        info!(fft_size = order.fft_size(), "Changing analyzer resolution");
        self.config.fft_order = order;
        for producer in &mut self.producers {
            producer.set_fft_order(order);
        }
        Ok(())
    }

    /// Change analyzer smoothing on every channel
    pub fn set_smoothing(&mut self, attack: f32, decay_db_per_frame: f32) -> AnalysisResult<()> {
        let mut candidate = self.config.clone();
        candidate.attack = attack;
        candidate.decay_db_per_frame = decay_db_per_frame;
        candidate.validate()?;

        self.config = candidate;
        for producer in &mut self.producers {
            producer.set_smoothing(attack, decay_db_per_frame);
        }
        Ok(())
    }

    /// Total blocks the audio side discarded, per channel
    pub fn dropped_blocks(&self) -> Vec<usize> {
        self.producers.iter().map(PathProducer::dropped_blocks).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer_path::{map_from_log10, MAX_DISPLAY_FREQ, MIN_DISPLAY_FREQ};
    use equinox_dsp::FilterParameters;

    const SAMPLE_RATE: f32 = 48000.0;

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 600.0, 200.0)
    }

    fn engine(channels: usize) -> (AnalysisEngine, Vec<BlockCollector>, Arc<ParameterStore>) {
        let store = Arc::new(ParameterStore::default());
        let (engine, collectors) = AnalysisEngine::new(
            AnalyzerConfig::default(),
            channels,
            SAMPLE_RATE,
            Arc::clone(&store),
        )
        .unwrap();
        (engine, collectors, store)
    }

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| 0.9 * (2.0 * std::f32::consts::PI * freq * i as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    #[test]
    fn test_rejects_zero_channels() {
        let store = Arc::new(ParameterStore::default());
        let result = AnalysisEngine::<CurvePath>::new(AnalyzerConfig::default(), 0, SAMPLE_RATE, store);
        assert!(matches!(result, Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let store = Arc::new(ParameterStore::default());
        let config = AnalyzerConfig {
            block_size: 4096,
            ..AnalyzerConfig::default()
        };
        let result = AnalysisEngine::<CurvePath>::new(config, 2, SAMPLE_RATE, store);
        assert!(matches!(result, Err(AnalysisError::InvalidBlockSize { .. })));
    }

    #[test]
    fn test_sine_peaks_on_its_frequency() {
        let (mut engine, mut collectors, _store) = engine(2);
        collectors[0].push(&sine(1000.0, 2048 * 6));

        let summary = engine.tick(bounds());
        assert_eq!(summary.blocks, 6);

        let path = engine.channel_path(0).unwrap();
        assert!(path.is_closed());
        let top = path
            .points()
            .min_by(|a, b| a.y.total_cmp(&b.y))
            .unwrap();
        let expected_x = 600.0 * map_from_log10(1000.0, MIN_DISPLAY_FREQ, MAX_DISPLAY_FREQ);
        assert!((top.x - expected_x).abs() < 10.0, "peak at x={}", top.x);
        assert!(top.y < 100.0);

        // Silent channel has produced nothing yet
        assert!(engine.channel_path(1).unwrap().is_empty());
    }

    #[test]
    fn test_channel_out_of_range() {
        let (engine, _collectors, _store) = engine(2);
        assert!(matches!(
            engine.channel_path(2),
            Err(AnalysisError::ChannelOutOfRange { index: 2, channels: 2 })
        ));
    }

    #[test]
    fn test_parameter_burst_coalesces() {
        let (mut engine, _collectors, store) = engine(1);
        engine.tick(bounds());

        for gain in [3.0, 6.0, 9.0, 12.0] {
            store.update(|p| {
                p.set_peak_freq(1000.0);
                p.set_peak_gain_db(gain);
            });
        }

        let summary = engine.tick(bounds());
        assert!(summary.chain_updated);
        assert!(summary.response_updated);
        assert!((engine.magnitude_db(1000.0) - 12.0).abs() < 0.1);

        let summary = engine.tick(bounds());
        assert!(!summary.chain_updated);
        assert!(!summary.response_updated);
    }

    #[test]
    fn test_rejected_parameters_keep_chain() {
        let (mut engine, _collectors, store) = engine(1);
        engine.tick(bounds());

        store.set(FilterParameters {
            peak_quality: -1.0,
            peak_gain_db: 12.0,
            ..FilterParameters::default()
        });
        let summary = engine.tick(bounds());
        assert!(!summary.chain_updated);
        assert!(!store.is_changed());
        assert!(engine.magnitude_db(750.0).abs() < 0.1);
    }

    #[test]
    fn test_low_host_sample_rates() {
        for rate in [22050.0_f32, 32000.0] {
            let store = Arc::new(ParameterStore::default());
            let (mut engine, mut collectors) =
                AnalysisEngine::<CurvePath>::new(AnalyzerConfig::default(), 2, rate, store).unwrap();

            let block: Vec<f32> = (0..2048)
                .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / rate).sin())
                .collect();
            collectors[0].push(&block);

            let summary = engine.tick(bounds());
            assert_eq!(summary.paths, 1);
            assert!(engine.channel_path(0).unwrap().is_closed());
            assert!(!engine.response_path().is_empty());
            assert!(engine.magnitude_db(1000.0).abs() < 0.1);
        }

        let (mut engine, _collectors, _store) = engine(1);
        engine.set_sample_rate(32000.0).unwrap();
        assert_eq!(engine.sample_rate(), 32000.0);
        assert_eq!(engine.filter_chain().sample_rate(), 32000.0);
    }

    #[test]
    fn test_undrawable_bounds_keep_analyzing() {
        let (mut engine, mut collectors, _store) = engine(1);
        engine.tick(bounds());
        let response_len = engine.response_path().len();

        collectors[0].push(&sine(1000.0, 2048));
        let summary = engine.tick(Rect::new(10.0, 0.0, -5.0, 100.0));
        assert_eq!(summary.blocks, 1);
        assert_eq!(summary.paths, 0);
        assert!(!summary.response_updated);
        assert_eq!(engine.response_path().len(), response_len);

        engine.tick(Rect::new(f32::NAN, 0.0, 600.0, 200.0));

        // Valid bounds pick up again on the next spectrum
        collectors[0].push(&sine(1000.0, 2048));
        assert_eq!(engine.tick(bounds()).paths, 1);
    }

    #[test]
    fn test_response_follows_bounds() {
        let (mut engine, _collectors, _store) = engine(1);
        assert!(engine.tick(bounds()).response_updated);
        assert_eq!(engine.response_path().len(), 600);

        let wider = Rect::new(0.0, 0.0, 800.0, 200.0);
        assert!(engine.tick(wider).response_updated);
        assert_eq!(engine.response_path().len(), 800);

        // Flat chain sits on the 0dB line
        let mid = engine.response_path().points().nth(400).unwrap();
        assert!((mid.y - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_fft_order_change() {
        let (mut engine, mut collectors, _store) = engine(1);
        engine.set_fft_order(FftOrder::Order8192).unwrap();
        assert_eq!(engine.config().fft_size(), 8192);

        collectors[0].push(&sine(1000.0, 2048));
        let summary = engine.tick(bounds());
        assert_eq!(summary.paths, 1);
    }

    #[test]
    fn test_sample_rate_change() {
        let (mut engine, _collectors, _store) = engine(1);
        engine.tick(bounds());

        assert!(engine.set_sample_rate(0.0).is_err());
        assert_eq!(engine.sample_rate(), SAMPLE_RATE);

        engine.set_sample_rate(96000.0).unwrap();
        assert_eq!(engine.sample_rate(), 96000.0);
        assert!(engine.tick(bounds()).response_updated);
    }

    #[test]
    fn test_smoothing_validation() {
        let (mut engine, _collectors, _store) = engine(1);
        assert!(engine.set_smoothing(0.0, 0.85).is_err());
        engine.set_smoothing(1.0, 3.0).unwrap();
        assert_eq!(engine.config().attack, 1.0);
    }
}
