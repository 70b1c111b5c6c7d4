// src/core/analyzer.rs
//
// High-level time-frequency analysis API with builder pattern.
//
// Input is a block of epochs `[epochs, channels, samples]` recorded at one
// sample rate. Every epoch/channel lane may first have line noise removed,
// then lanes are transformed (single window or sine multitaper) and their
// power averaged into one map per band.

use log::{debug, info};
use ndarray::{s, Array2, Array3, ArrayView3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::analysis::{smt, SpectrumEstimate, StockwellEngine};
use super::dsp::stats::argmax;
use super::dsp::{
    calcbw, check_srate, BinRange, FftFilterDesign, FilterKind, FilterSpec, IirBand, IirFilter,
    TaperSet,
};
use crate::config::{AverageMode, Normalization, TfConfig, TfConfigBuilder, TfPreset};
use crate::error::{DspError, Result};

/// Builder for TfAnalyzer configuration
pub struct AnalyzerBuilder {
    config: TfConfigBuilder,
    srate: f64,
}

impl AnalyzerBuilder {
    pub fn new(srate: f64) -> Self {
        Self {
            config: TfConfigBuilder::new(),
            srate,
        }
    }

    pub fn from_preset(preset: TfPreset, srate: f64) -> Self {
        Self {
            config: TfConfigBuilder::from_preset(preset),
            srate,
        }
    }

    pub fn band(mut self, lo_hz: f64, hi_hz: f64) -> Self {
        self.config = self.config.band(lo_hz, hi_hz);
        self
    }

    pub fn tapers(mut self, count: usize) -> Self {
        self.config = self.config.tapers(count);
        self
    }

    pub fn line_reject(mut self, lo_hz: f64, hi_hz: f64) -> Self {
        self.config = self.config.line_reject(lo_hz, hi_hz);
        self
    }

    pub fn filter_kind(mut self, kind: FilterKind) -> Self {
        self.config = self.config.filter_kind(kind);
        self
    }

    pub fn average(mut self, mode: AverageMode) -> Self {
        self.config = self.config.average(mode);
        self
    }

    pub fn normalize(mut self, normalization: Normalization) -> Self {
        self.config = self.config.normalize(normalization);
        self
    }

    pub fn log_power(mut self, enabled: bool) -> Self {
        self.config = self.config.log_power(enabled);
        self
    }

    pub fn build(self) -> Result<TfAnalyzer> {
        TfAnalyzer::with_config(self.config.build()?, self.srate)
    }
}

/// Time-frequency analyzer with fluent API
#[derive(Debug, Clone)]
pub struct TfAnalyzer {
    config: TfConfig,
    srate: f64,
}

impl TfAnalyzer {
    /// Create analyzer with default configuration
    pub fn new(srate: f64) -> Result<Self> {
        Self::with_config(TfConfig::default(), srate)
    }

    /// Create analyzer with custom configuration
    pub fn with_config(config: TfConfig, srate: f64) -> Result<Self> {
        check_srate(srate)?;
        config.validate()?;
        config.band.check_nyquist(srate)?;
        if let Some(reject) = &config.line_reject {
            reject.check_nyquist(srate)?;
        }
        Ok(Self { config, srate })
    }

    /// Create a builder for custom configuration
    pub fn builder(srate: f64) -> AnalyzerBuilder {
        AnalyzerBuilder::new(srate)
    }

    pub fn config(&self) -> &TfConfig {
        &self.config
    }

    pub fn srate(&self) -> f64 {
        self.srate
    }

    /// Analyze a single continuous signal as one epoch of one channel.
    pub fn analyze_signal(&self, samples: &[f64]) -> Result<TfResult> {
        let data = Array3::from_shape_vec((1, 1, samples.len()), samples.to_vec())?;
        self.analyze(data.view())
    }

    /// Run the full analysis over `[epochs, channels, samples]`.
    pub fn analyze(&self, data: ArrayView3<'_, f64>) -> Result<TfResult> {
        let (epochs, channels, n) = data.dim();
        if epochs == 0 || channels == 0 || n == 0 {
            return Err(DspError::invalid(format!(
                "need at least one sample, epoch and channel, got {epochs}x{channels}x{n}"
            )));
        }
        info!(
            "Analyzing {} epochs x {} channels x {} samples at {} Hz ({})",
            epochs,
            channels,
            n,
            self.srate,
            self.config.name
        );

        let bins = self.config.band.to_bins(n, self.srate)?;
        debug!("Band {:?} Hz -> bins {}..={}", self.config.band, bins.lo, bins.hi);

        let lanes = self.cleaned_lanes(data)?;
        let sources = match self.config.average {
            AverageMode::AverageOfStockwells => lanes,
            AverageMode::StockwellOfAverage => average_epochs(&lanes, epochs, channels, n),
        };
        debug!(
            "Transforming {} signals ({})",
            sources.len(),
            self.config.average.name()
        );

        let k = self.config.tapers;
        let tapers = TaperSet::sine(k, n)?;
        let bandwidth_hz = if k > 0 {
            let bw = calcbw(k, n, self.srate);
            info!("Using {} tapers, smoothing bandwidth {:.3} Hz", k, bw);
            Some(bw)
        } else {
            None
        };

        let engine = StockwellEngine::new(n)?;
        let shape = (bins.len(), n);
        let mut power = sources
            .par_iter()
            .map(|x| engine.multitaper(k, &tapers, x, bins))
            .try_reduce(|| Array2::zeros(shape), |a, b| Ok(a + b))?;
        let inv = 1.0 / sources.len() as f64;
        power.mapv_inplace(|v| v * inv);

        let spectrum = self.reference_spectrum(&sources, &tapers, bins)?;

        self.normalize(&mut power)?;
        if self.config.log_power {
            power.mapv_inplace(|v| v.max(f64::MIN_POSITIVE).ln());
        }

        Ok(TfResult {
            freqs: bins.frequencies(n, self.srate),
            times: (0..n).map(|i| i as f64 / self.srate).collect(),
            power,
            spectrum,
            bins,
            bandwidth_hz,
            tapers: k,
            epochs,
            channels,
            srate: self.srate,
            log_power: self.config.log_power,
        })
    }

    /// Line-noise filter for `n`-sample lanes, if one is configured.
    fn line_filter(&self, n: usize) -> Result<Option<FilterSpec>> {
        let Some(reject) = self.config.line_reject else {
            return Ok(None);
        };
        let filter: FilterSpec = match self.config.filter_kind {
            FilterKind::Fft => FftFilterDesign::new(reject.lo_hz, reject.hi_hz, self.srate, n)
                .rolloff(self.config.rolloff_hz)
                .band_stop()?
                .into(),
            FilterKind::Iir => IirFilter::design(
                IirBand::from_edges(reject.hi_hz, reject.lo_hz)?,
                self.srate,
                self.config.iir_order,
            )?
            .into(),
        };
        Ok(Some(filter))
    }

    /// Every epoch/channel lane as its own vector, line noise removed.
    /// Lane `e * channels + c` holds epoch `e`, channel `c`.
    fn cleaned_lanes(&self, data: ArrayView3<'_, f64>) -> Result<Vec<Vec<f64>>> {
        let (epochs, channels, n) = data.dim();
        let filter = self.line_filter(n)?;

        (0..epochs * channels)
            .into_par_iter()
            .map(|idx| {
                let lane = data.slice(s![idx / channels, idx % channels, ..]).to_vec();
                match &filter {
                    Some(f) => f.apply(&lane),
                    None => Ok(lane),
                }
            })
            .collect()
    }

    fn reference_spectrum(
        &self,
        sources: &[Vec<f64>],
        tapers: &TaperSet,
        bins: BinRange,
    ) -> Result<SpectrumEstimate> {
        let k = self.config.tapers;
        let n = tapers.winlen();
        let mut acc = vec![0.0; n / 2];
        for x in sources {
            for (a, p) in acc.iter_mut().zip(smt(k, tapers, x)?) {
                *a += p;
            }
        }
        let inv = 1.0 / sources.len() as f64;
        acc.iter_mut().for_each(|v| *v *= inv);

        let estimate = SpectrumEstimate {
            freqs: (0..acc.len())
                .map(|b| b as f64 * self.srate / n as f64)
                .collect(),
            power: acc,
            tapers: k,
        };
        Ok(estimate.slice(bins.lo, bins.hi))
    }

    fn normalize(&self, power: &mut Array2<f64>) -> Result<()> {
        let n = power.ncols();
        let (start, end) = match self.config.normalization {
            Normalization::None => return Ok(()),
            Normalization::WholeWindow => (0, n),
            Normalization::Baseline { start_s, end_s } => {
                let start = (start_s * self.srate).floor() as usize;
                let end = ((end_s * self.srate).ceil() as usize).min(n);
                if start >= end {
                    return Err(DspError::invalid(format!(
                        "baseline window [{start_s}, {end_s}) s holds no samples of a {n}-sample epoch"
                    )));
                }
                (start, end)
            }
        };
        debug!("Normalizing rows by their mean over samples {}..{}", start, end);

        for mut row in power.rows_mut() {
            let base = row.slice(s![start..end]).mean().unwrap_or(0.0);
            if base > 0.0 {
                row.mapv_inplace(|v| v / base);
            }
        }
        Ok(())
    }
}

/// Mean over epochs for each channel; output lane `c` is channel `c`.
fn average_epochs(lanes: &[Vec<f64>], epochs: usize, channels: usize, n: usize) -> Vec<Vec<f64>> {
    let inv = 1.0 / epochs as f64;
    (0..channels)
        .map(|c| {
            let mut avg = vec![0.0; n];
            for e in 0..epochs {
                for (a, v) in avg.iter_mut().zip(&lanes[e * channels + c]) {
                    *a += v;
                }
            }
            avg.iter_mut().for_each(|v| *v *= inv);
            avg
        })
        .collect()
}

/// Averaged time-frequency power with its axes.
#[derive(Debug, Clone)]
pub struct TfResult {
    /// `(rows, samples)`; row `r` is bin `bins.lo + r`.
    pub power: Array2<f64>,
    /// Whole-window reference spectrum over the same bins.
    pub spectrum: SpectrumEstimate,
    pub freqs: Vec<f64>,
    pub times: Vec<f64>,
    pub bins: BinRange,
    /// Multitaper smoothing half-bandwidth; `None` for a single window.
    pub bandwidth_hz: Option<f64>,
    pub tapers: usize,
    pub epochs: usize,
    pub channels: usize,
    pub srate: f64,
    pub log_power: bool,
}

impl TfResult {
    /// Row holding the bin nearest to `freq_hz`, if it is in the band.
    pub fn row_for_freq(&self, freq_hz: f64) -> Option<usize> {
        let bin = super::dsp::freq_to_bin(freq_hz, self.times.len(), self.srate);
        if bin < self.bins.lo || bin > self.bins.hi {
            return None;
        }
        Some(bin - self.bins.lo)
    }

    /// Time course of the row nearest to `freq_hz`.
    pub fn row_at(&self, freq_hz: f64) -> Option<Vec<f64>> {
        self.row_for_freq(freq_hz).map(|r| self.power.row(r).to_vec())
    }

    /// Mean power of each row over time.
    pub fn mean_over_time(&self) -> Vec<f64> {
        self.power
            .rows()
            .into_iter()
            .map(|row| row.mean().unwrap_or(0.0))
            .collect()
    }

    pub fn summary(&self) -> TfSummary {
        let cols = self.power.ncols();
        let flat: Vec<f64> = self.power.iter().copied().collect();
        let (peak_freq_hz, peak_time_s, peak_power) = match argmax(&flat) {
            Some(idx) => (self.freqs[idx / cols], self.times[idx % cols], flat[idx]),
            None => (0.0, 0.0, 0.0),
        };
        let strongest_row = argmax(&self.mean_over_time()).map(|r| self.freqs[r]).unwrap_or(0.0);

        TfSummary {
            freq_lo_hz: self.freqs.first().copied().unwrap_or(0.0),
            freq_hi_hz: self.freqs.last().copied().unwrap_or(0.0),
            rows: self.power.nrows(),
            samples: cols,
            epochs: self.epochs,
            channels: self.channels,
            tapers: self.tapers,
            bandwidth_hz: self.bandwidth_hz,
            peak_freq_hz,
            peak_time_s,
            peak_power,
            dominant_freq_hz: strongest_row,
            spectrum_peak_hz: self.spectrum.peak_frequency(),
            log_power: self.log_power,
        }
    }
}

/// Serializable digest of a [`TfResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfSummary {
    pub freq_lo_hz: f64,
    pub freq_hi_hz: f64,
    pub rows: usize,
    pub samples: usize,
    pub epochs: usize,
    pub channels: usize,
    pub tapers: usize,
    pub bandwidth_hz: Option<f64>,
    /// Location and value of the single largest cell.
    pub peak_freq_hz: f64,
    pub peak_time_s: f64,
    pub peak_power: f64,
    /// Row with the largest time-averaged power.
    pub dominant_freq_hz: f64,
    pub spectrum_peak_hz: Option<f64>,
    pub log_power: bool,
}
