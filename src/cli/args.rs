//! CLI argument parsing with preset support

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{AverageMode, Normalization, TfConfig, TfConfigBuilder, TfPreset};
use crate::core::dsp::FilterKind;
use crate::error::Result;
use crate::testgen::{Component, SignalSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    Standard,
    Multitaper,
    LineNoise,
}

impl From<PresetArg> for TfPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Standard => TfPreset::Standard,
            PresetArg::Multitaper => TfPreset::Multitaper,
            PresetArg::LineNoise => TfPreset::LineNoise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    Fft,
    Iir,
}

impl From<FilterArg> for FilterKind {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Fft => FilterKind::Fft,
            FilterArg::Iir => FilterKind::Iir,
        }
    }
}

/// Stockwell time-frequency analysis of synthetic multi-epoch recordings
#[derive(Parser, Debug)]
#[command(name = "stockwell")]
#[command(about = "Stockwell / multitaper time-frequency analysis of synthetic epochs")]
pub struct Args {
    /// Signal component FREQ[:AMP[:START:DUR]], trailing '~' for induced (repeatable)
    #[arg(short, long = "tone", value_name = "SPEC", default_value = "10")]
    pub tones: Vec<Component>,

    /// Sample rate in Hz
    #[arg(short, long, default_value_t = 1000.0)]
    pub srate: f64,

    /// Samples per epoch
    #[arg(long, default_value_t = 1024)]
    pub samples: usize,

    /// Number of epochs
    #[arg(short, long, default_value_t = 1)]
    pub epochs: usize,

    /// Number of channels
    #[arg(short, long, default_value_t = 1)]
    pub channels: usize,

    /// Add mains interference at this frequency (Hz)
    #[arg(long, value_name = "HZ")]
    pub mains: Option<f64>,

    /// Mains interference amplitude
    #[arg(long, default_value_t = 1.0)]
    pub mains_amp: f64,

    /// Analysis preset
    #[arg(short, long, value_enum, default_value = "standard")]
    pub preset: PresetArg,

    /// Load the analysis configuration from a JSON file (overrides --preset)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Low edge of the analysed band (Hz)
    #[arg(long)]
    pub lo: Option<f64>,

    /// High edge of the analysed band (Hz)
    #[arg(long)]
    pub hi: Option<f64>,

    /// Number of sine tapers (0 for a single window)
    #[arg(short = 'k', long)]
    pub tapers: Option<usize>,

    /// Remove the band LO..HI Hz before analysis
    #[arg(long, num_args = 2, value_names = ["LO", "HI"])]
    pub reject: Option<Vec<f64>>,

    /// Filter implementation used for --reject
    #[arg(long, value_enum)]
    pub filter: Option<FilterArg>,

    /// Average the epochs before transforming
    #[arg(short, long)]
    pub average_first: bool,

    /// Normalize each row by its mean over the whole epoch
    #[arg(short, long)]
    pub normalize: bool,

    /// Normalize each row by its mean over START..END seconds
    #[arg(short = 'B', long, num_args = 2, value_names = ["START", "END"])]
    pub baseline: Option<Vec<f64>>,

    /// Report natural log power
    #[arg(short, long)]
    pub log: bool,

    /// Rows to print in the text report
    #[arg(long, default_value_t = 16)]
    pub rows: usize,

    /// JSON output format
    #[arg(long)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Apply the overrides on top of `base`, which comes from `--config` or
    /// `--preset`.
    pub fn analysis_config(&self, base: Option<TfConfig>) -> Result<TfConfig> {
        let base = base.unwrap_or_else(|| TfConfig::from_preset(self.preset.into()));
        let mut builder = TfConfigBuilder::from_preset(base.base_preset)
            .name(base.name.clone())
            .band(
                self.lo.unwrap_or(base.band.lo_hz),
                self.hi.unwrap_or(base.band.hi_hz),
            )
            .tapers(self.tapers.unwrap_or(base.tapers))
            .filter_kind(self.filter.map(FilterKind::from).unwrap_or(base.filter_kind))
            .iir_order(base.iir_order)
            .rolloff_hz(base.rolloff_hz)
            .average(if self.average_first {
                AverageMode::StockwellOfAverage
            } else {
                base.average
            })
            .normalize(self.normalization().unwrap_or(base.normalization))
            .log_power(self.log || base.log_power);

        builder = match (&self.reject, base.line_reject) {
            (Some(edges), _) => builder.line_reject(edges[0], edges[1]),
            (None, Some(band)) => builder.line_reject(band.lo_hz, band.hi_hz),
            (None, None) => builder.no_line_reject(),
        };
        builder.build()
    }

    fn normalization(&self) -> Option<Normalization> {
        if let Some(window) = &self.baseline {
            return Some(Normalization::Baseline {
                start_s: window[0],
                end_s: window[1],
            });
        }
        self.normalize.then_some(Normalization::WholeWindow)
    }

    pub fn signal_spec(&self) -> SignalSpec {
        let mut spec = SignalSpec::new(self.srate, self.samples)
            .epochs(self.epochs)
            .channels(self.channels);
        for tone in &self.tones {
            spec = spec.component(*tone);
        }
        if let Some(mains) = self.mains {
            spec = spec.with_line_noise(mains, self.mains_amp);
        }
        spec
    }
}
