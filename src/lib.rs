//! Stockwell - time-frequency analysis of MEG/EEG style signals
//!
//! Stockwell (S) transform power, its sine-multitaper extension and the band
//! filters used to prepare epochs for it.
//!
//! ## Features
//!
//! - **Stockwell transform**: Gaussian-windowed, frequency-dependent
//!   resolution over any bin range, rows computed in parallel
//! - **Multitaper**: sine tapers with bandwidth report (`calcbw`) for both
//!   the time-frequency map and the whole-window spectrum (`smt`)
//! - **Filters**: FFT-domain band-pass / notch with Gaussian roll-off,
//!   Butterworth IIR in second-order sections, Hilbert / analytic signal
//! - **Analyzer**: epochs x channels pipeline with line-noise rejection,
//!   evoked or induced averaging, baseline normalisation and log power
//!
//! ## Module Structure
//!
//! - `core` - transforms, filters and the analyzer
//! - `config` - analysis presets and configuration
//! - `cli` - command-line interface of the demo binary
//! - `testgen` - synthetic signals
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stockwell::core::{stockwell, TfAnalyzer};
//! use stockwell::config::TfPreset;
//! use stockwell::core::AnalyzerBuilder;
//!
//! // Raw transform over bins 0..=40
//! let s = stockwell(&samples, 0, 40)?;
//!
//! // Preset pipeline over [epochs, channels, samples]
//! let analyzer = AnalyzerBuilder::from_preset(TfPreset::Multitaper, 600.0).build()?;
//! let result = analyzer.analyze(data.view())?;
//! println!("Dominant frequency: {:.1} Hz", result.summary().dominant_freq_hz);
//! ```
//!
//! ## Presets
//!
//! | Preset     | Band     | Tapers | Line-noise reject |
//! |------------|----------|--------|-------------------|
//! | Standard   | 0-80 Hz  | 0      | none              |
//! | Multitaper | 0-80 Hz  | 3      | none              |
//! | LineNoise  | 0-80 Hz  | 0      | 59-61 Hz          |

// Transforms, filters and the analyzer
pub mod core;

// Command-line interface
pub mod cli;

// Configuration and presets
pub mod config;

pub mod error;

// Synthetic signal generation
pub mod testgen;

// Re-export commonly used types at crate root for convenience
pub use config::{AverageMode, Normalization, TfConfig, TfConfigBuilder, TfPreset};
pub use self::core::analysis::{mt_stockwell, smt, stockwell, SpectrumEstimate, StockwellEngine};
pub use self::core::analyzer::{AnalyzerBuilder, TfAnalyzer, TfResult, TfSummary};
pub use self::core::dsp::{
    analytic_signal, apply, build_fft_filter, build_filter, build_hilbert_filter,
    build_iir_filter, build_notch_filter, calc_tapers, calcbw, freq_to_bin, BinRange, FilterKind,
    FilterSpec, FrequencyBand, TaperSet,
};
pub use error::{DspError, Result};
