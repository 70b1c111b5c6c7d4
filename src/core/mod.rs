//! Core transform, filtering and analysis modules

pub mod analysis;
pub mod analyzer;
pub mod dsp;

pub use analysis::{mt_stockwell, smt, stockwell, SpectrumEstimate, StockwellEngine};
pub use analyzer::{AnalyzerBuilder, TfAnalyzer, TfResult, TfSummary};
