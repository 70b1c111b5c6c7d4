//! Time-frequency analysis algorithms
//!
//! - Stockwell transform (single window and sine multitaper)
//! - Whole-window reference spectra (periodogram and multitaper)

mod spectral;
mod stockwell;

pub use spectral::{smt, SpectrumEstimate};
pub use stockwell::{mt_stockwell, stockwell, StockwellEngine};
