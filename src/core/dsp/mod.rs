//! Digital signal processing primitives: DFT adapter, taper bank, filters

pub mod fft;
pub mod filters;
pub mod iir;
pub mod stats;
pub mod windows;

pub use fft::{bin_frequencies, dft, idft, power_spectrum, FftProcessor};
pub use filters::{
    analytic_signal, apply, build_fft_filter, build_filter, build_hilbert_filter,
    build_notch_filter, build_reject_filter, envelope, instantaneous_phase, FftFilter,
    FftFilterDesign, FftFilterKind, FilterKind, FilterSpec, HilbertFilter, DEFAULT_ROLLOFF_HZ,
    MIN_ROLLOFF_BINS,
};
pub use iir::{
    build_iir_filter, build_iir_filter_with_order, IirBand, IirFilter, DEFAULT_IIR_ORDER,
};
pub use windows::{calc_tapers, calcbw, TaperSet};

use serde::{Deserialize, Serialize};

use crate::error::{DspError, Result};

/// Convert a frequency in Hz to the nearest DFT bin of an `n`-point
/// transform at `srate`: `floor(f * n / srate + 0.5)`.
pub fn freq_to_bin(freq_hz: f64, n: usize, srate: f64) -> usize {
    (freq_hz * n as f64 / srate + 0.5).floor().max(0.0) as usize
}

/// Frequency in Hz of bin `bin` of an `n`-point transform.
pub fn bin_to_freq(bin: usize, n: usize, srate: f64) -> f64 {
    bin as f64 * srate / n as f64
}

pub(crate) fn check_srate(srate: f64) -> Result<()> {
    if !srate.is_finite() || srate <= 0.0 {
        return Err(DspError::invalid(format!(
            "sample rate must be positive, got {srate}"
        )));
    }
    Ok(())
}

/// A band of interest in Hz, `0 <= lo_hz < hi_hz`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub lo_hz: f64,
    pub hi_hz: f64,
}

impl FrequencyBand {
    pub fn new(lo_hz: f64, hi_hz: f64) -> Result<Self> {
        if !lo_hz.is_finite() || !hi_hz.is_finite() {
            return Err(DspError::invalid("band edges must be finite"));
        }
        if lo_hz < 0.0 {
            return Err(DspError::OutOfRange {
                what: "lo",
                value: lo_hz,
                limit: f64::INFINITY,
            });
        }
        if lo_hz >= hi_hz {
            return Err(DspError::InvalidBand { lo: lo_hz, hi: hi_hz });
        }
        Ok(Self { lo_hz, hi_hz })
    }

    /// Check that the band fits below the Nyquist frequency of `srate`.
    pub fn check_nyquist(&self, srate: f64) -> Result<()> {
        check_srate(srate)?;
        let nyquist = srate / 2.0;
        if self.hi_hz > nyquist {
            return Err(DspError::OutOfRange {
                what: "hi",
                value: self.hi_hz,
                limit: nyquist,
            });
        }
        Ok(())
    }

    /// Map the band onto the rows of an `n`-sample transform.
    pub fn to_bins(&self, n: usize, srate: f64) -> Result<BinRange> {
        self.check_nyquist(srate)?;
        // Nyquist rounds up to (n + 1) / 2 for odd n.
        let top = n / 2;
        BinRange::new(
            freq_to_bin(self.lo_hz, n, srate).min(top),
            freq_to_bin(self.hi_hz, n, srate).min(top),
            n,
        )
    }

    pub fn width(&self) -> f64 {
        self.hi_hz - self.lo_hz
    }
}

/// Inclusive range of DFT bins, `lo <= hi <= n/2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinRange {
    pub lo: usize,
    pub hi: usize,
}

impl BinRange {
    pub fn new(lo: usize, hi: usize, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(DspError::invalid("signal length must be non-zero"));
        }
        if lo > hi {
            return Err(DspError::InvalidBand {
                lo: lo as f64,
                hi: hi as f64,
            });
        }
        if hi > n / 2 {
            return Err(DspError::OutOfRange {
                what: "bin_hi",
                value: hi as f64,
                limit: (n / 2) as f64,
            });
        }
        Ok(Self { lo, hi })
    }

    /// Number of rows, `hi - lo + 1`.
    pub fn len(&self) -> usize {
        self.hi - self.lo + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.lo..=self.hi
    }

    /// Frequency axis in Hz, one entry per row.
    pub fn frequencies(&self, n: usize, srate: f64) -> Vec<f64> {
        self.iter().map(|b| bin_to_freq(b, n, srate)).collect()
    }
}
