//! Frequency-domain band filters and their application
//!
//! FFT filters are per-bin gain arrays for one signal length; they are
//! applied by multiplying the DFT and transforming back, which makes them
//! zero-phase. The band edges map onto bins with [`freq_to_bin`] and the gain
//! decays outside the band as a Gaussian of width `rolloff_hz` rather than
//! stopping dead, to keep ringing down. The width never drops below
//! [`MIN_ROLLOFF_BINS`] bins, so a tone between bins cannot leak past a notch
//! through its neighbours.

use log::debug;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::fft::FftProcessor;
use super::iir::IirFilter;
use super::{check_srate, freq_to_bin};
use crate::error::{DspError, Result};

/// Default Gaussian roll-off width (standard deviation, Hz) of FFT filters.
pub const DEFAULT_ROLLOFF_HZ: f64 = 2.0;

/// Smallest non-zero roll-off width, in bins of the filter length.
pub const MIN_ROLLOFF_BINS: f64 = 2.0;

/// Which implementation a band filter should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FilterKind {
    #[default]
    Fft,
    Iir,
}

impl FilterKind {
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Fft => "FFT",
            FilterKind::Iir => "IIR",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "fft" => Some(FilterKind::Fft),
            "iir" => Some(FilterKind::Iir),
            _ => None,
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftFilterKind {
    BandPass,
    BandStop,
}

/// Parameters of an FFT-domain filter before the gains are computed.
#[derive(Debug, Clone, Copy)]
pub struct FftFilterDesign {
    lo: f64,
    hi: f64,
    srate: f64,
    n: usize,
    rolloff_hz: f64,
}

impl FftFilterDesign {
    pub fn new(lo: f64, hi: f64, srate: f64, n: usize) -> Self {
        Self {
            lo,
            hi,
            srate,
            n,
            rolloff_hz: DEFAULT_ROLLOFF_HZ,
        }
    }

    /// Gaussian roll-off width in Hz; `0` gives a hard-edged band. Widths
    /// under [`MIN_ROLLOFF_BINS`] bins are widened to that.
    pub fn rolloff(mut self, rolloff_hz: f64) -> Self {
        self.rolloff_hz = rolloff_hz;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(DspError::invalid("filter length must be non-zero"));
        }
        check_srate(self.srate)?;
        if !self.rolloff_hz.is_finite() || self.rolloff_hz < 0.0 {
            return Err(DspError::invalid(format!(
                "roll-off must be a non-negative width in Hz, got {}",
                self.rolloff_hz
            )));
        }
        if !self.lo.is_finite() || self.lo < 0.0 {
            return Err(DspError::OutOfRange {
                what: "lo",
                value: self.lo,
                limit: self.srate / 2.0,
            });
        }
        if !self.hi.is_finite() || self.hi > self.srate / 2.0 {
            return Err(DspError::OutOfRange {
                what: "hi",
                value: self.hi,
                limit: self.srate / 2.0,
            });
        }
        if self.lo >= self.hi {
            return Err(DspError::InvalidBand {
                lo: self.lo,
                hi: self.hi,
            });
        }
        Ok(())
    }

    /// Roll-off width in Hz actually used for the gains.
    pub fn effective_rolloff(&self) -> f64 {
        if self.rolloff_hz == 0.0 {
            return 0.0;
        }
        let df = self.srate / self.n as f64;
        self.rolloff_hz.max(MIN_ROLLOFF_BINS * df)
    }

    /// Pass-band gain of the non-negative bins `0..=n/2`.
    fn half_gains(&self) -> Vec<f64> {
        let bin_lo = freq_to_bin(self.lo, self.n, self.srate);
        let bin_hi = freq_to_bin(self.hi, self.n, self.srate);
        let df = self.srate / self.n as f64;
        let width = self.effective_rolloff();
        let two_var = 2.0 * width * width;

        (0..=self.n / 2)
            .map(|k| {
                let dist_bins = if k < bin_lo {
                    bin_lo - k
                } else if k > bin_hi {
                    k - bin_hi
                } else {
                    return 1.0;
                };
                if two_var == 0.0 {
                    return 0.0;
                }
                let d = dist_bins as f64 * df;
                (-d * d / two_var).exp()
            })
            .collect()
    }

    /// Mirror the non-negative gains onto all `n` bins.
    fn full_gains(&self, half: &[f64]) -> Vec<f64> {
        (0..self.n).map(|i| half[i.min(self.n - i)]).collect()
    }

    pub fn band_pass(&self) -> Result<FftFilter> {
        self.validate()?;
        let gain = self.full_gains(&self.half_gains());
        debug!(
            "Making FFT band-pass filter from {} to {} Hz ({} samples at {} Hz)",
            self.lo, self.hi, self.n, self.srate
        );
        Ok(FftFilter {
            gain,
            kind: FftFilterKind::BandPass,
            design: *self,
        })
    }

    pub fn band_stop(&self) -> Result<FftFilter> {
        self.validate()?;
        let half: Vec<f64> = self.half_gains().iter().map(|g| 1.0 - g).collect();
        let gain = self.full_gains(&half);
        debug!(
            "Making FFT band-reject filter from {} to {} Hz ({} samples at {} Hz)",
            self.lo, self.hi, self.n, self.srate
        );
        Ok(FftFilter {
            gain,
            kind: FftFilterKind::BandStop,
            design: *self,
        })
    }

    /// Band-limited analytic filter: positive bins doubled, negative bins
    /// zeroed. DC and (for even `n`) Nyquist keep unit weight so the real
    /// part of the output equals the band-passed input.
    pub fn analytic(&self) -> Result<HilbertFilter> {
        self.validate()?;
        let half = self.half_gains();
        debug!(
            "Making analytic filter from {} to {} Hz ({} samples at {} Hz)",
            self.lo, self.hi, self.n, self.srate
        );
        Ok(HilbertFilter {
            gain: analytic_gains(&half, self.n),
            band: Some((self.lo, self.hi, self.srate)),
        })
    }
}

fn analytic_gains(half: &[f64], n: usize) -> Vec<f64> {
    let mut gain = vec![0.0; n];
    gain[0] = half[0];
    for i in 1..(n + 1) / 2 {
        gain[i] = 2.0 * half[i];
    }
    if n % 2 == 0 && n > 1 {
        gain[n / 2] = half[n / 2];
    }
    gain
}

/// Per-bin real gains for one signal length.
#[derive(Debug, Clone)]
pub struct FftFilter {
    gain: Vec<f64>,
    kind: FftFilterKind,
    design: FftFilterDesign,
}

impl FftFilter {
    pub fn gains(&self) -> &[f64] {
        &self.gain
    }

    pub fn kind(&self) -> FftFilterKind {
        self.kind
    }

    /// The length this filter was built for.
    pub fn len(&self) -> usize {
        self.design.n
    }

    pub fn is_empty(&self) -> bool {
        self.gain.is_empty()
    }

    /// `(lo, hi, srate)` the gains were computed from.
    pub fn band(&self) -> (f64, f64, f64) {
        (self.design.lo, self.design.hi, self.design.srate)
    }

    pub fn rolloff_hz(&self) -> f64 {
        self.design.rolloff_hz
    }

    /// Zero-phase filtering of a signal of exactly [`len`](Self::len) samples.
    pub fn apply(&self, samples: &[f64]) -> Result<Vec<f64>> {
        if samples.len() != self.gain.len() {
            return Err(DspError::LengthMismatch {
                expected: self.gain.len(),
                actual: samples.len(),
            });
        }
        let fft = FftProcessor::new(self.gain.len())?;
        let mut spectrum = fft.dft(samples)?;
        for (x, &g) in spectrum.iter_mut().zip(self.gain.iter()) {
            *x *= g;
        }
        fft.idft_real(&spectrum)
    }
}

/// Analytic-signal filter; output is complex.
#[derive(Debug, Clone)]
pub struct HilbertFilter {
    gain: Vec<f64>,
    band: Option<(f64, f64, f64)>,
}

impl HilbertFilter {
    /// Unrestricted analytic filter for `n` samples.
    pub fn full_band(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(DspError::invalid("filter length must be non-zero"));
        }
        Ok(Self {
            gain: analytic_gains(&vec![1.0; n / 2 + 1], n),
            band: None,
        })
    }

    pub fn gains(&self) -> &[f64] {
        &self.gain
    }

    pub fn len(&self) -> usize {
        self.gain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gain.is_empty()
    }

    /// `(lo, hi, srate)` for band-limited filters, `None` for full band.
    pub fn band(&self) -> Option<(f64, f64, f64)> {
        self.band
    }

    pub fn apply(&self, samples: &[f64]) -> Result<Vec<Complex64>> {
        if samples.len() != self.gain.len() {
            return Err(DspError::LengthMismatch {
                expected: self.gain.len(),
                actual: samples.len(),
            });
        }
        let fft = FftProcessor::new(self.gain.len())?;
        let mut spectrum = fft.dft(samples)?;
        for (x, &g) in spectrum.iter_mut().zip(self.gain.iter()) {
            *x *= g;
        }
        fft.idft(&spectrum)
    }
}

/// A real-output filter: FFT gains for a fixed length, or IIR sections for
/// any length.
#[derive(Debug, Clone)]
pub enum FilterSpec {
    Fft(FftFilter),
    Iir(IirFilter),
}

impl FilterSpec {
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterSpec::Fft(_) => FilterKind::Fft,
            FilterSpec::Iir(_) => FilterKind::Iir,
        }
    }

    pub fn apply(&self, samples: &[f64]) -> Result<Vec<f64>> {
        match self {
            FilterSpec::Fft(filter) => filter.apply(samples),
            FilterSpec::Iir(filter) => Ok(filter.apply(samples)),
        }
    }
}

impl From<FftFilter> for FilterSpec {
    fn from(filter: FftFilter) -> Self {
        FilterSpec::Fft(filter)
    }
}

impl From<IirFilter> for FilterSpec {
    fn from(filter: IirFilter) -> Self {
        FilterSpec::Iir(filter)
    }
}

/// Apply a previously built filter to `samples`.
pub fn apply(samples: &[f64], filter: &FilterSpec) -> Result<Vec<f64>> {
    filter.apply(samples)
}

/// FFT band-pass over `[lo, hi]` Hz for `n` samples at `srate`.
pub fn build_fft_filter(lo: f64, hi: f64, srate: f64, n: usize) -> Result<FftFilter> {
    FftFilterDesign::new(lo, hi, srate, n).band_pass()
}

/// FFT band-reject over `[lo, hi]` Hz, e.g. 59–61 Hz for line noise.
pub fn build_notch_filter(lo: f64, hi: f64, srate: f64, n: usize) -> Result<FftFilter> {
    FftFilterDesign::new(lo, hi, srate, n).band_stop()
}

/// Band-limited analytic filter over `[lo, hi]` Hz.
pub fn build_hilbert_filter(lo: f64, hi: f64, srate: f64, n: usize) -> Result<HilbertFilter> {
    FftFilterDesign::new(lo, hi, srate, n).analytic()
}

/// Band-pass of the requested kind. `n` is only used by FFT filters.
pub fn build_filter(kind: FilterKind, lo: f64, hi: f64, srate: f64, n: usize) -> Result<FilterSpec> {
    match kind {
        FilterKind::Fft => Ok(build_fft_filter(lo, hi, srate, n)?.into()),
        FilterKind::Iir => {
            if lo >= hi {
                return Err(DspError::InvalidBand { lo, hi });
            }
            Ok(IirFilter::band_pass(lo, hi, srate)?.into())
        }
    }
}

/// Band-reject of the requested kind. `n` is only used by FFT filters.
pub fn build_reject_filter(
    kind: FilterKind,
    lo: f64,
    hi: f64,
    srate: f64,
    n: usize,
) -> Result<FilterSpec> {
    match kind {
        FilterKind::Fft => Ok(build_notch_filter(lo, hi, srate, n)?.into()),
        FilterKind::Iir => Ok(IirFilter::band_stop(lo, hi, srate)?.into()),
    }
}

/// Analytic signal of `samples` over the full band.
pub fn analytic_signal(samples: &[f64]) -> Result<Vec<Complex64>> {
    HilbertFilter::full_band(samples.len())?.apply(samples)
}

/// Instantaneous amplitude, `|analytic_signal(x)|`.
pub fn envelope(samples: &[f64]) -> Result<Vec<f64>> {
    Ok(analytic_signal(samples)?.iter().map(|c| c.norm()).collect())
}

/// Instantaneous phase in radians, `arg(analytic_signal(x))`.
pub fn instantaneous_phase(samples: &[f64]) -> Result<Vec<f64>> {
    Ok(analytic_signal(samples)?.iter().map(|c| c.arg()).collect())
}
