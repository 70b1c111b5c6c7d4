//! Butterworth IIR band filters as cascaded second-order sections
//!
//! Design and filtering come from sci-rs (`butter` with SOS output,
//! `sosfilt`, `sosfiltfilt`). This module maps the `(lo, hi)` edge
//! convention onto a band type and checks the edges before designing.

use std::f64::consts::PI;

use log::debug;
use num_complex::Complex64;
use sci_rs::signal::filter::design::{
    butter_dyn, DigitalFilter, FilterBandType, FilterOutputType, Sos, SosFormatFilter,
};
use sci_rs::signal::filter::{sosfilt_dyn, sosfiltfilt_dyn};
use serde::{Deserialize, Serialize};

use super::check_srate;
use crate::error::{DspError, Result};

/// Default prototype order; band-pass and band-stop designs double it.
pub const DEFAULT_IIR_ORDER: usize = 4;

/// Band shape selected from the `(lo, hi)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IirBand {
    LowPass { cutoff: f64 },
    HighPass { cutoff: f64 },
    BandPass { lo: f64, hi: f64 },
    BandStop { lo: f64, hi: f64 },
}

impl IirBand {
    /// `lo == 0` low-pass at `hi`, `hi == 0` high-pass at `lo`, `lo < hi`
    /// band-pass, `lo > hi` band-reject over `[hi, lo]`.
    pub fn from_edges(lo: f64, hi: f64) -> Result<Self> {
        if lo == hi {
            return Err(DspError::UnsupportedBand { lo, hi });
        }
        Ok(if lo == 0.0 {
            IirBand::LowPass { cutoff: hi }
        } else if hi == 0.0 {
            IirBand::HighPass { cutoff: lo }
        } else if lo < hi {
            IirBand::BandPass { lo, hi }
        } else {
            IirBand::BandStop { lo: hi, hi: lo }
        })
    }

    fn band_type(&self) -> FilterBandType {
        match self {
            IirBand::LowPass { .. } => FilterBandType::Lowpass,
            IirBand::HighPass { .. } => FilterBandType::Highpass,
            IirBand::BandPass { .. } => FilterBandType::Bandpass,
            IirBand::BandStop { .. } => FilterBandType::Bandstop,
        }
    }

    fn edges(&self) -> Vec<f64> {
        match *self {
            IirBand::LowPass { cutoff } | IirBand::HighPass { cutoff } => vec![cutoff],
            IirBand::BandPass { lo, hi } | IirBand::BandStop { lo, hi } => vec![lo, hi],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IirBand::LowPass { .. } => "low-pass",
            IirBand::HighPass { .. } => "high-pass",
            IirBand::BandPass { .. } => "band-pass",
            IirBand::BandStop { .. } => "band-reject",
        }
    }
}

fn section_response(sos: &Sos<f64>, z_inv: Complex64) -> Complex64 {
    let z_inv2 = z_inv * z_inv;
    let num = sos.b[0] + z_inv * sos.b[1] + z_inv2 * sos.b[2];
    let den = sos.a[0] + z_inv * sos.a[1] + z_inv2 * sos.a[2];
    num / den
}

/// Recursive filter, valid for any signal length.
#[derive(Debug, Clone)]
pub struct IirFilter {
    sections: Vec<Sos<f64>>,
    band: IirBand,
    srate: f64,
    order: usize,
}

impl IirFilter {
    pub fn design(band: IirBand, srate: f64, order: usize) -> Result<Self> {
        check_srate(srate)?;
        if order == 0 {
            return Err(DspError::invalid("IIR order must be at least 1"));
        }
        if let IirBand::BandPass { lo, hi } | IirBand::BandStop { lo, hi } = band {
            if lo >= hi {
                return Err(DspError::InvalidBand { lo, hi });
            }
        }
        let nyquist = srate / 2.0;
        for edge in band.edges() {
            if !edge.is_finite() || edge < 0.0 || edge > nyquist {
                return Err(DspError::OutOfRange {
                    what: "cutoff",
                    value: edge,
                    limit: nyquist,
                });
            }
            // Bilinear pre-warping is singular at both ends.
            if edge == 0.0 || edge == nyquist {
                let (lo, hi) = match band {
                    IirBand::LowPass { cutoff } => (0.0, cutoff),
                    IirBand::HighPass { cutoff } => (cutoff, 0.0),
                    IirBand::BandPass { lo, hi } => (lo, hi),
                    IirBand::BandStop { lo, hi } => (hi, lo),
                };
                return Err(DspError::UnsupportedBand { lo, hi });
            }
        }

        let sections = match butter_dyn(
            order,
            band.edges(),
            Some(band.band_type()),
            Some(false),
            Some(FilterOutputType::Sos),
            Some(srate),
        ) {
            DigitalFilter::Sos(SosFormatFilter { sos }) => sos,
            _ => return Err(DspError::invalid("Butterworth design did not return sections")),
        };
        debug!(
            "Making IIR {} filter {:?} at {} Hz ({} sections)",
            band.name(),
            band.edges(),
            srate,
            sections.len()
        );
        Ok(Self {
            sections,
            band,
            srate,
            order,
        })
    }

    pub fn low_pass(cutoff: f64, srate: f64) -> Result<Self> {
        Self::design(IirBand::LowPass { cutoff }, srate, DEFAULT_IIR_ORDER)
    }

    pub fn high_pass(cutoff: f64, srate: f64) -> Result<Self> {
        Self::design(IirBand::HighPass { cutoff }, srate, DEFAULT_IIR_ORDER)
    }

    pub fn band_pass(lo: f64, hi: f64, srate: f64) -> Result<Self> {
        if lo >= hi {
            return Err(DspError::InvalidBand { lo, hi });
        }
        Self::design(IirBand::BandPass { lo, hi }, srate, DEFAULT_IIR_ORDER)
    }

    pub fn band_stop(lo: f64, hi: f64, srate: f64) -> Result<Self> {
        if lo >= hi {
            return Err(DspError::InvalidBand { lo, hi });
        }
        Self::design(IirBand::BandStop { lo, hi }, srate, DEFAULT_IIR_ORDER)
    }

    pub fn sections(&self) -> &[Sos<f64>] {
        &self.sections
    }

    pub fn band(&self) -> IirBand {
        self.band
    }

    pub fn srate(&self) -> f64 {
        self.srate
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Complex frequency response at `freq` Hz.
    pub fn response(&self, freq: f64) -> Complex64 {
        let w = 2.0 * PI * freq / self.srate;
        let z_inv = Complex64::from_polar(1.0, -w);
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, s| acc * section_response(s, z_inv))
    }

    /// Single causal pass from zero initial state.
    pub fn apply(&self, samples: &[f64]) -> Vec<f64> {
        let mut sections = self.sections.clone();
        sosfilt_dyn(samples.iter(), &mut sections)
    }

    /// Samples of odd extension added at each end by
    /// [`apply_forward_backward`](Self::apply_forward_backward).
    pub fn pad_len(&self) -> usize {
        3 * (2 * self.sections.len() + 1)
    }

    /// Zero-phase filtering: forward and backward passes over an odd
    /// extension of the signal, with steady-state initial conditions. The
    /// magnitude response is squared. Needs more than
    /// [`pad_len`](Self::pad_len) samples.
    pub fn apply_forward_backward(&self, samples: &[f64]) -> Result<Vec<f64>> {
        if samples.len() <= self.pad_len() {
            return Err(DspError::invalid(format!(
                "forward-backward filtering needs more than {} samples, got {}",
                self.pad_len(),
                samples.len()
            )));
        }
        Ok(sosfiltfilt_dyn(samples.iter(), &self.sections))
    }
}

/// Butterworth filter from the `(lo, hi)` convention of [`IirBand::from_edges`].
pub fn build_iir_filter(lo: f64, hi: f64, srate: f64) -> Result<IirFilter> {
    build_iir_filter_with_order(lo, hi, srate, DEFAULT_IIR_ORDER)
}

pub fn build_iir_filter_with_order(lo: f64, hi: f64, srate: f64, order: usize) -> Result<IirFilter> {
    check_srate(srate)?;
    for (what, value) in [("lo", lo), ("hi", hi)] {
        if !value.is_finite() || value < 0.0 || value > srate / 2.0 {
            return Err(DspError::OutOfRange {
                what,
                value,
                limit: srate / 2.0,
            });
        }
    }
    IirFilter::design(IirBand::from_edges(lo, hi)?, srate, order)
}
