//! Sine taper bank for multitaper smoothing

use std::f64::consts::PI;

use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{DspError, Result};

/// `K` orthonormal sine tapers of length `winlen`, stored row-wise.
///
/// Built once per `(K, winlen)` and shared read-only by every call that
/// needs it. A set with `K == 0` is valid and means "no tapering".
#[derive(Debug, Clone, PartialEq)]
pub struct TaperSet {
    tapers: Array2<f64>,
}

impl TaperSet {
    /// Sine tapers: `sqrt(2/(L+1)) * sin(pi*(k+1)*(n+1)/(L+1))`.
    pub fn sine(count: usize, winlen: usize) -> Result<Self> {
        if winlen == 0 {
            return Err(DspError::invalid("taper length must be non-zero"));
        }
        if count > winlen {
            return Err(DspError::invalid(format!(
                "{count} tapers requested but only {winlen} are orthogonal at this length"
            )));
        }

        let denom = (winlen + 1) as f64;
        let norm = (2.0 / denom).sqrt();
        let tapers = Array2::from_shape_fn((count, winlen), |(k, n)| {
            norm * (PI * (k + 1) as f64 * (n + 1) as f64 / denom).sin()
        });

        Ok(Self { tapers })
    }

    /// Number of tapers `K`.
    pub fn len(&self) -> usize {
        self.tapers.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn winlen(&self) -> usize {
        self.tapers.ncols()
    }

    pub fn taper(&self, k: usize) -> ArrayView1<'_, f64> {
        self.tapers.row(k)
    }

    pub fn iter(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.tapers.axis_iter(Axis(0))
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.tapers
    }

    /// Smoothing half-bandwidth in Hz for this set at `srate`.
    pub fn half_bandwidth(&self, srate: f64) -> f64 {
        calcbw(self.len(), self.winlen(), srate)
    }

    /// Pointwise product of taper `k` with `samples`.
    pub(crate) fn apply(&self, k: usize, samples: &[f64]) -> Vec<f64> {
        self.taper(k)
            .iter()
            .zip(samples.iter())
            .map(|(&w, &s)| w * s)
            .collect()
    }
}

/// Build `count` sine tapers of length `winlen`.
pub fn calc_tapers(count: usize, winlen: usize) -> Result<TaperSet> {
    TaperSet::sine(count, winlen)
}

/// Half-bandwidth in Hz of a `count`-taper sine multitaper estimate:
/// `(K+1) * srate / (2*(winlen+1))`.
pub fn calcbw(count: usize, winlen: usize, srate: f64) -> f64 {
    (count + 1) as f64 * srate / (2.0 * (winlen + 1) as f64)
}
