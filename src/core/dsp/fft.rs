//! Complex DFT adapter over rustfft
//!
//! Forward transforms are unscaled; [`FftProcessor::idft`] applies the `1/N`
//! factor so that `idft(dft(x)) == x`. Any length works: rustfft picks a
//! mixed-radix or Bluestein plan for non-power-of-two sizes.

use std::sync::Arc;

use realfft::RealFftPlanner;
use rustfft::{num_complex::Complex64, Fft, FftPlanner};

use crate::error::{DspError, Result};

/// Forward and inverse plans for one transform length.
///
/// Plans are `Send + Sync`, so a single processor can be shared by the
/// worker threads that compute Stockwell rows.
#[derive(Clone)]
pub struct FftProcessor {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    len: usize,
}

impl std::fmt::Debug for FftProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FftProcessor").field("len", &self.len).finish()
    }
}

impl FftProcessor {
    pub fn new(len: usize) -> Result<Self> {
        if len == 0 {
            return Err(DspError::invalid("transform length must be non-zero"));
        }
        let mut planner = FftPlanner::new();
        Ok(Self {
            forward: planner.plan_fft_forward(len),
            inverse: planner.plan_fft_inverse(len),
            len,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        if actual != self.len {
            return Err(DspError::LengthMismatch {
                expected: self.len,
                actual,
            });
        }
        Ok(())
    }

    /// Unscaled forward transform of a real signal.
    pub fn dft(&self, samples: &[f64]) -> Result<Vec<Complex64>> {
        self.check_len(samples.len())?;
        let mut buffer: Vec<Complex64> = samples
            .iter()
            .map(|&s| Complex64::new(s, 0.0))
            .collect();
        self.forward.process(&mut buffer);
        Ok(buffer)
    }

    /// Inverse transform with the `1/N` normalisation.
    pub fn idft(&self, spectrum: &[Complex64]) -> Result<Vec<Complex64>> {
        let mut buffer = spectrum.to_vec();
        self.idft_unscaled_in_place(&mut buffer)?;
        let scale = 1.0 / self.len as f64;
        buffer.iter_mut().for_each(|c| *c *= scale);
        Ok(buffer)
    }

    /// Real part of [`idft`](Self::idft), for spectra known to be Hermitian.
    pub fn idft_real(&self, spectrum: &[Complex64]) -> Result<Vec<f64>> {
        Ok(self.idft(spectrum)?.into_iter().map(|c| c.re).collect())
    }

    /// Inverse transform without the `1/N` factor.
    pub fn idft_unscaled_in_place(&self, buffer: &mut [Complex64]) -> Result<()> {
        self.check_len(buffer.len())?;
        self.inverse.process(buffer);
        Ok(())
    }
}

/// One-shot forward transform of a real signal.
pub fn dft(samples: &[f64]) -> Result<Vec<Complex64>> {
    FftProcessor::new(samples.len())?.dft(samples)
}

/// One-shot normalised inverse transform.
pub fn idft(spectrum: &[Complex64]) -> Result<Vec<Complex64>> {
    FftProcessor::new(spectrum.len())?.idft(spectrum)
}

/// `|X[k]|^2` for `k` in `0..N/2` of a real signal, via a real-input plan.
pub fn power_spectrum(samples: &[f64]) -> Result<Vec<f64>> {
    let n = samples.len();
    if n == 0 {
        return Err(DspError::invalid("cannot transform an empty signal"));
    }
    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(n);
    let mut input = samples.to_vec();
    let mut output = r2c.make_output_vec();
    r2c.process(&mut input, &mut output)?;

    Ok(output[..n / 2].iter().map(|c| c.norm_sqr()).collect())
}

/// Frequency in Hz of each DFT bin, negative for the upper half
/// (`numpy.fft.fftfreq` layout).
pub fn bin_frequencies(n: usize, srate: f64) -> Vec<f64> {
    let df = srate / n as f64;
    (0..n)
        .map(|i| {
            if i <= (n - 1) / 2 {
                i as f64 * df
            } else {
                (i as f64 - n as f64) * df
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_round_trip_odd_length() {
        let x: Vec<f64> = (0..77).map(|i| (i as f64 * 0.37).sin() + 0.1 * i as f64).collect();
        let proc = FftProcessor::new(x.len()).unwrap();
        let back = proc.idft_real(&proc.dft(&x).unwrap()).unwrap();
        for (a, b) in x.iter().zip(back.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9 * (1.0 + a.abs()));
        }
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(matches!(FftProcessor::new(0), Err(DspError::InvalidInput(_))));
        assert!(dft(&[]).is_err());
    }

    #[test]
    fn test_power_spectrum_matches_complex_dft() {
        let n = 128;
        let x: Vec<f64> = (0..n).map(|i| (2.0 * PI * 5.0 * i as f64 / n as f64).cos()).collect();
        let power = power_spectrum(&x).unwrap();
        let full = dft(&x).unwrap();
        assert_eq!(power.len(), n / 2);
        for k in 0..n / 2 {
            assert_abs_diff_eq!(power[k], full[k].norm_sqr(), epsilon = 1e-6);
        }
        assert_abs_diff_eq!(power[5], (n as f64 / 2.0).powi(2), epsilon = 1e-6);
    }

    #[test]
    fn test_bin_frequencies_layout() {
        let f = bin_frequencies(6, 6.0);
        assert_eq!(f, vec![0.0, 1.0, 2.0, -3.0, -2.0, -1.0]);
        let f = bin_frequencies(5, 5.0);
        assert_eq!(f, vec![0.0, 1.0, 2.0, -2.0, -1.0]);
    }
}
