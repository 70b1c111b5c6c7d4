// src/core/analysis/spectral.rs
//
// Whole-window power spectra: plain periodogram and sine-multitaper average.
// The analyzer uses these as the reference spectrum printed beside the
// time-frequency map.

use crate::core::analysis::stockwell::check_tapers;
use crate::core::dsp::fft::power_spectrum;
use crate::core::dsp::windows::TaperSet;
use crate::core::dsp::{bin_frequencies, check_srate};
use crate::error::{DspError, Result};

/// Multitaper power spectrum of `samples`, length `N/2`.
///
/// Averages `|DFT(taper_k * x)|^2` over the first `count` tapers. With
/// `count == 0` this is the plain periodogram `|DFT(x)|^2`.
pub fn smt(count: usize, tapers: &TaperSet, samples: &[f64]) -> Result<Vec<f64>> {
    if samples.is_empty() {
        return Err(DspError::invalid("cannot estimate the spectrum of an empty signal"));
    }
    check_tapers(count, tapers, samples.len())?;

    if count == 0 {
        return power_spectrum(samples);
    }

    let mut acc = vec![0.0; samples.len() / 2];
    for k in 0..count {
        let power = power_spectrum(&tapers.apply(k, samples))?;
        for (a, p) in acc.iter_mut().zip(power) {
            *a += p;
        }
    }
    let inv = 1.0 / count as f64;
    acc.iter_mut().for_each(|v| *v *= inv);
    Ok(acc)
}

/// A power spectrum together with its frequency axis.
#[derive(Debug, Clone)]
pub struct SpectrumEstimate {
    pub freqs: Vec<f64>,
    pub power: Vec<f64>,
    /// Taper count used; 0 for a periodogram.
    pub tapers: usize,
}

impl SpectrumEstimate {
    pub fn estimate(count: usize, tapers: &TaperSet, samples: &[f64], srate: f64) -> Result<Self> {
        check_srate(srate)?;
        let power = smt(count, tapers, samples)?;
        let freqs = bin_frequencies(samples.len(), srate)
            .into_iter()
            .take(power.len())
            .collect();
        Ok(Self {
            freqs,
            power,
            tapers: count,
        })
    }

    /// Restrict to bins `lo..=hi`, clamped to the available range.
    pub fn slice(&self, lo: usize, hi: usize) -> Self {
        let end = (hi + 1).min(self.power.len());
        let start = lo.min(end);
        Self {
            freqs: self.freqs[start..end].to_vec(),
            power: self.power[start..end].to_vec(),
            tapers: self.tapers,
        }
    }

    /// Frequency of the strongest bin.
    pub fn peak_frequency(&self) -> Option<f64> {
        crate::core::dsp::stats::argmax(&self.power).map(|i| self.freqs[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dsp::windows::calc_tapers;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn tone(freq: f64, srate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / srate).sin())
            .collect()
    }

    #[test]
    fn test_periodogram_length_and_peak() {
        let x = tone(32.0, 256.0, 256);
        let tapers = calc_tapers(0, 256).unwrap();
        let p = smt(0, &tapers, &x).unwrap();
        assert_eq!(p.len(), 128);
        assert_relative_eq!(p[32], 128.0 * 128.0, max_relative = 1e-9);
    }

    #[test]
    fn test_multitaper_spreads_power_around_tone() {
        let x = tone(40.0, 256.0, 256);
        let tapers = calc_tapers(4, 256).unwrap();
        let p = smt(4, &tapers, &x).unwrap();
        let peak = crate::core::dsp::stats::argmax(&p).unwrap();
        assert!((peak as i64 - 40).abs() <= 2);
        assert!(p[41] > 0.1 * p[peak]);
        assert!(p[100] < 1e-3 * p[peak]);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let tapers = calc_tapers(2, 64).unwrap();
        assert!(matches!(smt(0, &tapers, &[]), Err(DspError::InvalidInput(_))));
        assert!(matches!(
            smt(3, &tapers, &vec![0.0; 64]),
            Err(DspError::InvalidInput(_))
        ));
        assert!(matches!(
            smt(2, &tapers, &vec![0.0; 32]),
            Err(DspError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_estimate_axis() {
        let x = tone(10.0, 100.0, 200);
        let tapers = calc_tapers(0, 200).unwrap();
        let est = SpectrumEstimate::estimate(0, &tapers, &x, 100.0).unwrap();
        assert_eq!(est.freqs.len(), est.power.len());
        assert_relative_eq!(est.peak_frequency().unwrap(), 10.0);
        let band = est.slice(10, 30);
        assert_eq!(band.power.len(), 21);
        assert_relative_eq!(band.freqs[0], 5.0);
    }
}
