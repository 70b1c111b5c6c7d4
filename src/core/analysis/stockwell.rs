// src/core/analysis/stockwell.rs
//
// Stockwell (S) transform and its multitaper extension.
//
// One forward DFT of the signal is shared by every row. Row `f` is the
// spectrum shifted so bin `f` sits at DC, weighted by a Gaussian of standard
// deviation f/(2π) bins, and transformed back. Rows are independent and are
// computed in parallel.

use std::f64::consts::PI;

use ndarray::Array2;
use rayon::prelude::*;
use num_complex::Complex64;

use crate::core::dsp::fft::FftProcessor;
use crate::core::dsp::stats::mean;
use crate::core::dsp::windows::TaperSet;
use crate::core::dsp::BinRange;
use crate::error::{DspError, Result};

/// Stockwell transform for signals of one fixed length.
///
/// Holds the DFT plans, so a single engine can be reused across every epoch
/// and channel of an analysis. It is `Sync`; share it by reference between
/// threads.
///
/// Rows with `f > 0` use the scaling of the unnormalised DFT: a stationary
/// sinusoid of amplitude `A` sitting on bin `f` gives `|S(f, t)| = N*A/2`
/// for every `t`. Row `f == 0` is the signal mean broadcast over time.
///
/// The voice of row `f` spans about `f` bins, so rows close to `N/2` also
/// pick up the mirrored negative-frequency image. A tone within a few
/// percent of Nyquist no longer peaks on its own row.
#[derive(Debug, Clone)]
pub struct StockwellEngine {
    fft: FftProcessor,
}

impl StockwellEngine {
    pub fn new(len: usize) -> Result<Self> {
        Ok(Self {
            fft: FftProcessor::new(len)?,
        })
    }

    pub fn len(&self) -> usize {
        self.fft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fft.is_empty()
    }

    fn check_signal(&self, samples: &[f64]) -> Result<()> {
        if samples.is_empty() {
            return Err(DspError::invalid("cannot transform an empty signal"));
        }
        if samples.len() != self.len() {
            return Err(DspError::LengthMismatch {
                expected: self.len(),
                actual: samples.len(),
            });
        }
        Ok(())
    }

    /// Complex transform over rows `bins.lo..=bins.hi`, shape `(rows, N)`.
    pub fn transform(&self, samples: &[f64], bins: BinRange) -> Result<Array2<Complex64>> {
        self.check_signal(samples)?;
        let n = self.len();
        let bins = BinRange::new(bins.lo, bins.hi, n)?;

        let spectrum = self.fft.dft(samples)?;
        let dc = mean(samples);

        let rows = bins
            .iter()
            .into_par_iter()
            .map(|f| self.row(&spectrum, f, dc))
            .collect::<Result<Vec<Vec<Complex64>>>>()?;

        let flat: Vec<Complex64> = rows.into_iter().flatten().collect();
        Ok(Array2::from_shape_vec((bins.len(), n), flat)?)
    }

    fn row(&self, spectrum: &[Complex64], f: usize, dc: f64) -> Result<Vec<Complex64>> {
        let n = spectrum.len();
        if f == 0 {
            return Ok(vec![Complex64::new(dc, 0.0); n]);
        }

        let scale = -2.0 * PI * PI / (f * f) as f64;
        let mut buffer: Vec<Complex64> = (0..n)
            .map(|i| {
                let m = if i <= n / 2 { i as f64 } else { i as f64 - n as f64 };
                spectrum[(i + f) % n] * (scale * m * m).exp()
            })
            .collect();
        self.fft.idft_unscaled_in_place(&mut buffer)?;
        Ok(buffer)
    }

    /// `|S|^2` over the requested rows.
    pub fn power(&self, samples: &[f64], bins: BinRange) -> Result<Array2<f64>> {
        Ok(self.transform(samples, bins)?.mapv(|c| c.norm_sqr()))
    }

    /// Mean of `|S|^2` over the first `count` tapers of `tapers`; plain
    /// power when `count == 0`.
    pub fn multitaper(
        &self,
        count: usize,
        tapers: &TaperSet,
        samples: &[f64],
        bins: BinRange,
    ) -> Result<Array2<f64>> {
        self.check_signal(samples)?;
        let bins = BinRange::new(bins.lo, bins.hi, self.len())?;
        check_tapers(count, tapers, samples.len())?;

        if count == 0 {
            return self.power(samples, bins);
        }

        let mut acc = Array2::<f64>::zeros((bins.len(), self.len()));
        for k in 0..count {
            let tapered = tapers.apply(k, samples);
            let st = self.transform(&tapered, bins)?;
            acc.zip_mut_with(&st, |a, c| *a += c.norm_sqr());
        }
        let inv = 1.0 / count as f64;
        acc.mapv_inplace(|v| v * inv);
        Ok(acc)
    }
}

pub(crate) fn check_tapers(count: usize, tapers: &TaperSet, len: usize) -> Result<()> {
    if count > tapers.len() {
        return Err(DspError::invalid(format!(
            "{count} tapers requested but the set holds {}",
            tapers.len()
        )));
    }
    if count > 0 && tapers.winlen() != len {
        return Err(DspError::LengthMismatch {
            expected: tapers.winlen(),
            actual: len,
        });
    }
    Ok(())
}

/// Stockwell transform of `samples` over bins `bin_lo..=bin_hi`.
///
/// Result shape is `(bin_hi - bin_lo + 1, N)`.
pub fn stockwell(samples: &[f64], bin_lo: usize, bin_hi: usize) -> Result<Array2<Complex64>> {
    if samples.is_empty() {
        return Err(DspError::invalid("cannot transform an empty signal"));
    }
    let bins = BinRange::new(bin_lo, bin_hi, samples.len())?;
    StockwellEngine::new(samples.len())?.transform(samples, bins)
}

/// Multitaper Stockwell power: mean over `count` tapers of
/// `|stockwell(taper_k * x)|^2`.
pub fn mt_stockwell(
    count: usize,
    tapers: &TaperSet,
    samples: &[f64],
    bin_lo: usize,
    bin_hi: usize,
) -> Result<Array2<f64>> {
    if samples.is_empty() {
        return Err(DspError::invalid("cannot transform an empty signal"));
    }
    let bins = BinRange::new(bin_lo, bin_hi, samples.len())?;
    StockwellEngine::new(samples.len())?.multitaper(count, tapers, samples, bins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dsp::windows::calc_tapers;
    use approx::assert_abs_diff_eq;

    fn tone(freq: f64, srate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / srate).sin())
            .collect()
    }

    #[test]
    fn test_shape() {
        let x = tone(5.0, 100.0, 100);
        let s = stockwell(&x, 3, 9).unwrap();
        assert_eq!(s.dim(), (7, 100));
    }

    #[test]
    fn test_dc_row_is_mean() {
        let x: Vec<f64> = (0..50).map(|i| (i as f64 * 0.3).cos() + 2.5).collect();
        let m = mean(&x);
        let s = stockwell(&x, 0, 0).unwrap();
        for v in s.row(0) {
            assert_abs_diff_eq!(v.re, m, epsilon = 1e-12);
            assert_abs_diff_eq!(v.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_bin_centred_tone_has_flat_row() {
        let n = 128;
        let x = tone(16.0, n as f64, n);
        let s = stockwell(&x, 16, 16).unwrap();
        for v in s.row(0) {
            assert_abs_diff_eq!(v.norm(), n as f64 / 2.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_errors() {
        let x = tone(5.0, 100.0, 100);
        assert!(matches!(stockwell(&[], 0, 0), Err(DspError::InvalidInput(_))));
        assert!(matches!(stockwell(&x, 9, 3), Err(DspError::InvalidBand { .. })));
        assert!(matches!(stockwell(&x, 0, 51), Err(DspError::OutOfRange { .. })));

        let tapers = calc_tapers(2, 100).unwrap();
        assert!(matches!(
            mt_stockwell(3, &tapers, &x, 0, 10),
            Err(DspError::InvalidInput(_))
        ));
        let short = calc_tapers(2, 64).unwrap();
        assert!(matches!(
            mt_stockwell(2, &short, &x, 0, 10),
            Err(DspError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_tapers_is_plain_power() {
        let x = tone(7.0, 64.0, 64);
        let tapers = calc_tapers(0, 64).unwrap();
        let mt = mt_stockwell(0, &tapers, &x, 0, 32).unwrap();
        let st = stockwell(&x, 0, 32).unwrap();
        for (a, b) in mt.iter().zip(st.iter()) {
            assert_abs_diff_eq!(*a, b.norm_sqr(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_multitaper_is_non_negative_and_peaks_at_tone() {
        let n = 256;
        let x = tone(20.0, n as f64, n);
        let tapers = calc_tapers(3, n).unwrap();
        let p = mt_stockwell(3, &tapers, &x, 0, 40).unwrap();
        assert!(p.iter().all(|&v| v >= 0.0));
        let mid = n / 2;
        let column: Vec<f64> = p.column(mid).to_vec();
        let peak = crate::core::dsp::stats::argmax(&column).unwrap();
        assert!((peak as i64 - 20).abs() <= 1, "peak row {peak}");
    }

    #[test]
    fn test_engine_rejects_other_lengths() {
        let engine = StockwellEngine::new(64).unwrap();
        let x = vec![0.0; 32];
        assert!(matches!(
            engine.transform(&x, BinRange { lo: 0, hi: 4 }),
            Err(DspError::LengthMismatch { .. })
        ));
    }
}
