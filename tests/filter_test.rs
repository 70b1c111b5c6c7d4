// tests/filter_test.rs
//
// Filter design and application: FFT band-pass and notch, Butterworth IIR,
// Hilbert / analytic signal.

mod test_utils;

use std::f64::consts::PI;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use stockwell::core::dsp::{
    build_iir_filter, build_reject_filter, envelope, instantaneous_phase, FftFilterDesign,
    IirBand, IirFilter,
};
use stockwell::{
    analytic_signal, apply, build_fft_filter, build_filter, build_hilbert_filter,
    build_notch_filter, DspError, FilterKind, FilterSpec,
};
use test_utils::{add, interior_max_error, interior_rms, sine};

const SQRT_HALF: f64 = std::f64::consts::FRAC_1_SQRT_2;

#[test]
fn test_fft_band_pass_keeps_in_band_tone() {
    let filter: FilterSpec = build_fft_filter(10.0, 30.0, 1000.0, 1024).unwrap().into();
    let out = apply(&sine(20.0, 1.0, 1000.0, 1024), &filter).unwrap();
    let rms = interior_rms(&out, 100);
    assert_relative_eq!(rms, SQRT_HALF, max_relative = 0.05);
}

#[test]
fn test_fft_band_pass_removes_out_of_band_tone() {
    let filter: FilterSpec = build_fft_filter(10.0, 30.0, 1000.0, 1024).unwrap().into();
    let out = apply(&sine(200.0, 1.0, 1000.0, 1024), &filter).unwrap();
    assert!(interior_rms(&out, 100) < 0.1 * SQRT_HALF);
}

#[test]
fn test_notch_rejects_line_frequency() {
    let notch: FilterSpec = build_notch_filter(59.0, 61.0, 1000.0, 1000).unwrap().into();
    let hum = apply(&sine(60.0, 1.0, 1000.0, 1000), &notch).unwrap();
    assert!(interior_rms(&hum, 50) < 0.1 * SQRT_HALF);

    let kept = apply(&sine(20.0, 1.0, 1000.0, 1000), &notch).unwrap();
    assert_relative_eq!(interior_rms(&kept, 50), SQRT_HALF, max_relative = 0.05);
}

#[test]
fn test_notch_rejects_off_bin_line_frequency() {
    let notch: FilterSpec = build_notch_filter(59.0, 61.0, 1000.0, 1024).unwrap().into();
    let hum = apply(&sine(60.0, 1.0, 1000.0, 1024), &notch).unwrap();
    assert!(interior_rms(&hum, 50) < 0.1 * SQRT_HALF);

    let kept = apply(&sine(20.0, 1.0, 1000.0, 1024), &notch).unwrap();
    assert_relative_eq!(interior_rms(&kept, 50), SQRT_HALF, max_relative = 0.05);

    // A short record still gets at least two bins of roll-off.
    let short = build_notch_filter(59.0, 61.0, 1000.0, 256).unwrap();
    let hum = short.apply(&sine(60.0, 1.0, 1000.0, 256)).unwrap();
    assert!(interior_rms(&hum, 20) < 0.1 * SQRT_HALF);
}

#[test]
fn test_band_pass_keeps_off_bin_tones() {
    let filter = build_fft_filter(10.0, 30.0, 1000.0, 1024).unwrap();
    for f0 in [13.0, 20.0, 27.0] {
        let out = filter.apply(&sine(f0, 1.0, 1000.0, 1024)).unwrap();
        assert_relative_eq!(interior_rms(&out, 100), SQRT_HALF, max_relative = 0.05);
    }
}

#[test]
fn test_notch_cleans_mixture() {
    let (srate, n) = (600.0, 3000);
    let clean = sine(20.0, 1.0, srate, n);
    let mixed = add(&clean, &sine(60.0, 2.0, srate, n));
    let notch = build_notch_filter(59.0, 61.0, srate, n).unwrap();
    let out = notch.apply(&mixed).unwrap();
    assert!(interior_max_error(&out, &clean, 0) < 1e-6);
}

#[test]
fn test_gains_are_symmetric_and_smooth() {
    let filter = build_fft_filter(10.0, 30.0, 1000.0, 1000).unwrap();
    let g = filter.gains();
    for k in 1..1000 {
        assert_eq!(g[k], g[1000 - k]);
    }
    assert_eq!(g[20], 1.0);
    // Half a roll-off width outside the edge the gain is between 0 and 1.
    let just_outside = g[31];
    assert!(just_outside > 0.0 && just_outside < 1.0);
    assert!(g[100] < 1e-12);

    let hard = FftFilterDesign::new(10.0, 30.0, 1000.0, 1000)
        .rolloff(0.0)
        .band_pass()
        .unwrap();
    assert_eq!(hard.gains()[31], 0.0);
    assert_eq!(hard.gains()[30], 1.0);
}

#[test]
fn test_fft_filter_validation() {
    assert!(matches!(
        build_fft_filter(30.0, 10.0, 1000.0, 1024),
        Err(DspError::InvalidBand { .. })
    ));
    assert!(matches!(
        build_fft_filter(-1.0, 10.0, 1000.0, 1024),
        Err(DspError::OutOfRange { .. })
    ));
    assert!(matches!(
        build_fft_filter(10.0, 600.0, 1000.0, 1024),
        Err(DspError::OutOfRange { .. })
    ));
    assert!(matches!(
        build_fft_filter(10.0, 30.0, 1000.0, 0),
        Err(DspError::InvalidInput(_))
    ));

    let filter = build_fft_filter(10.0, 30.0, 1000.0, 1024).unwrap();
    assert!(matches!(
        filter.apply(&vec![0.0; 1000]),
        Err(DspError::LengthMismatch {
            expected: 1024,
            actual: 1000
        })
    ));
}

#[test]
fn test_iir_low_pass_response_and_output() {
    let filter = build_iir_filter(0.0, 40.0, 1000.0).unwrap();
    assert_relative_eq!(filter.response(40.0).norm(), SQRT_HALF, max_relative = 1e-6);
    assert_relative_eq!(filter.response(0.0).norm(), 1.0, max_relative = 1e-9);

    let passed = filter.apply(&sine(5.0, 1.0, 1000.0, 4000));
    assert_relative_eq!(interior_rms(&passed[1000..], 0), SQRT_HALF, max_relative = 0.02);

    let stopped = filter.apply(&sine(250.0, 1.0, 1000.0, 4000));
    assert!(interior_rms(&stopped[1000..], 0) < 0.01);
}

#[test]
fn test_iir_band_reject_for_line_noise() {
    let filter = build_reject_filter(FilterKind::Iir, 59.0, 61.0, 1000.0, 0).unwrap();
    let hum = filter.apply(&sine(60.0, 1.0, 1000.0, 6000)).unwrap();
    assert!(interior_rms(&hum[4000..], 0) < 0.1 * SQRT_HALF);

    let kept = filter.apply(&sine(20.0, 1.0, 1000.0, 6000)).unwrap();
    assert_relative_eq!(interior_rms(&kept[4000..], 0), SQRT_HALF, max_relative = 0.05);
}

#[test]
fn test_iir_edge_semantics() {
    assert!(matches!(
        IirBand::from_edges(0.0, 40.0).unwrap(),
        IirBand::LowPass { .. }
    ));
    assert!(matches!(
        IirBand::from_edges(40.0, 0.0).unwrap(),
        IirBand::HighPass { .. }
    ));
    assert!(matches!(
        IirBand::from_edges(61.0, 59.0).unwrap(),
        IirBand::BandStop { lo, hi } if lo == 59.0 && hi == 61.0
    ));
    assert!(matches!(
        build_iir_filter(20.0, 20.0, 1000.0),
        Err(DspError::UnsupportedBand { .. })
    ));
    assert!(matches!(
        build_iir_filter(0.0, 600.0, 1000.0),
        Err(DspError::OutOfRange { .. })
    ));
}

#[test]
fn test_iir_works_on_any_length_and_is_single_pass() {
    let filter = IirFilter::band_pass(8.0, 12.0, 250.0).unwrap();
    for n in [1usize, 17, 1000] {
        assert_eq!(filter.apply(&vec![1.0; n]).len(), n);
    }
    // A causal filter does not respond before the impulse.
    let mut impulse = vec![0.0; 200];
    impulse[100] = 1.0;
    let out = filter.apply(&impulse);
    assert!(out[..100].iter().all(|&v| v == 0.0));
    assert!(out[100..].iter().any(|&v| v != 0.0));
}

#[test]
fn test_forward_backward_is_zero_phase() {
    let filter = build_iir_filter(0.0, 40.0, 1000.0).unwrap();
    let x = sine(10.0, 1.0, 1000.0, 3000);
    let single = filter.apply(&x);
    let double = filter.apply_forward_backward(&x).unwrap();
    assert!(interior_max_error(&double, &x, 500) < 0.01);
    assert!(interior_max_error(&single, &x, 500) > 0.1);
}

#[test]
fn test_build_filter_switches_kind() {
    let x = sine(20.0, 1.0, 1000.0, 4000);
    for kind in [FilterKind::Fft, FilterKind::Iir] {
        let filter = build_filter(kind, 10.0, 30.0, 1000.0, 4000).unwrap();
        assert_eq!(filter.kind(), kind);
        let out = filter.apply(&x).unwrap();
        assert_relative_eq!(interior_rms(&out, 1000), SQRT_HALF, max_relative = 0.05);
    }
    assert!(matches!(
        build_filter(FilterKind::Iir, 30.0, 10.0, 1000.0, 0),
        Err(DspError::InvalidBand { .. })
    ));
}

#[test]
fn test_analytic_signal_of_sinusoid() {
    let (srate, n) = (1000.0, 1000);
    let x = sine(50.0, 1.5, srate, n);
    let z = analytic_signal(&x).unwrap();
    for (zi, xi) in z.iter().zip(&x) {
        assert_abs_diff_eq!(zi.re, *xi, epsilon = 1e-9);
    }
    for e in envelope(&x).unwrap() {
        assert_abs_diff_eq!(e, 1.5, epsilon = 1e-9);
    }
    let phase = instantaneous_phase(&x).unwrap();
    for (i, p) in phase.iter().enumerate().step_by(37) {
        let expected = 2.0 * PI * 50.0 * i as f64 / srate - PI / 2.0;
        let wrapped = (expected + PI).rem_euclid(2.0 * PI) - PI;
        let diff = (p - wrapped + PI).rem_euclid(2.0 * PI) - PI;
        assert_abs_diff_eq!(diff, 0.0, epsilon = 1e-6);
    }
}

#[test]
fn test_band_limited_hilbert_envelope() {
    let (srate, n) = (1000.0, 1000);
    let x = add(&sine(10.0, 2.0, srate, n), &sine(80.0, 1.0, srate, n));
    let filter = build_hilbert_filter(5.0, 15.0, srate, n).unwrap();
    let z = filter.apply(&x).unwrap();
    for c in &z {
        assert_abs_diff_eq!(c.norm(), 2.0, epsilon = 1e-6);
    }
    assert!(matches!(
        filter.apply(&x[..500]),
        Err(DspError::LengthMismatch { .. })
    ));
}
