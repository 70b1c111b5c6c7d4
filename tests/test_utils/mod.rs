#![allow(dead_code)]

use std::f64::consts::PI;
use std::path::PathBuf;
use std::process::Command;

pub fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_stockwell"))
}

pub fn run_stockwell<I, S>(args: I) -> std::process::Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(get_binary_path())
        .args(args)
        .output()
        .expect("Failed to execute stockwell binary")
}

pub fn sine(freq: f64, amplitude: f64, srate: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| amplitude * (2.0 * PI * freq * i as f64 / srate).sin())
        .collect()
}

pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

/// RMS over `x[skip .. len - skip]`, away from edge transients.
pub fn interior_rms(x: &[f64], skip: usize) -> f64 {
    let inner = &x[skip..x.len() - skip];
    (inner.iter().map(|v| v * v).sum::<f64>() / inner.len() as f64).sqrt()
}

/// Largest absolute difference between two equal-length signals over the
/// interior.
pub fn interior_max_error(a: &[f64], b: &[f64], skip: usize) -> f64 {
    a[skip..a.len() - skip]
        .iter()
        .zip(&b[skip..b.len() - skip])
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

/// Deterministic pseudo-random noise in [-amplitude, amplitude).
pub fn noise(amplitude: f64, n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            amplitude * (2.0 * unit - 1.0)
        })
        .collect()
}
