//! Output formatting for CLI results

use colorful::Colorful;
use serde::Serialize;

use crate::config::{Normalization, TfConfig};
use crate::core::dsp::stats::power_to_db;
use crate::core::{TfResult, TfSummary};

/// Everything the JSON report carries.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub config: &'a TfConfig,
    pub summary: TfSummary,
    pub freqs: &'a [f64],
    pub mean_power: Vec<f64>,
    pub spectrum: &'a [f64],
}

impl<'a> JsonReport<'a> {
    pub fn new(config: &'a TfConfig, result: &'a TfResult) -> Self {
        Self {
            config,
            summary: result.summary(),
            freqs: &result.freqs,
            mean_power: result.mean_over_time(),
            spectrum: &result.spectrum.power,
        }
    }
}

pub fn print_json(config: &TfConfig, result: &TfResult) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(&JsonReport::new(config, result))?);
    Ok(())
}

fn describe_normalization(normalization: &Normalization) -> String {
    match normalization {
        Normalization::None => "none".to_string(),
        Normalization::WholeWindow => "whole window".to_string(),
        Normalization::Baseline { start_s, end_s } => format!("baseline {start_s}-{end_s} s"),
    }
}

/// Format the analysis for terminal output
pub fn format_report(config: &TfConfig, result: &TfResult, max_rows: usize) -> String {
    let summary = result.summary();
    let mut output = String::new();

    output.push_str(&format!(
        "{} {}\n",
        "Stockwell analysis".bold(),
        format!("[{}]", config.name).dim()
    ));
    output.push_str(&format!(
        "  {} epochs x {} channels x {} samples at {} Hz\n",
        summary.epochs, summary.channels, summary.samples, result.srate
    ));
    output.push_str(&format!(
        "  Band: {:.2}-{:.2} Hz ({} rows), {}\n",
        summary.freq_lo_hz,
        summary.freq_hi_hz,
        summary.rows,
        config.average.name()
    ));
    match summary.bandwidth_hz {
        Some(bw) => output.push_str(&format!(
            "  Tapers: {} (smoothing bandwidth {:.3} Hz)\n",
            summary.tapers, bw
        )),
        None => output.push_str("  Tapers: none\n"),
    }
    if let Some(reject) = &config.line_reject {
        output.push_str(&format!(
            "  Rejected {}-{} Hz with {} filter\n",
            reject.lo_hz, reject.hi_hz, config.filter_kind
        ));
    }
    output.push_str(&format!(
        "  Normalization: {}{}\n",
        describe_normalization(&config.normalization),
        if summary.log_power { ", ln power" } else { "" }
    ));

    output.push_str(&format!(
        "\n  {:>10}  {:>14}  {:>14}\n",
        "Hz", "mean power", "spectrum"
    ));
    let means = result.mean_over_time();
    let step = means.len().div_ceil(max_rows.max(1)).max(1);
    for row in (0..means.len()).step_by(step) {
        let line = format!(
            "  {:>10.2}  {:>14.4e}  {:>14.4e}",
            result.freqs[row],
            means[row],
            result.spectrum.power.get(row).copied().unwrap_or(0.0)
        );
        if result.freqs[row] == summary.dominant_freq_hz {
            output.push_str(&format!("{}\n", line.green()));
        } else {
            output.push_str(&format!("{line}\n"));
        }
    }

    output.push_str(&format!(
        "\n  Dominant frequency: {}\n",
        format!("{:.2} Hz", summary.dominant_freq_hz).cyan()
    ));
    let level = if summary.log_power {
        String::new()
    } else {
        format!(" ({:.1} dB)", power_to_db(summary.peak_power))
    };
    output.push_str(&format!(
        "  Peak: {:.4e}{} at {:.2} Hz, {:.3} s\n",
        summary.peak_power, level, summary.peak_freq_hz, summary.peak_time_s
    ));
    if let Some(hz) = summary.spectrum_peak_hz {
        output.push_str(&format!("  Spectrum peak: {hz:.2} Hz\n"));
    }
    output
}

pub fn print_report(config: &TfConfig, result: &TfResult, max_rows: usize) {
    print!("{}", format_report(config, result, max_rows));
}
