// src/testgen/mod.rs
//
// Synthetic signal generation for tests and the demo binary.
// Builds single signals and `[epochs, channels, samples]` blocks out of
// tones, tone bursts, mains interference and linear chirps.

use std::f64::consts::PI;
use std::str::FromStr;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::error::{DspError, Result};

/// Stationary sinusoid `amplitude * sin(2π f t + phase)`.
pub fn tone(freq: f64, amplitude: f64, srate: f64, n: usize) -> Vec<f64> {
    tone_with_phase(freq, amplitude, 0.0, srate, n)
}

pub fn tone_with_phase(freq: f64, amplitude: f64, phase: f64, srate: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| amplitude * (2.0 * PI * freq * i as f64 / srate + phase).sin())
        .collect()
}

/// Sinusoid under a Hann window covering `[start_s, start_s + duration_s)`;
/// zero elsewhere.
pub fn tone_burst(
    freq: f64,
    amplitude: f64,
    start_s: f64,
    duration_s: f64,
    srate: f64,
    n: usize,
) -> Vec<f64> {
    burst_with_phase(freq, amplitude, 0.0, start_s, duration_s, srate, n)
}

fn burst_with_phase(
    freq: f64,
    amplitude: f64,
    phase: f64,
    start_s: f64,
    duration_s: f64,
    srate: f64,
    n: usize,
) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / srate;
            let u = (t - start_s) / duration_s;
            if !(0.0..1.0).contains(&u) {
                return 0.0;
            }
            let window = 0.5 - 0.5 * (2.0 * PI * u).cos();
            amplitude * window * (2.0 * PI * freq * t + phase).sin()
        })
        .collect()
}

/// Mains interference: the fundamental plus odd harmonics at 1/3, 1/5, ...
/// of its amplitude, up to Nyquist.
pub fn line_noise(mains_hz: f64, amplitude: f64, harmonics: usize, srate: f64, n: usize) -> Vec<f64> {
    let mut out = vec![0.0; n];
    for h in (1..=2 * harmonics.max(1)).step_by(2) {
        let freq = mains_hz * h as f64;
        if freq >= srate / 2.0 {
            break;
        }
        for (o, v) in out.iter_mut().zip(tone(freq, amplitude / h as f64, srate, n)) {
            *o += v;
        }
    }
    out
}

/// Linear chirp sweeping `f0` to `f1` over the whole signal.
pub fn chirp(f0: f64, f1: f64, amplitude: f64, srate: f64, n: usize) -> Vec<f64> {
    let duration = n as f64 / srate;
    let rate = (f1 - f0) / duration;
    (0..n)
        .map(|i| {
            let t = i as f64 / srate;
            amplitude * (2.0 * PI * (f0 * t + 0.5 * rate * t * t)).sin()
        })
        .collect()
}

/// Shape of one signal component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Waveform {
    Tone { freq: f64 },
    Burst { freq: f64, start_s: f64, duration_s: f64 },
    Chirp { f0: f64, f1: f64 },
}

/// One additive component of a synthetic recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub waveform: Waveform,
    pub amplitude: f64,
    /// Same phase in every epoch; otherwise the phase walks from epoch to
    /// epoch so the component cancels in the epoch average.
    pub phase_locked: bool,
}

impl Component {
    pub fn tone(freq: f64, amplitude: f64) -> Self {
        Self {
            waveform: Waveform::Tone { freq },
            amplitude,
            phase_locked: true,
        }
    }

    pub fn burst(freq: f64, amplitude: f64, start_s: f64, duration_s: f64) -> Self {
        Self {
            waveform: Waveform::Burst {
                freq,
                start_s,
                duration_s,
            },
            amplitude,
            phase_locked: true,
        }
    }

    pub fn chirp(f0: f64, f1: f64, amplitude: f64) -> Self {
        Self {
            waveform: Waveform::Chirp { f0, f1 },
            amplitude,
            phase_locked: true,
        }
    }

    /// Let the phase vary across epochs.
    pub fn induced(mut self) -> Self {
        self.phase_locked = false;
        self
    }

    fn render(&self, phase: f64, srate: f64, n: usize) -> Vec<f64> {
        match self.waveform {
            Waveform::Tone { freq } => tone_with_phase(freq, self.amplitude, phase, srate, n),
            Waveform::Burst {
                freq,
                start_s,
                duration_s,
            } => burst_with_phase(freq, self.amplitude, phase, start_s, duration_s, srate, n),
            Waveform::Chirp { f0, f1 } => chirp(f0, f1, self.amplitude, srate, n),
        }
    }
}

/// Parses `FREQ[:AMP[:START:DUR]][~]`, e.g. `10`, `40:2`, `25:1:0.3:0.2`.
/// A trailing `~` marks the component as induced.
impl FromStr for Component {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self> {
        let (body, induced) = match s.trim().strip_suffix('~') {
            Some(body) => (body, true),
            None => (s.trim(), false),
        };
        let fields = body
            .split(':')
            .map(|f| {
                f.trim()
                    .parse::<f64>()
                    .map_err(|_| DspError::invalid(format!("bad number '{f}' in component '{s}'")))
            })
            .collect::<Result<Vec<f64>>>()?;

        let component = match fields.as_slice() {
            [freq] => Component::tone(*freq, 1.0),
            [freq, amp] => Component::tone(*freq, *amp),
            [freq, amp, start, dur] if *dur > 0.0 => Component::burst(*freq, *amp, *start, *dur),
            _ => {
                return Err(DspError::invalid(format!(
                    "component '{s}' must be FREQ[:AMP[:START:DUR]]"
                )))
            }
        };
        Ok(if induced { component.induced() } else { component })
    }
}

/// Recipe for a multi-epoch, multi-channel synthetic recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSpec {
    pub srate: f64,
    pub samples: usize,
    pub epochs: usize,
    pub channels: usize,
    pub components: Vec<Component>,
    /// Mains frequency and amplitude added to every lane.
    pub line_noise: Option<(f64, f64)>,
}

impl SignalSpec {
    pub fn new(srate: f64, samples: usize) -> Self {
        Self {
            srate,
            samples,
            epochs: 1,
            channels: 1,
            components: Vec::new(),
            line_noise: None,
        }
    }

    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_line_noise(mut self, mains_hz: f64, amplitude: f64) -> Self {
        self.line_noise = Some((mains_hz, amplitude));
        self
    }

    /// Render the block `[epochs, channels, samples]`. Channel `c` carries
    /// every component scaled by `1 / (c + 1)`.
    pub fn generate(&self) -> Result<Array3<f64>> {
        if self.samples == 0 || self.epochs == 0 || self.channels == 0 {
            return Err(DspError::invalid("synthetic recording must not be empty"));
        }
        if !self.srate.is_finite() || self.srate <= 0.0 {
            return Err(DspError::invalid(format!(
                "sample rate must be positive, got {}",
                self.srate
            )));
        }

        let n = self.samples;
        let mains = match self.line_noise {
            Some((hz, amp)) => line_noise(hz, amp, 1, self.srate, n),
            None => vec![0.0; n],
        };

        let mut data = Array3::zeros((self.epochs, self.channels, n));
        for e in 0..self.epochs {
            let mut epoch = mains.clone();
            for component in &self.components {
                // Golden-angle steps keep the epoch phases spread evenly.
                let phase = if component.phase_locked {
                    0.0
                } else {
                    e as f64 * PI * (3.0 - 5f64.sqrt())
                };
                for (o, v) in epoch.iter_mut().zip(component.render(phase, self.srate, n)) {
                    *o += v;
                }
            }
            for c in 0..self.channels {
                let gain = 1.0 / (c + 1) as f64;
                for (i, v) in epoch.iter().enumerate() {
                    data[[e, c, i]] = v * gain;
                }
            }
        }
        Ok(data)
    }
}
