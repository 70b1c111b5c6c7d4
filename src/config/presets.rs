// src/config/presets.rs
//
// Time-frequency analysis settings with named presets and a fluent builder.

use serde::{Deserialize, Serialize};

use crate::core::dsp::{FilterKind, FrequencyBand, DEFAULT_IIR_ORDER, DEFAULT_ROLLOFF_HZ};
use crate::error::{DspError, Result};

/// How epochs are combined before or after the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AverageMode {
    /// Transform every epoch and channel, then average the power.
    /// Keeps induced activity that is not phase-locked.
    #[default]
    AverageOfStockwells,
    /// Average epochs per channel first, then transform.
    /// Keeps only the evoked, phase-locked part.
    StockwellOfAverage,
}

impl AverageMode {
    pub fn name(&self) -> &'static str {
        match self {
            AverageMode::AverageOfStockwells => "average of Stockwells",
            AverageMode::StockwellOfAverage => "Stockwell of average",
        }
    }
}

/// Per-row power normalisation applied after averaging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Normalization {
    #[default]
    None,
    /// Divide each row by its mean over the whole window.
    WholeWindow,
    /// Divide each row by its mean over `[start_s, end_s)` seconds from the
    /// start of the epoch.
    Baseline { start_s: f64, end_s: f64 },
}

/// Preset configurations for common analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TfPreset {
    /// Single-window Stockwell power, 0-80 Hz
    Standard,
    /// Three sine tapers for a lower-variance estimate
    Multitaper,
    /// Standard band with 59-61 Hz mains interference removed first
    LineNoise,
    /// User-defined settings
    Custom,
}

/// Complete analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfConfig {
    /// Configuration name
    pub name: String,
    /// Base preset this was derived from
    pub base_preset: TfPreset,
    /// Band of the time-frequency map in Hz
    pub band: FrequencyBand,
    /// Sine tapers per transform; 0 for a single rectangular window
    pub tapers: usize,
    /// Band removed from every epoch before analysis
    pub line_reject: Option<FrequencyBand>,
    /// Implementation used for `line_reject`
    pub filter_kind: FilterKind,
    /// Prototype order of IIR filters
    pub iir_order: usize,
    /// Gaussian roll-off of FFT filters in Hz
    pub rolloff_hz: f64,
    pub average: AverageMode,
    pub normalization: Normalization,
    /// Report `ln(power)` instead of power
    pub log_power: bool,
}

impl Default for TfConfig {
    fn default() -> Self {
        Self::from_preset(TfPreset::Standard)
    }
}

impl TfConfig {
    /// Create configuration from preset
    pub fn from_preset(preset: TfPreset) -> Self {
        match preset {
            TfPreset::Standard | TfPreset::Custom => Self::standard(preset),
            TfPreset::Multitaper => Self {
                name: "Multitaper".to_string(),
                base_preset: preset,
                tapers: 3,
                ..Self::standard(preset)
            },
            TfPreset::LineNoise => Self {
                name: "LineNoise".to_string(),
                base_preset: preset,
                line_reject: Some(FrequencyBand {
                    lo_hz: 59.0,
                    hi_hz: 61.0,
                }),
                ..Self::standard(preset)
            },
        }
    }

    fn standard(preset: TfPreset) -> Self {
        Self {
            name: "Standard".to_string(),
            base_preset: preset,
            band: FrequencyBand {
                lo_hz: 0.0,
                hi_hz: 80.0,
            },
            tapers: 0,
            line_reject: None,
            filter_kind: FilterKind::Fft,
            iir_order: DEFAULT_IIR_ORDER,
            rolloff_hz: DEFAULT_ROLLOFF_HZ,
            average: AverageMode::AverageOfStockwells,
            normalization: Normalization::None,
            log_power: false,
        }
    }

    /// Check every rule that does not depend on the data. Sample-rate and
    /// length dependent checks happen when the analysis runs.
    pub fn validate(&self) -> Result<()> {
        FrequencyBand::new(self.band.lo_hz, self.band.hi_hz)?;

        if let Some(reject) = &self.line_reject {
            FrequencyBand::new(reject.lo_hz, reject.hi_hz)?;
            if reject.lo_hz == 0.0 {
                return Err(DspError::invalid(
                    "line-noise reject band must start above 0 Hz",
                ));
            }
        }

        if self.iir_order == 0 {
            return Err(DspError::invalid("IIR order must be at least 1"));
        }

        if !self.rolloff_hz.is_finite() || self.rolloff_hz < 0.0 {
            return Err(DspError::invalid(format!(
                "roll-off must be a non-negative width in Hz, got {}",
                self.rolloff_hz
            )));
        }

        if let Normalization::Baseline { start_s, end_s } = self.normalization {
            if !start_s.is_finite() || !end_s.is_finite() || start_s < 0.0 || start_s >= end_s {
                return Err(DspError::invalid(format!(
                    "baseline window [{start_s}, {end_s}) s is empty or negative"
                )));
            }
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for custom configurations
pub struct TfConfigBuilder {
    config: TfConfig,
}

impl TfConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: TfConfig::from_preset(TfPreset::Custom),
        }
    }

    pub fn from_preset(preset: TfPreset) -> Self {
        Self {
            config: TfConfig::from_preset(preset),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn band(mut self, lo_hz: f64, hi_hz: f64) -> Self {
        self.config.band = FrequencyBand { lo_hz, hi_hz };
        self
    }

    pub fn tapers(mut self, count: usize) -> Self {
        self.config.tapers = count;
        self
    }

    pub fn line_reject(mut self, lo_hz: f64, hi_hz: f64) -> Self {
        self.config.line_reject = Some(FrequencyBand { lo_hz, hi_hz });
        self
    }

    pub fn no_line_reject(mut self) -> Self {
        self.config.line_reject = None;
        self
    }

    pub fn filter_kind(mut self, kind: FilterKind) -> Self {
        self.config.filter_kind = kind;
        self
    }

    pub fn iir_order(mut self, order: usize) -> Self {
        self.config.iir_order = order;
        self
    }

    pub fn rolloff_hz(mut self, rolloff_hz: f64) -> Self {
        self.config.rolloff_hz = rolloff_hz;
        self
    }

    pub fn average(mut self, mode: AverageMode) -> Self {
        self.config.average = mode;
        self
    }

    pub fn normalize(mut self, normalization: Normalization) -> Self {
        self.config.normalization = normalization;
        self
    }

    pub fn log_power(mut self, enabled: bool) -> Self {
        self.config.log_power = enabled;
        self
    }

    /// Finish the configuration, rejecting inconsistent settings.
    pub fn build(self) -> Result<TfConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for TfConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let standard = TfConfig::default();
        assert_eq!(standard.base_preset, TfPreset::Standard);
        assert_eq!(standard.tapers, 0);
        assert!(standard.line_reject.is_none());
        assert!(standard.validate().is_ok());

        let mt = TfConfig::from_preset(TfPreset::Multitaper);
        assert_eq!(mt.tapers, 3);
        assert_eq!(mt.band, standard.band);

        let line = TfConfig::from_preset(TfPreset::LineNoise);
        let reject = line.line_reject.unwrap();
        assert_eq!((reject.lo_hz, reject.hi_hz), (59.0, 61.0));
    }

    #[test]
    fn test_builder() {
        let config = TfConfigBuilder::new()
            .name("Alpha")
            .band(8.0, 12.0)
            .tapers(2)
            .filter_kind(FilterKind::Iir)
            .normalize(Normalization::Baseline {
                start_s: 0.0,
                end_s: 0.2,
            })
            .log_power(true)
            .build()
            .unwrap();

        assert_eq!(config.name, "Alpha");
        assert_eq!(config.base_preset, TfPreset::Custom);
        assert_eq!(config.tapers, 2);
        assert!(config.log_power);
    }

    #[test]
    fn test_validation_rules() {
        assert!(TfConfigBuilder::new().band(30.0, 10.0).build().is_err());
        assert!(TfConfigBuilder::new().iir_order(0).build().is_err());
        assert!(TfConfigBuilder::new().rolloff_hz(-1.0).build().is_err());
        assert!(TfConfigBuilder::new().line_reject(0.0, 2.0).build().is_err());
        assert!(TfConfigBuilder::new()
            .normalize(Normalization::Baseline {
                start_s: 0.5,
                end_s: 0.5,
            })
            .build()
            .is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = TfConfigBuilder::from_preset(TfPreset::LineNoise)
            .average(AverageMode::StockwellOfAverage)
            .build()
            .unwrap();
        let json = config.to_json().unwrap();
        assert_eq!(TfConfig::from_json(&json).unwrap(), config);

        assert!(matches!(
            TfConfig::from_json("{ \"name\": 3 }"),
            Err(DspError::Config(_))
        ));
    }
}
