//! Configuration module for time-frequency analysis

mod presets;

pub use presets::{AverageMode, Normalization, TfConfig, TfConfigBuilder, TfPreset};
