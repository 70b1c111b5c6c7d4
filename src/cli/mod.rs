// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::{Args, FilterArg, PresetArg};
pub use output::{format_report, print_json, print_report, JsonReport};
