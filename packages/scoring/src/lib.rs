#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The Urban Comfort Index engine.
//!
//! Turns normalized per-unit signals into a composite index, a letter
//! grade and an inspection priority, ranks units into a priority queue,
//! and runs the diagnostics around it: blind-spot detection from
//! cross-signal disagreement, z-score anomaly checks, short-horizon trend
//! forecasts and before/after intervention comparisons.
//!
//! Every operation is a pure function of its inputs and an
//! [`urban_comfort_scoring_models::config::EngineConfig`]. [`Engine`]
//! bundles a validated configuration with all of them.

pub mod anomaly;
pub mod batch;
pub mod blind_spot;
pub mod config;
pub mod engine;
pub mod forecast;
pub mod grade;
pub mod intervention;
pub mod rank;
pub mod score;
pub mod summary;

pub use engine::Engine;

/// Errors that can occur while loading or validating engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for the expected shape.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of range or inconsistent.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}
