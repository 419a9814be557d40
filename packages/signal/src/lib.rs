#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Signal normalization for the Urban Comfort Index.
//!
//! Absorbs the shape variance of raw per-unit payloads (key spelling,
//! numbers as strings, nested or flat layout) and produces canonical
//! [`urban_comfort_signal_models::SignalSet`] values. Everything here is a
//! total function: malformed input is defaulted or clamped, never raised.

pub mod normalize;
pub mod parsing;

pub use normalize::{normalize, normalize_unit, normalize_units};
