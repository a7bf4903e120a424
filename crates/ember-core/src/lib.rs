//! Ember Core - Foundational types for the Ember particle engine
//!
//! This crate provides the types shared by the simulation and its drivers:
//! - `Curve`, `Gradient` - Value-over-lifetime evaluation
//! - `Color` - Linear RGB color
//! - Error types and Result alias

mod curve;
mod error;
mod types;

pub use curve::{catmull_rom_scalar, Curve, CurveInterpolation, CurvePoint, Gradient, GradientStop};
pub use error::{EmberError, Result};
pub use types::Color;
