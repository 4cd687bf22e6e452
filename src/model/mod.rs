//! Core data types for coordinates, signals and trust reports.
//!
//! This module contains the fundamental types used throughout mvntrust:
//!
//! - [`MavenCoordinate`] - The dependency under evaluation
//! - [`SignalKind`] - The measured dimensions (scorecard, cadence, compatibility)
//! - [`RawSignal`] / [`NormalizedSignal`] - Fetched and normalized signal data
//! - [`TrustScore`] - The aggregate result with its weighted breakdown
//! - [`TrustReport`] - Complete output of one evaluation

mod coordinate;
mod signal;

pub use coordinate::*;
pub use signal::*;
