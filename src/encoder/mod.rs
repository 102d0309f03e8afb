// SPDX-License-Identifier: MIT

//! # Quadrature Encoders
//!
//! Software quadrature decoding and wheel speed estimation.
//!
//! ## Modules
//!
//! - [`quadrature`] - Edge/sample decoding into a shared tick accumulator.
//! - [`speed`] - Tick deltas over the control window into rad/s.

pub mod quadrature;
pub mod speed;

pub use quadrature::{EncoderChannel, EncoderSnapshot, QuadratureDecoder};
pub use speed::SpeedEstimator;
