// SPDX-License-Identifier: MIT

//! # Motor Actuators
//!
//! H-bridge wheel motor drive built on `embedded-hal` pin and PWM traits.

pub mod hbridge;

pub use hbridge::{ActuatorError, DutyCommand, HBridge};
