// SPDX-License-Identifier: MIT

//! # Control Algorithms
//!
//! This module provides the closed-loop control stack for the rover.
//!
//! ## Modules
//!
//! - [`pid`] - General-purpose PID controller implementation.
//! - [`wheel`] - Per-wheel velocity controller (Disabled/Active).
//! - [`drive`] - Four-wheel orchestration, watchdog, and emergency stop.

pub mod drive;
pub mod pid;
pub mod wheel;

pub use drive::{DriveController, DriveFaults};
pub use pid::Pid;
pub use wheel::{WheelController, WheelMode};
