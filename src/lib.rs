// SPDX-License-Identifier: MIT

//! # Mecanum Rover Firmware
//!
//! Control core for a four-wheel mecanum rover on an STM32F4: quadrature
//! encoder decoding, per-wheel velocity PID, mecanum kinematics/odometry,
//! and the UART command/telemetry protocol.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`button`] | Debounced user-button press detection |
//! | [`encoder`] | Software quadrature decode + wheel speed estimation |
//! | [`kinematics`] | Body-frame ⇄ wheel-frame velocity conversion |
//! | [`control`] | PID, per-wheel velocity control, drive orchestration |
//! | [`motors`] | H-bridge actuator over `embedded-hal` pins/PWM |
//! | [`protocol`] | Command/telemetry framing and parsing |
//! | [`hw`] | MCU-level wrappers (pins, USART); target builds only |
//!
//! The library is hardware-agnostic: everything above [`hw`] builds and
//! tests on the host, and the firmware binary wires it to the STM32F4 HAL.
//!
//! ## Getting Started
//!
//! Build docs:
//!
//! ```bash
//! cargo doc --no-deps --open
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release
//! ```

#![cfg_attr(not(test), no_std)]

pub mod button;
pub mod config;
pub mod control;
pub mod encoder;
pub mod kinematics;
pub mod motors;
pub mod protocol;
pub mod wheel;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod hw;
