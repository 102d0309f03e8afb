// SPDX-License-Identifier: MIT

//! MCU-level wrappers. Only compiled for the STM32 target.

pub mod pins;
pub mod usart;

pub use pins::{BoardPins, WheelPins};
pub use usart::Usart;
