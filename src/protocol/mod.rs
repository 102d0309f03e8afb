// SPDX-License-Identifier: MIT

pub mod messages;
pub mod parser;

pub use messages::{Command, Telemetry};
pub use parser::Parser;
