// SPDX-License-Identifier: MIT

//! Frame parser for the rover command protocol.
//!
//! Byte-at-a-time state machine driven from the control loop as it drains
//! the UART receive queue. Malformed frames — bad length, unknown message
//! ID, checksum mismatch — are dropped and counted, never propagated; the
//! parser simply hunts for the next sync byte.

use crate::kinematics::BodyVelocity;
use crate::protocol::messages::*;

enum State {
    AwaitSync,
    ReadHeader,
    ReadPayload { len: u8, got: u8 },
    ReadChecksum { len: u8 },
}

pub struct Parser {
    state: State,
    buf: [u8; MAX_BODY_LEN],
    checksum: u8,
    dropped: u32,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::AwaitSync,
            buf: [0; MAX_BODY_LEN],
            checksum: 0,
            dropped: 0,
        }
    }

    /// Frames discarded since boot (checksum, length, or unknown ID).
    #[inline]
    pub fn dropped_frames(&self) -> u32 {
        self.dropped
    }

    /// Process a single incoming byte. Returns `Some(Command)` when a
    /// complete, valid command frame has been received.
    pub fn push(&mut self, byte: u8) -> Option<Command> {
        match self.state {
            State::AwaitSync => {
                if byte == SYNC_BYTE {
                    self.state = State::ReadHeader;
                    self.checksum = 0;
                }
            }
            State::ReadHeader => {
                if byte == 0 || byte as usize > MAX_BODY_LEN {
                    self.drop_frame();
                    return None;
                }
                self.checksum = byte;
                self.state = State::ReadPayload { len: byte, got: 0 };
            }
            State::ReadPayload { len, got } => {
                self.buf[got as usize] = byte;
                self.checksum ^= byte;
                let got = got + 1;
                self.state = if got == len {
                    State::ReadChecksum { len }
                } else {
                    State::ReadPayload { len, got }
                };
            }
            State::ReadChecksum { len } => {
                let valid = byte == self.checksum;
                self.state = State::AwaitSync;

                if valid {
                    match self.decode(len as usize) {
                        Some(cmd) => return Some(cmd),
                        None => self.dropped = self.dropped.wrapping_add(1),
                    }
                } else {
                    self.dropped = self.dropped.wrapping_add(1);
                }
            }
        }
        None
    }

    fn drop_frame(&mut self) {
        self.dropped = self.dropped.wrapping_add(1);
        self.state = State::AwaitSync;
    }

    /// Interpret a checksum-valid frame body (CMD_TYPE + payload).
    fn decode(&self, len: usize) -> Option<Command> {
        let body = &self.buf[..len];
        match body[0] {
            MSG_SET_VELOCITY if len == 13 => {
                let f = |at: usize| {
                    let mut word = [0u8; 4];
                    word.copy_from_slice(&body[at..at + 4]);
                    f32::from_le_bytes(word)
                };
                Some(Command::SetVelocity(BodyVelocity::new(f(1), f(5), f(9))))
            }
            MSG_ESTOP if len == 1 => Some(Command::EStop),
            MSG_ENABLE if len == 1 => Some(Command::Enable),
            _ => None,
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
