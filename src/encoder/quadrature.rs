// SPDX-License-Identifier: MIT

//! Software quadrature decoding.
//!
//! The board routes encoder A/B lines to plain GPIOs (the EXTI lines for
//! PA6/PB6 and PA7/PB7 collide, so hardware edge interrupts cannot cover all
//! eight inputs). A fast periodic sampling interrupt reads the lines and
//! feeds them through the standard 4-state quadrature state machine; a
//! no-change sample contributes nothing, a one-bit change steps the counter
//! by ±1, and a two-bit jump is a miscount (bounce or a missed sample) that
//! is counted for diagnostics and otherwise ignored.
//!
//! The tick accumulator lives in an [`EncoderChannel`] so the sampling
//! context can publish and the control loop can read without tearing: each
//! field is a single atomic word with exactly one writer.

use core::sync::atomic::{AtomicI32, AtomicU32, Ordering};

/// Snapshot of one encoder channel, coherent per field.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EncoderSnapshot {
    /// Signed tick accumulator. Wraps on overflow by design and is never
    /// reset during normal operation; consumers must difference with
    /// `wrapping_sub`.
    pub ticks: i32,
    /// Invalid-transition count since boot.
    pub miscounts: u32,
    /// Timestamp of the most recent counted tick, in milliseconds.
    pub last_tick_ms: u32,
}

/// Shared half of one wheel's encoder state.
///
/// Written only from the sampling interrupt (via [`QuadratureDecoder`]),
/// read from the control loop via [`EncoderChannel::snapshot`]. All fields
/// are word-sized atomics, so reads never tear; relaxed ordering is enough
/// under the single-writer contract.
pub struct EncoderChannel {
    ticks: AtomicI32,
    miscounts: AtomicU32,
    last_tick_ms: AtomicU32,
}

impl EncoderChannel {
    /// A fresh channel, suitable for `static` initialization.
    pub const fn new() -> Self {
        Self {
            ticks: AtomicI32::new(0),
            miscounts: AtomicU32::new(0),
            last_tick_ms: AtomicU32::new(0),
        }
    }

    /// Read the channel from the control context.
    pub fn snapshot(&self) -> EncoderSnapshot {
        EncoderSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            miscounts: self.miscounts.load(Ordering::Relaxed),
            last_tick_ms: self.last_tick_ms.load(Ordering::Relaxed),
        }
    }

    #[inline]
    fn step(&self, delta: i32, now_ms: u32) {
        // Single writer: a load/store pair cannot race with itself.
        let t = self.ticks.load(Ordering::Relaxed);
        self.ticks.store(t.wrapping_add(delta), Ordering::Relaxed);
        self.last_tick_ms.store(now_ms, Ordering::Relaxed);
    }

    #[inline]
    fn miscount(&self) {
        let m = self.miscounts.load(Ordering::Relaxed);
        self.miscounts.store(m.wrapping_add(1), Ordering::Relaxed);
    }
}

impl Default for EncoderChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Pack the A/B line levels into a 2-bit phase.
#[inline]
const fn phase_of(a: bool, b: bool) -> u8 {
    ((a as u8) << 1) | (b as u8)
}

/// Signed step for `(prev_phase << 2) | new_phase`. Invalid transitions
/// (both bits changed) are zero here and detected separately.
#[rustfmt::skip]
const STEP: [i8; 16] = [
     0,  1, -1,  0,
    -1,  0,  0,  1,
     1,  0,  0, -1,
     0, -1,  1,  0,
];

/// Decoder state for one wheel, owned by the sampling context.
pub struct QuadratureDecoder<'a> {
    phase: u8,
    channel: &'a EncoderChannel,
}

impl<'a> QuadratureDecoder<'a> {
    /// Create a decoder seeded with the current A/B line levels.
    pub fn new(a: bool, b: bool, channel: &'a EncoderChannel) -> Self {
        Self {
            phase: phase_of(a, b),
            channel,
        }
    }

    /// Feed one sample (or edge event) of the A/B lines.
    ///
    /// Fast and non-blocking: a table lookup and at most two atomic stores.
    /// Safe to call concurrently with [`EncoderChannel::snapshot`].
    pub fn update(&mut self, a: bool, b: bool, now_ms: u32) {
        let next = phase_of(a, b);
        if next == self.phase {
            return;
        }
        if next ^ self.phase == 0b11 {
            // Both lines flipped in one step: bounce or a missed sample.
            // Count it, keep the accumulator untouched, resynchronize.
            self.channel.miscount();
        } else {
            let delta = STEP[((self.phase << 2) | next) as usize] as i32;
            self.channel.step(delta, now_ms);
        }
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gray-code phase sequence for forward rotation.
    const FORWARD: [(bool, bool); 4] = [(false, false), (false, true), (true, true), (true, false)];

    #[test]
    fn forward_rotations_accumulate_ticks_per_rev() {
        let channel = EncoderChannel::new();
        // Seed at the last phase of the cycle so the first sample counts.
        let mut dec = QuadratureDecoder::new(true, false, &channel);

        let rotations = 5;
        let ticks_per_rev = 12; // 3 electrical cycles/rev, 4x decode
        for _ in 0..rotations {
            for cycle in 0..3 {
                for &(a, b) in &FORWARD {
                    dec.update(a, b, cycle);
                }
            }
        }

        let snap = channel.snapshot();
        assert_eq!(snap.ticks, rotations * ticks_per_rev);
        assert_eq!(snap.miscounts, 0);
    }

    #[test]
    fn reverse_sequence_negates_count() {
        let fwd = EncoderChannel::new();
        let rev = EncoderChannel::new();
        let mut dec_f = QuadratureDecoder::new(true, false, &fwd);
        let mut dec_r = QuadratureDecoder::new(false, false, &rev);

        for _ in 0..7 {
            for &(a, b) in &FORWARD {
                dec_f.update(a, b, 0);
            }
            for &(a, b) in FORWARD.iter().rev() {
                dec_r.update(a, b, 0);
            }
        }

        assert_eq!(fwd.snapshot().ticks, -rev.snapshot().ticks);
    }

    #[test]
    fn invalid_transition_counts_miscount_without_ticks() {
        let channel = EncoderChannel::new();
        let mut dec = QuadratureDecoder::new(false, false, &channel);

        // 00 -> 11 flips both bits.
        dec.update(true, true, 3);
        let snap = channel.snapshot();
        assert_eq!(snap.ticks, 0);
        assert_eq!(snap.miscounts, 1);

        // Decoder resynchronized at 11; a normal step counts again.
        dec.update(true, false, 4);
        let snap = channel.snapshot();
        assert_eq!(snap.ticks, 1);
        assert_eq!(snap.miscounts, 1);
        assert_eq!(snap.last_tick_ms, 4);
    }

    #[test]
    fn repeated_sample_is_a_no_op() {
        let channel = EncoderChannel::new();
        let mut dec = QuadratureDecoder::new(false, true, &channel);
        for _ in 0..100 {
            dec.update(false, true, 9);
        }
        assert_eq!(channel.snapshot(), EncoderSnapshot::default());
    }
}
