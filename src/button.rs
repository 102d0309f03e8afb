// SPDX-License-Identifier: MIT

//! User-button press detection.
//!
//! The board button is sampled from the control loop rather than wired to
//! an interrupt. A short agreement window filters contact bounce; only a
//! debounced press edge is reported, so holding the button does not repeat.

/// Debounced press-edge detector, fed one raw level sample per control
/// tick (`true` = pressed).
pub struct DebouncedButton {
    stable: bool,
    candidate: bool,
    agree: u8,
    window: u8,
}

impl DebouncedButton {
    /// `window` — consecutive agreeing samples required after a level
    /// change before the new level is accepted.
    pub const fn new(window: u8) -> Self {
        Self {
            stable: false,
            candidate: false,
            agree: 0,
            window,
        }
    }

    /// Feed one sample. Returns `true` exactly once per accepted press.
    pub fn update(&mut self, pressed: bool) -> bool {
        if pressed != self.candidate {
            self.candidate = pressed;
            self.agree = 0;
            return false;
        }
        if self.candidate == self.stable {
            return false;
        }
        self.agree += 1;
        if self.agree >= self.window {
            self.stable = self.candidate;
            self.agree = 0;
            return self.stable;
        }
        false
    }

    /// Debounced level.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_press_reports_one_edge() {
        let mut button = DebouncedButton::new(2);
        let edges: u32 = (0..10).map(|_| button.update(true) as u32).sum();
        assert_eq!(edges, 1);
        assert!(button.is_pressed());
    }

    #[test]
    fn bounce_is_filtered() {
        let mut button = DebouncedButton::new(3);
        for i in 0..20 {
            assert!(!button.update(i % 2 == 0));
        }
        assert!(!button.is_pressed());
    }

    #[test]
    fn release_reports_no_edge() {
        let mut button = DebouncedButton::new(2);
        for _ in 0..5 {
            button.update(true);
        }
        assert!(button.is_pressed());

        let edges: u32 = (0..5).map(|_| button.update(false) as u32).sum();
        assert_eq!(edges, 0);
        assert!(!button.is_pressed());
    }

    #[test]
    fn press_release_press_reports_twice() {
        let mut button = DebouncedButton::new(2);
        let mut edges = 0u32;
        for &level in &[true; 4] {
            edges += button.update(level) as u32;
        }
        for &level in &[false; 4] {
            edges += button.update(level) as u32;
        }
        for &level in &[true; 4] {
            edges += button.update(level) as u32;
        }
        assert_eq!(edges, 2);
    }
}
