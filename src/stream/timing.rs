use std::time::Duration;

pub const DEFAULT_DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftMode {
    #[default]
    Off,
    /// Applies to the next character only.
    Once,
    Caps,
}

/// Shift state for one keyboard surface, including the double-tap timer for caps lock.
#[derive(Debug, Clone)]
pub struct ShiftTiming {
    mode: ShiftMode,
    last_tap: Option<Duration>,
    double_tap_window: Duration,
}

impl ShiftTiming {
    pub fn new(double_tap_window: Duration) -> Self {
        Self {
            mode: ShiftMode::Off,
            last_tap: None,
            double_tap_window,
        }
    }

    pub fn mode(&self) -> ShiftMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != ShiftMode::Off
    }

    /// Registers a shift tap at time `t`.
    pub fn tap(&mut self, t: Duration) -> ShiftMode {
        let double_tap = self
            .last_tap
            .and_then(|last| t.checked_sub(last))
            .is_some_and(|interval| interval < self.double_tap_window);

        self.mode = match (double_tap, self.mode) {
            (true, ShiftMode::Caps) => ShiftMode::Off,
            (true, _) => ShiftMode::Caps,
            (false, ShiftMode::Off) => ShiftMode::Once,
            (false, _) => ShiftMode::Off,
        };
        self.last_tap = Some(t);
        self.mode
    }

    /// Called after a character was typed; drops a one-shot shift.
    pub fn consume(&mut self) {
        if self.mode == ShiftMode::Once {
            self.mode = ShiftMode::Off;
        }
    }

    pub fn reset(&mut self) {
        self.mode = ShiftMode::Off;
    }
}

impl Default for ShiftTiming {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_TAP_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_single_taps_toggle_once() {
        let mut shift = ShiftTiming::default();
        assert_eq!(shift.tap(ms(0)), ShiftMode::Once);
        assert_eq!(shift.tap(ms(1000)), ShiftMode::Off);
        assert_eq!(shift.tap(ms(2000)), ShiftMode::Once);
    }

    #[test]
    fn test_double_tap_toggles_caps() {
        let mut shift = ShiftTiming::default();
        shift.tap(ms(0));
        assert_eq!(shift.tap(ms(200)), ShiftMode::Caps);
        // Another quick double tap leaves caps
        shift.tap(ms(1000));
        assert_eq!(shift.mode(), ShiftMode::Off);
        shift.tap(ms(1100));
        assert_eq!(shift.mode(), ShiftMode::Caps);
        assert_eq!(shift.tap(ms(1200)), ShiftMode::Off);
    }

    #[test]
    fn test_consume_only_clears_once() {
        let mut shift = ShiftTiming::default();
        shift.tap(ms(0));
        shift.consume();
        assert_eq!(shift.mode(), ShiftMode::Off);

        shift.tap(ms(1000));
        shift.tap(ms(1100));
        shift.consume();
        assert_eq!(shift.mode(), ShiftMode::Caps);
        assert!(shift.is_active());
    }

    #[test]
    fn test_window_is_exclusive() {
        let mut shift = ShiftTiming::new(ms(100));
        shift.tap(ms(0));
        assert_eq!(shift.tap(ms(100)), ShiftMode::Off);
    }
}
