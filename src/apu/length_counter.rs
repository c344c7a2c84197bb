use crate::SystemControl;

// note durations indexed by the 5-bit load field of each channel's
// length register
const LENGTH_LOOKUP: [u8; 0x20] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

/// Counts a channel's remaining note duration in half-frames; the channel
/// is silenced once it reaches zero.
pub struct LengthCounter {
    pub halted: bool,
    pub counter: u8,

    enabled: bool,
}

impl SystemControl for LengthCounter {
    fn reset(&mut self) {
        self.halted = false;
        self.counter = 0;
        self.enabled = false;
    }
}

impl LengthCounter {
    pub fn new() -> Self {
        Self {
            halted: false,
            counter: 0,
            enabled: false,
        }
    }

    pub fn clock(&mut self) {
        if !self.enabled {
            self.counter = 0;
        }

        if !self.halted && self.counter > 0 {
            self.counter -= 1;
        }
    }

    /// Loads from the duration table; a disabled channel stays at zero.
    pub fn load_counter(&mut self, index: u8) {
        if self.enabled {
            self.counter = LENGTH_LOOKUP[index as usize];
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.counter = 0;
        }
    }

    pub fn silenced(&self) -> bool {
        self.counter == 0 || !self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_is_idempotent_while_enabled() {
        let mut lc = LengthCounter::new();
        lc.set_enabled(true);

        lc.load_counter(0x02);
        let first = lc.counter;
        lc.load_counter(0x02);

        assert_eq!(first, 20);
        assert_eq!(lc.counter, 20);
    }

    #[test]
    fn loading_while_disabled_stays_zero() {
        let mut lc = LengthCounter::new();

        lc.load_counter(0x02);
        assert_eq!(lc.counter, 0);
        assert!(lc.silenced());
    }

    #[test]
    fn disabling_clears_the_counter() {
        let mut lc = LengthCounter::new();
        lc.set_enabled(true);
        lc.load_counter(0x01);
        assert_eq!(lc.counter, 254);

        lc.set_enabled(false);
        assert_eq!(lc.counter, 0);
    }

    #[test]
    fn halt_freezes_the_count() {
        let mut lc = LengthCounter::new();
        lc.set_enabled(true);
        lc.load_counter(0x03);
        assert_eq!(lc.counter, 2);

        lc.halted = true;
        lc.clock();
        assert_eq!(lc.counter, 2);

        lc.halted = false;
        lc.clock();
        lc.clock();
        assert_eq!(lc.counter, 0);
        assert!(lc.silenced());
    }
}
