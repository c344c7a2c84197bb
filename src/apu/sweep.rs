use crate::SystemControl;

/// Periodically retargets a pulse channel's 11-bit timer by a shifted copy
/// of itself. The channel's timer is passed in by the caller rather than
/// held here.
pub struct Sweep {
    pub muted: bool,

    target_period: u32,

    shift: u8,
    negate_flag: bool,
    enabled_flag: bool,
    reload_flag: bool,

    divider: u8,
    counter: u8,

    // the first pulse channel negates in ones' complement
    ones_complement: bool,
}

impl SystemControl for Sweep {
    fn reset(&mut self) {
        self.muted = false;
        self.target_period = 0;
        self.shift = 0;
        self.negate_flag = false;
        self.enabled_flag = false;
        self.reload_flag = false;
        self.divider = 0;
        self.counter = 0;
    }
}

impl Sweep {
    pub fn new(ones_complement: bool) -> Self {
        Self {
            muted: false,

            target_period: 0,

            shift: 0,
            negate_flag: false,
            enabled_flag: false,
            reload_flag: false,

            divider: 0,
            counter: 0,

            ones_complement,
        }
    }

    /// Recomputes the target period and mute state from the current timer.
    pub fn update(&mut self, timer: u32) {
        let change = timer >> self.shift;

        self.target_period = if self.negate_flag {
            let diff = timer as i32 - change as i32 - self.ones_complement as i32;

            if diff < 0 {
                0
            } else {
                diff as u32
            }
        } else {
            timer.wrapping_add(change)
        };

        self.muted = timer < 8 || self.target_period > 0x7FF;
    }

    /// Half-frame tick; writes the retargeted period back into the timer.
    pub fn clock(&mut self, timer: &mut u32) {
        if self.counter == 0
            && self.enabled_flag
            && self.shift > 0
            && !self.muted
            && *timer >= 8
            && self.target_period <= 0x7FF
        {
            *timer = self.target_period;
        }

        if self.counter == 0 || self.reload_flag {
            self.counter = self.divider;
            self.reload_flag = false;
        } else {
            self.counter -= 1;
        }
    }

    pub fn write_byte(&mut self, byte: u8) {
        self.enabled_flag = (byte & 0b10000000) != 0;
        self.divider = (byte & 0b01110000) >> 4;
        self.negate_flag = (byte & 0b00001000) != 0;
        self.shift = byte & 0b00000111;
        self.reload_flag = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_adds_shifted_period_upward() {
        let mut sweep = Sweep::new(false);
        // enabled, divider 0, shift 1
        sweep.write_byte(0b10000001);

        let mut timer = 0x100;
        sweep.update(timer);
        sweep.clock(&mut timer);
        sweep.clock(&mut timer);

        assert_eq!(timer, 0x180);
    }

    #[test]
    fn negate_differs_between_the_two_pulse_channels() {
        let mut ones = Sweep::new(true);
        let mut twos = Sweep::new(false);
        ones.write_byte(0b10001001);
        twos.write_byte(0b10001001);

        ones.update(0x100);
        twos.update(0x100);

        assert_eq!(ones.target_period, 0x100 - 0x80 - 1);
        assert_eq!(twos.target_period, 0x100 - 0x80);
    }

    #[test]
    fn mutes_when_target_overflows_eleven_bits() {
        let mut sweep = Sweep::new(false);
        sweep.write_byte(0b10000001);

        sweep.update(0x600);

        assert!(sweep.muted);
    }

    #[test]
    fn mutes_below_minimum_timer() {
        let mut sweep = Sweep::new(false);
        sweep.write_byte(0b10000001);

        sweep.update(4);

        assert!(sweep.muted);
    }

    #[test]
    fn muted_sweep_never_retargets() {
        let mut sweep = Sweep::new(false);
        sweep.write_byte(0b10000001);

        let mut timer = 4;
        sweep.update(timer);
        sweep.clock(&mut timer);

        assert_eq!(timer, 4);
    }
}
