use crate::SystemControl;

use super::{envelope::Envelope, length_counter::LengthCounter, sweep::Sweep, DUTY_SEQUENCES};

/// A square wave channel: an 11-bit timer steps through an 8-bit duty
/// sequence, scaled by the envelope and gated by the length counter and
/// sweep mute.
pub struct Pulse {
    pub duty_sequence: u8,
    pub duty_step: u8,

    pub timer_period: u32,
    pub cycles: u32,

    pub length_counter: LengthCounter,
    pub envelope: Envelope,
    pub sweep: Sweep,
}

impl SystemControl for Pulse {
    fn reset(&mut self) {
        self.duty_sequence = DUTY_SEQUENCES[0];
        self.duty_step = 0;
        self.timer_period = 0;
        self.cycles = 0;
        self.length_counter.reset();
        self.envelope.reset();
        self.sweep.reset();
    }
}

impl Pulse {
    pub fn new(ones_complement: bool) -> Self {
        Self {
            duty_sequence: DUTY_SEQUENCES[0],
            duty_step: 0,

            timer_period: 0,
            cycles: 0,

            length_counter: LengthCounter::new(),
            envelope: Envelope::new(),
            sweep: Sweep::new(ones_complement),
        }
    }

    pub fn clock(&mut self) -> u8 {
        self.sweep.update(self.timer_period);

        if self.timer_period >= 8 {
            if self.cycles == 0 {
                self.cycles = self.timer_period;

                self.duty_step = (self.duty_step + 1) & 0x07;
            }

            self.cycles -= 1;
        }

        let mut sample = ((self.duty_sequence & (1 << self.duty_step)) != 0) as u8;

        sample *= if self.sweep.muted {
            0
        } else {
            self.envelope.output_volume()
        };

        if self.length_counter.silenced() {
            sample = 0;
        }

        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audible_pulse() -> Pulse {
        let mut pulse = Pulse::new(true);
        pulse.timer_period = 0x100;
        pulse.envelope.constant_flag = true;
        pulse.envelope.set_volume(10);
        pulse.length_counter.set_enabled(true);
        pulse.length_counter.load_counter(0x01);
        pulse
    }

    #[test]
    fn duty_sequence_produces_highs_and_lows() {
        let mut pulse = audible_pulse();
        pulse.duty_sequence = DUTY_SEQUENCES[1];

        let mut seen = Vec::new();
        for _ in 0..0x100 * 9 {
            seen.push(pulse.clock());
        }

        assert!(seen.contains(&10));
        assert!(seen.contains(&0));
    }

    #[test]
    fn silenced_length_counter_mutes_output() {
        let mut pulse = audible_pulse();
        pulse.duty_sequence = 0xFF;
        pulse.length_counter.set_enabled(false);

        assert_eq!(pulse.clock(), 0);
    }

    #[test]
    fn below_minimum_timer_is_mute() {
        let mut pulse = audible_pulse();
        pulse.duty_sequence = 0xFF;
        pulse.timer_period = 7;

        assert_eq!(pulse.clock(), 0);
    }
}
