use crate::SystemControl;

use super::length_counter::LengthCounter;

// roughly 10 ms of CPU clocks
const CROSS_FADE_CYCLES: u32 = 17_898;

/// The triangle channel: a 32-step staircase at a fixed amplitude, gated by
/// both the length counter and the linear counter.
///
/// A timer write moves the waveform period discontinuously, which aliases
/// badly at audio rates. The previous waveform keeps running after a
/// frequency change and is cross-faded out over an inverse-linear envelope,
/// so the output is fractional rather than a raw staircase step.
pub struct Triangle {
    pub length_counter: LengthCounter,
    pub linear_counter: LinearCounter,

    period: u32,
    cycles: u32,
    duty_step: u8,

    fade_period: u32,
    fade_cycles: u32,
    fade_duty_step: u8,
    fade_remaining: u32,
}

impl SystemControl for Triangle {
    fn reset(&mut self) {
        self.length_counter.reset();
        self.linear_counter.reset();
        self.period = 0;
        self.cycles = 0;
        self.duty_step = 0;
        self.fade_period = 0;
        self.fade_cycles = 0;
        self.fade_duty_step = 0;
        self.fade_remaining = 0;
    }
}

impl Triangle {
    pub fn new() -> Self {
        Self {
            length_counter: LengthCounter::new(),
            linear_counter: LinearCounter::new(),

            period: 0,
            cycles: 0,
            duty_step: 0,

            fade_period: 0,
            fade_cycles: 0,
            fade_duty_step: 0,
            fade_remaining: 0,
        }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Changing the period snapshots the running waveform so it can be
    /// faded out.
    pub fn set_period(&mut self, period: u32) {
        if period != self.period && self.period > 0 {
            self.fade_period = self.period;
            self.fade_cycles = self.cycles;
            self.fade_duty_step = self.duty_step;
            self.fade_remaining = CROSS_FADE_CYCLES;
        }

        self.period = period;
    }

    pub fn clock(&mut self) -> f32 {
        let gated = self.length_counter.counter > 0
            && self.linear_counter.counter > 0
            && self.period > 0;

        if gated {
            if self.cycles == 0 {
                self.cycles = self.period;

                self.duty_step = (self.duty_step + 1) & 0x1F;
            }

            self.cycles -= 1;
        }

        let sample = Self::staircase(self.duty_step);

        if self.fade_remaining == 0 {
            return sample;
        }

        // the old waveform free-runs at its old frequency while fading
        if self.fade_cycles == 0 {
            self.fade_cycles = self.fade_period;

            self.fade_duty_step = (self.fade_duty_step + 1) & 0x1F;
        }
        self.fade_cycles -= 1;

        self.fade_remaining -= 1;
        let t = 1.0 - self.fade_remaining as f32 / CROSS_FADE_CYCLES as f32;
        let weight = (1.0 - t) / (1.0 + t);

        weight * Self::staircase(self.fade_duty_step) + (1.0 - weight) * sample
    }

    fn staircase(duty_step: u8) -> f32 {
        if duty_step <= 15 {
            (15 - duty_step) as f32
        } else {
            (duty_step - 16) as f32
        }
    }
}

/// Gates the triangle at quarter-frame resolution, finer than the length
/// counter allows.
pub struct LinearCounter {
    pub counter: u8,
    pub control_flag: bool,
    pub reload: u8,
    pub reload_flag: bool,
}

impl SystemControl for LinearCounter {
    fn reset(&mut self) {
        self.counter = 0;
        self.control_flag = false;
        self.reload = 0;
        self.reload_flag = false;
    }
}

impl LinearCounter {
    pub fn new() -> Self {
        Self {
            counter: 0,
            control_flag: false,
            reload: 0,
            reload_flag: false,
        }
    }

    pub fn clock(&mut self) {
        if self.reload_flag {
            self.counter = self.reload;
        } else if self.counter > 0 {
            self.counter -= 1;
        }

        if !self.control_flag {
            self.reload_flag = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audible_triangle(period: u32) -> Triangle {
        let mut triangle = Triangle::new();
        triangle.set_period(period);
        triangle.length_counter.set_enabled(true);
        triangle.length_counter.load_counter(0x01);
        triangle.linear_counter.reload = 0x7F;
        triangle.linear_counter.reload_flag = true;
        triangle.linear_counter.clock();
        triangle
    }

    #[test]
    fn staircase_descends_then_ascends() {
        let mut triangle = audible_triangle(1);

        let samples: Vec<f32> = (0..32).map(|_| triangle.clock()).collect();

        // steps 1..=16 walk down, 17..=31 walk back up
        assert_eq!(samples[0], 14.0);
        assert_eq!(samples[14], 0.0);
        assert_eq!(samples[15], 0.0);
        assert_eq!(samples[16], 1.0);
        assert_eq!(samples[30], 15.0);
    }

    #[test]
    fn gating_freezes_the_waveform() {
        let mut triangle = audible_triangle(1);
        triangle.clock();
        triangle.clock();

        triangle.linear_counter.counter = 0;

        let frozen = triangle.clock();
        assert_eq!(triangle.clock(), frozen);
        assert_eq!(triangle.clock(), frozen);
    }

    #[test]
    fn frequency_change_cross_fades_then_settles() {
        let mut triangle = audible_triangle(3);
        for _ in 0..100 {
            triangle.clock();
        }

        // freeze the new waveform so only the fading tail varies
        triangle.linear_counter.counter = 0;
        let frozen = triangle.clock();

        triangle.set_period(7);

        let faded: Vec<f32> = (0..64).map(|_| triangle.clock()).collect();
        assert!(faded.iter().any(|&s| s != frozen));

        for _ in 0..CROSS_FADE_CYCLES {
            triangle.clock();
        }
        assert_eq!(triangle.clock(), frozen);
    }

    #[test]
    fn same_period_write_does_not_fade() {
        let mut triangle = audible_triangle(3);
        for _ in 0..10 {
            triangle.clock();
        }

        triangle.linear_counter.counter = 0;
        let frozen = triangle.clock();

        triangle.set_period(3);

        for _ in 0..16 {
            assert_eq!(triangle.clock(), frozen);
        }
    }

    #[test]
    fn linear_counter_reloads_then_counts_down() {
        let mut linear = LinearCounter::new();
        linear.reload = 3;
        linear.reload_flag = true;

        linear.clock();
        assert_eq!(linear.counter, 3);

        linear.clock();
        linear.clock();
        linear.clock();
        assert_eq!(linear.counter, 0);
    }

    #[test]
    fn control_flag_keeps_reloading() {
        let mut linear = LinearCounter::new();
        linear.reload = 5;
        linear.control_flag = true;
        linear.reload_flag = true;

        linear.clock();
        linear.clock();

        assert_eq!(linear.counter, 5);
    }
}
