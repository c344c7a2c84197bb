mod ch_noise;
mod ch_pulse;
mod ch_triangle;
mod envelope;
mod frame_sequencer;
mod length_counter;
mod lookup;
mod sweep;

use self::ch_noise::Noise;
use self::ch_pulse::Pulse;
use self::ch_triangle::Triangle;
use self::frame_sequencer::{FrameSequencer, SequencerEvent};
use self::lookup::{mix_tnd, PULSE_TABLE};

use crate::{SystemControl, CPU_CLOCK_HZ};

const DUTY_SEQUENCES: [u8; 4] = [0b01000000, 0b01100000, 0b01111000, 0b10011111];

const NANOS_PER_SECOND: f32 = 1e9;

/// The audio unit. Clocked once per CPU cycle; produces mixed samples at
/// the output rate given at construction.
pub struct Apu2A03 {
    time_per_cpu_clock: f32,
    time_per_sample: f32,
    time_since_last_sample: f32,

    frame_sequencer: FrameSequencer,
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,

    pulse1_sample: u8,
    pulse2_sample: u8,
    triangle_sample: f32,
    noise_sample: u8,

    total_cycles: u32,
    interrupt_flag: bool,
}

impl SystemControl for Apu2A03 {
    fn reset(&mut self) {
        self.frame_sequencer.reset();
        self.pulse1.reset();
        self.pulse2.reset();
        self.triangle.reset();
        self.noise.reset();

        self.pulse1_sample = 0;
        self.pulse2_sample = 0;
        self.triangle_sample = 0.0;
        self.noise_sample = 0;

        self.time_since_last_sample = 0.0;
        self.total_cycles = 0;
        self.interrupt_flag = false;
    }
}

impl Apu2A03 {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            time_per_cpu_clock: NANOS_PER_SECOND / CPU_CLOCK_HZ as f32,
            time_per_sample: NANOS_PER_SECOND / sample_rate as f32,
            time_since_last_sample: 0.0,

            frame_sequencer: FrameSequencer::new(),
            pulse1: Pulse::new(true),
            pulse2: Pulse::new(false),
            triangle: Triangle::new(),
            noise: Noise::new(),

            pulse1_sample: 0,
            pulse2_sample: 0,
            triangle_sample: 0.0,
            noise_sample: 0,

            total_cycles: 0,
            interrupt_flag: false,
        }
    }

    /// Consumes the pending frame interrupt, if any.
    pub fn irq_active(&mut self) -> bool {
        let ret = self.interrupt_flag;
        self.interrupt_flag = false;
        ret
    }

    pub fn cpu_clock(&mut self) {
        match self.frame_sequencer.clock(&mut self.interrupt_flag) {
            Some(SequencerEvent::Quarter) => self.quarter_frame(),
            Some(SequencerEvent::Half) => self.half_frame(),
            None => {}
        }

        self.total_cycles += 1;

        // the triangle timer runs at CPU rate, the rest at half of it
        self.triangle_sample = self.triangle.clock();

        if self.total_cycles % 2 == 0 {
            self.pulse1_sample = self.pulse1.clock();
            self.pulse2_sample = self.pulse2.clock();
            self.noise_sample = self.noise.clock();
        }
    }

    /// Call once per CPU cycle; yields a mixed sample whenever enough
    /// emulated time has passed for the configured output rate.
    pub fn cpu_try_clock_sample(&mut self) -> Option<f32> {
        self.time_since_last_sample += self.time_per_cpu_clock;

        if self.time_since_last_sample < self.time_per_sample {
            return None;
        }

        self.time_since_last_sample -= self.time_per_sample;

        let pulse_out = PULSE_TABLE[(self.pulse1_sample + self.pulse2_sample) as usize];
        let tnd_out = mix_tnd(self.triangle_sample, self.noise_sample);

        Some(pulse_out + tnd_out)
    }

    pub fn read_status(&mut self) -> u8 {
        let mut byte = 0;

        if self.pulse1.length_counter.counter > 0 {
            byte |= 1 << 0;
        }
        if self.pulse2.length_counter.counter > 0 {
            byte |= 1 << 1;
        }
        if self.triangle.length_counter.counter > 0 {
            byte |= 1 << 2;
        }
        if self.noise.length_counter.counter > 0 {
            byte |= 1 << 3;
        }

        if self.interrupt_flag {
            byte |= 1 << 6;
        }

        self.interrupt_flag = false;

        byte
    }

    pub fn write_register(&mut self, addr: usize, byte: u8) {
        match addr {
            0x4000 => {
                self.pulse1.duty_sequence = DUTY_SEQUENCES[((byte & 0b11000000) >> 6) as usize];

                self.pulse1.envelope.loop_flag = (byte & 0b00100000) != 0;
                self.pulse1.length_counter.halted = (byte & 0b00100000) != 0;

                self.pulse1.envelope.constant_flag = (byte & 0b00010000) != 0;
                self.pulse1.envelope.set_volume(byte & 0b00001111);
            }
            0x4001 => self.pulse1.sweep.write_byte(byte),
            0x4002 => {
                self.pulse1.timer_period &= 0b111_0000_0000;
                self.pulse1.timer_period |= byte as u32;
            }
            0x4003 => {
                self.pulse1.timer_period &= 0b000_1111_1111;
                self.pulse1.timer_period |= ((byte as u32) & 0b00000111) << 8;

                self.pulse1.length_counter.load_counter((byte & 0b11111000) >> 3);
                self.pulse1.envelope.start_flag = true;

                self.pulse1.cycles = self.pulse1.timer_period;
                self.pulse1.duty_step = 0;
            }
            0x4004 => {
                self.pulse2.duty_sequence = DUTY_SEQUENCES[((byte & 0b11000000) >> 6) as usize];

                self.pulse2.envelope.loop_flag = (byte & 0b00100000) != 0;
                self.pulse2.length_counter.halted = (byte & 0b00100000) != 0;

                self.pulse2.envelope.constant_flag = (byte & 0b00010000) != 0;
                self.pulse2.envelope.set_volume(byte & 0b00001111);
            }
            0x4005 => self.pulse2.sweep.write_byte(byte),
            0x4006 => {
                self.pulse2.timer_period &= 0b111_0000_0000;
                self.pulse2.timer_period |= byte as u32;
            }
            0x4007 => {
                self.pulse2.timer_period &= 0b000_1111_1111;
                self.pulse2.timer_period |= ((byte as u32) & 0b00000111) << 8;

                self.pulse2.length_counter.load_counter((byte & 0b11111000) >> 3);
                self.pulse2.envelope.start_flag = true;

                self.pulse2.cycles = self.pulse2.timer_period;
                self.pulse2.duty_step = 0;
            }
            0x4008 => {
                self.triangle.length_counter.halted = (byte & 0b10000000) != 0;
                self.triangle.linear_counter.control_flag = (byte & 0b10000000) != 0;

                self.triangle.linear_counter.reload = byte & 0b01111111;
            }
            0x400A => {
                let period = (self.triangle.period() & 0b111_0000_0000) | byte as u32;
                self.triangle.set_period(period);
            }
            0x400B => {
                let period =
                    (self.triangle.period() & 0b000_1111_1111) | (((byte as u32) & 0b111) << 8);
                self.triangle.set_period(period);

                self.triangle.length_counter.load_counter((byte & 0b11111000) >> 3);
                self.triangle.linear_counter.reload_flag = true;
            }
            0x400C => {
                self.noise.envelope.loop_flag = (byte & 0b00100000) != 0;
                self.noise.length_counter.halted = (byte & 0b00100000) != 0;

                self.noise.envelope.constant_flag = (byte & 0b00010000) != 0;
                self.noise.envelope.set_volume(byte & 0b00001111);
            }
            0x400E => {
                self.noise.shift_mode = (byte & 0b10000000) != 0;
                self.noise.set_period((byte & 0b00001111) as usize);
            }
            0x400F => {
                self.noise.length_counter.load_counter((byte & 0b11111000) >> 3);
                self.noise.envelope.start_flag = true;
            }
            // 0x4010-0x4013 select sample playback, which this console
            // variant does not wire up
            0x4015 => {
                self.pulse1.length_counter.set_enabled((byte & 0b0001) != 0);
                self.pulse2.length_counter.set_enabled((byte & 0b0010) != 0);
                self.triangle.length_counter.set_enabled((byte & 0b0100) != 0);
                self.noise.length_counter.set_enabled((byte & 0b1000) != 0);
            }
            0x4017 => {
                self.frame_sequencer.mode_5_step = (byte & 0b10000000) != 0;
                self.frame_sequencer.irq_inhibit = (byte & 0b01000000) != 0;
                self.frame_sequencer.restart();

                if self.frame_sequencer.irq_inhibit {
                    self.interrupt_flag = false;
                }

                // entering 5-step mode clocks the units immediately
                if self.frame_sequencer.mode_5_step {
                    self.half_frame();
                }
            }
            _ => {}
        }
    }

    fn quarter_frame(&mut self) {
        self.pulse1.envelope.clock();
        self.pulse2.envelope.clock();
        self.noise.envelope.clock();
        self.triangle.linear_counter.clock();
    }

    fn half_frame(&mut self) {
        self.quarter_frame();

        self.pulse1.length_counter.clock();
        self.pulse2.length_counter.clock();
        self.triangle.length_counter.clock();
        self.noise.length_counter.clock();

        self.pulse1.sweep.clock(&mut self.pulse1.timer_period);
        self.pulse2.sweep.clock(&mut self.pulse2.timer_period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reflects_length_counters() {
        let mut apu = Apu2A03::new(44_100);

        apu.write_register(0x4015, 0b0000_0101);
        apu.write_register(0x4003, 0x08);
        apu.write_register(0x400B, 0x08);

        assert_eq!(apu.read_status() & 0x0F, 0b0101);
    }

    #[test]
    fn disabling_a_channel_zeroes_its_counter() {
        let mut apu = Apu2A03::new(44_100);

        apu.write_register(0x4015, 0b0000_0001);
        apu.write_register(0x4003, 0x08);
        assert_eq!(apu.read_status() & 0x01, 0x01);

        apu.write_register(0x4015, 0x00);
        assert_eq!(apu.read_status() & 0x01, 0x00);
    }

    #[test]
    fn length_load_is_idempotent() {
        let mut apu = Apu2A03::new(44_100);

        apu.write_register(0x4015, 0b0000_0001);
        apu.write_register(0x4003, 0x08);
        let first = apu.pulse1.length_counter.counter;
        apu.write_register(0x4003, 0x08);

        assert_eq!(first, apu.pulse1.length_counter.counter);

        apu.write_register(0x4015, 0x00);
        apu.write_register(0x4003, 0x08);
        assert_eq!(apu.pulse1.length_counter.counter, 0);
    }

    #[test]
    fn four_step_mode_raises_frame_irq() {
        let mut apu = Apu2A03::new(44_100);

        for _ in 0..29_829 {
            apu.cpu_clock();
        }

        assert!(apu.irq_active());
        assert!(!apu.irq_active());
    }

    #[test]
    fn irq_inhibit_clears_pending_interrupt() {
        let mut apu = Apu2A03::new(44_100);

        for _ in 0..29_829 {
            apu.cpu_clock();
        }

        apu.write_register(0x4017, 0b0100_0000);

        assert!(!apu.irq_active());
    }

    #[test]
    fn five_step_write_clocks_units_immediately() {
        let mut apu = Apu2A03::new(44_100);

        apu.write_register(0x4015, 0b0000_0001);
        apu.write_register(0x4003, 0x08);
        let loaded = apu.pulse1.length_counter.counter;

        apu.write_register(0x4017, 0b1000_0000);

        assert_eq!(apu.pulse1.length_counter.counter, loaded - 1);
    }

    #[test]
    fn sample_cadence_matches_output_rate() {
        let mut apu = Apu2A03::new(44_100);
        let mut count = 0;

        // 10 ms of CPU clocks at 44.1kHz comes to 441 samples
        for _ in 0..17_898 {
            apu.cpu_clock();
            if apu.cpu_try_clock_sample().is_some() {
                count += 1;
            }
        }

        assert!((440..=442).contains(&count), "got {} samples", count);
    }

    #[test]
    fn silence_mixes_to_zero() {
        let mut apu = Apu2A03::new(CPU_CLOCK_HZ);

        apu.cpu_clock();
        assert_eq!(apu.cpu_try_clock_sample(), Some(0.0));
    }

    #[test]
    fn audible_pulse_mixes_above_zero() {
        let mut apu = Apu2A03::new(CPU_CLOCK_HZ);

        apu.write_register(0x4015, 0b0000_0001);
        // max constant volume, half duty
        apu.write_register(0x4000, 0b1011_1111);
        apu.write_register(0x4002, 0x40);
        apu.write_register(0x4003, 0x08);

        let mut peak = 0.0f32;
        for _ in 0..0x1000 {
            apu.cpu_clock();
            if let Some(sample) = apu.cpu_try_clock_sample() {
                peak = peak.max(sample);
            }
        }

        assert!(peak > 0.0);
    }
}
