use std::time::Duration;

use crate::apu::Apu2A03;
use crate::bus::SystemBus;
use crate::cartridge::CartridgeNes;
use crate::cpu::Cpu6502;
use crate::error::CpuError;
use crate::ppu::Ppu2C03;
use crate::{AudioSink, InputSource, PixelSink, SystemControl, CPU_CLOCK_HZ};

// summed-RGB level above which the light gun's photodiode reads light
const LIGHT_SENSE_THRESHOLD: u16 = 0x180;

/// The assembled console. Drives the fixed 3-dots-per-CPU-cycle cadence
/// and ferries interrupts, input and output between the units.
pub struct Nes {
    pub cpu: Cpu6502,
    pub ppu: Ppu2C03,
    pub bus: SystemBus,

    samples: Vec<f32>,
}

impl Nes {
    pub fn new(cartridge: CartridgeNes, sample_rate: u32) -> Self {
        let apu = Apu2A03::new(sample_rate);

        let mut nes = Self {
            cpu: Cpu6502::new(),
            ppu: Ppu2C03::new(),
            bus: SystemBus::new(cartridge, apu),

            samples: Vec::new(),
        };
        nes.reset();

        nes
    }

    pub fn reset(&mut self) {
        self.bus.reset();
        self.ppu.reset();
        self.cpu.reset(&mut self.bus);
        self.samples.clear();
    }

    /// One emulated CPU cycle: the CPU ticks once, the PPU three dots, the
    /// APU once. This ratio is a hardware constant.
    pub fn clock_cycle(&mut self, pixels: &mut dyn PixelSink) -> Result<(), CpuError> {
        self.cpu.clock(&mut self.bus)?;

        for _ in 0..3 {
            self.ppu.clock(&mut self.bus, pixels);
        }

        self.bus.apu.cpu_clock();
        if let Some(sample) = self.bus.apu.cpu_try_clock_sample() {
            self.samples.push(sample);
        }

        if self.ppu.take_nmi_request() {
            self.cpu.nmi(&mut self.bus);
        }

        if self.bus.irq_active() {
            self.cpu.irq(&mut self.bus);
        }

        Ok(())
    }

    pub fn run_cycles(
        &mut self,
        cycles: u64,
        pixels: &mut dyn PixelSink,
    ) -> Result<(), CpuError> {
        for _ in 0..cycles {
            self.clock_cycle(pixels)?;
        }

        Ok(())
    }

    /// Converts elapsed wall-clock time into whole emulated cycles.
    pub fn run_duration(
        &mut self,
        elapsed: Duration,
        pixels: &mut dyn PixelSink,
    ) -> Result<(), CpuError> {
        let cycles = (elapsed.as_secs_f64() * CPU_CLOCK_HZ as f64) as u64;

        self.run_cycles(cycles, pixels)
    }

    /// Latches host input; light gun sensing is resolved against the last
    /// composed frame rather than taken from the host.
    pub fn poll_input(&mut self, input: &mut dyn InputSource) {
        let buttons = input.controller();
        let zapper = input.zapper();

        self.bus.update_input(buttons, zapper);
        self.bus.zapper.light_sensed =
            self.ppu.frame_brightness(zapper.aim_x, zapper.aim_y) > LIGHT_SENSE_THRESHOLD;
    }

    /// Hands all samples mixed since the last flush to the audio sink.
    pub fn flush_samples(&mut self, audio: &mut dyn AudioSink) {
        if self.samples.is_empty() {
            return;
        }

        audio.queue_samples(&self.samples, false);
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joypad::{Buttons, ZapperState};
    use crate::ppu::palette::Colour;

    struct NullSink;

    impl PixelSink for NullSink {
        fn put_pixel(&mut self, _x: usize, _y: usize, _colour: Colour) {}

        fn present_frame(&mut self) {}
    }

    struct VecAudio {
        samples: Vec<f32>,
    }

    impl AudioSink for VecAudio {
        fn queue_samples(&mut self, samples: &[f32], _looping: bool) {
            self.samples.extend_from_slice(samples);
        }
    }

    struct FixedInput {
        buttons: Buttons,
        zapper: ZapperState,
    }

    impl InputSource for FixedInput {
        fn controller(&mut self) -> Buttons {
            self.buttons
        }

        fn zapper(&mut self) -> ZapperState {
            self.zapper
        }
    }

    // CPU cycles in one frame, rounded up: 262 * 341 / 3
    const CYCLES_PER_FRAME: u64 = 29_781;

    /// NROM image whose reset vector spins in place and whose NMI handler
    /// writes a marker into RAM.
    fn looping_cartridge() -> CartridgeNes {
        let mut prg = vec![0u8; 0x4000];

        // 0x8000: JMP 0x8000
        prg[0x0000..0x0003].copy_from_slice(&[0x4C, 0x00, 0x80]);
        // 0x8100: LDA #0x01; STA 0x10; RTI
        prg[0x0100..0x0105].copy_from_slice(&[0xA9, 0x01, 0x85, 0x10, 0x40]);

        // vectors: NMI 0x8100, reset 0x8000
        prg[0x3FFA..0x3FFE].copy_from_slice(&[0x00, 0x81, 0x00, 0x80]);

        let mut data = vec![0x4E, 0x45, 0x53, 0x1A, 1, 1];
        data.resize(0x10, 0);
        data.extend_from_slice(&prg);
        data.extend_from_slice(&vec![0u8; 0x2000]);

        CartridgeNes::from_ines_bytes(&data).unwrap()
    }

    #[test]
    fn one_frame_of_cycles_presents_one_frame() {
        let mut nes = Nes::new(looping_cartridge(), 44_100);

        nes.run_cycles(CYCLES_PER_FRAME, &mut NullSink).unwrap();

        assert_eq!(nes.ppu.frame_count(), 1);
    }

    #[test]
    fn vblank_nmi_reaches_the_cpu() {
        let mut nes = Nes::new(looping_cartridge(), 44_100);

        nes.bus.cpu_write(0x2000, 0x80);
        nes.run_cycles(CYCLES_PER_FRAME, &mut NullSink).unwrap();

        assert_eq!(nes.bus.cpu_read(0x0010), Some(0x01));
    }

    #[test]
    fn nmi_disabled_leaves_ram_untouched() {
        let mut nes = Nes::new(looping_cartridge(), 44_100);

        nes.run_cycles(CYCLES_PER_FRAME, &mut NullSink).unwrap();

        assert_eq!(nes.bus.cpu_read(0x0010), Some(0x00));
    }

    #[test]
    fn samples_accumulate_and_flush_once() {
        let mut nes = Nes::new(looping_cartridge(), 44_100);
        let mut audio = VecAudio {
            samples: Vec::new(),
        };

        nes.run_cycles(CYCLES_PER_FRAME, &mut NullSink).unwrap();
        nes.flush_samples(&mut audio);

        // one frame at 44.1kHz and 60 fps is roughly 735 samples
        let flushed = audio.samples.len();
        assert!((700..=770).contains(&flushed), "got {}", flushed);

        nes.flush_samples(&mut audio);
        assert_eq!(audio.samples.len(), flushed);
    }

    #[test]
    fn light_gun_senses_a_bright_frame() {
        let mut nes = Nes::new(looping_cartridge(), 44_100);

        // white backdrop
        nes.bus.cpu_write(0x2006, 0x3F);
        nes.bus.cpu_write(0x2006, 0x00);
        nes.bus.cpu_write(0x2007, 0x30);

        nes.run_cycles(CYCLES_PER_FRAME, &mut NullSink).unwrap();

        let mut input = FixedInput {
            buttons: Buttons::empty(),
            zapper: ZapperState {
                trigger: true,
                aim_x: 128,
                aim_y: 120,
            },
        };
        nes.poll_input(&mut input);

        assert!(nes.bus.zapper.light_sensed);
        assert_eq!(nes.bus.zapper.register_bits() & 0x08, 0);
    }

    #[test]
    fn controller_state_reaches_the_bus() {
        let mut nes = Nes::new(looping_cartridge(), 44_100);

        let mut input = FixedInput {
            buttons: Buttons::A,
            zapper: ZapperState::default(),
        };
        nes.poll_input(&mut input);

        nes.bus.cpu_write(0x4016, 1);
        nes.bus.cpu_write(0x4016, 0);

        assert_eq!(nes.bus.cpu_read(0x4016), Some(1));
    }
}
