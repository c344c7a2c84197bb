#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate bitflags;

mod apu;
mod bus;
mod cartridge;
mod cpu;
mod error;
mod joypad;
mod mapper;
mod ppu;
mod system;

pub use apu::Apu2A03;
pub use bus::SystemBus;
pub use cartridge::CartridgeNes;
pub use cpu::Cpu6502;
pub use error::{CpuError, RomError};
pub use joypad::{Buttons, ZapperState};
pub use ppu::palette::Colour;
pub use ppu::Ppu2C03;
pub use system::Nes;

pub const DISPLAY_WIDTH: usize = 256;
pub const DISPLAY_HEIGHT: usize = 240;

/// CPU clocks per second (NTSC).
pub const CPU_CLOCK_HZ: u32 = 1_789_773;

pub trait SystemControl {
    fn reset(&mut self);
}

/// Receives the finished frame, one pixel at a time followed by a present.
pub trait PixelSink {
    fn put_pixel(&mut self, x: usize, y: usize, colour: Colour);

    fn present_frame(&mut self);
}

/// Receives mixed audio. `looping` marks batches the host may repeat to
/// paper over an underrun.
pub trait AudioSink {
    fn queue_samples(&mut self, samples: &[f32], looping: bool);
}

/// Polled once per frame for the state of both controller ports.
pub trait InputSource {
    fn controller(&mut self) -> Buttons;

    fn zapper(&mut self) -> ZapperState;
}
