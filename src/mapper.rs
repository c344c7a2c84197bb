mod nrom;

#[cfg(test)]
mod testmapper;

use crate::cartridge::Mirroring;

pub use self::nrom::Nrom;

#[cfg(test)]
pub use self::testmapper::TestMapper;

pub const PRG_ROM_START: usize = 0x8000;
pub const PRG_ROM_END: usize = 0xFFFF;

pub const PRG_RAM_START: usize = 0x6000;
pub const PRG_RAM_END: usize = 0x7FFF;

pub const PATTERN_START: usize = 0x0000;
pub const PATTERN_END: usize = 0x1FFF;

/// A mapper owns the cartridge's PRG/CHR bytes and decides how CPU and PPU
/// addresses land in them.
pub trait Mapper {
    /// Some contains the successfully read byte; None means the address is
    /// not the cartridge's to answer.
    fn mapped_cpu_read(&mut self, addr: usize) -> Option<u8>;

    /// Returns true if the cartridge claimed the write.
    fn mapped_cpu_write(&mut self, addr: usize, byte: u8) -> bool;

    /// Returns the addressed pattern table byte (PPU 0x0000 to 0x1FFF).
    fn mapped_ppu_read(&self, addr: usize) -> u8;

    fn mapped_ppu_write(&mut self, addr: usize, byte: u8);

    /// Some mappers can change mirroring mode during execution.
    fn get_updated_mirroring(&self) -> Option<Mirroring> {
        None
    }

    /// Resets mapper's internal state, NOT including memory.
    fn reset(&mut self) {}
}
