use crate::cartridge::{CHR_BANK_SIZE, PRG_BANK_SIZE};

use super::{Mapper, PATTERN_END, PATTERN_START, PRG_RAM_END, PRG_RAM_START, PRG_ROM_END, PRG_ROM_START};

const PRG_RAM_SIZE: usize = 0x2000;

/// iNES mapper 0: no banking at all. One or two fixed 16KB PRG banks, one
/// 8KB CHR bank (RAM when the header advertises none), 8KB of PRG RAM.
pub struct Nrom {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_writable: bool,
    prg_ram: [u8; PRG_RAM_SIZE],
    prg_rom_banks: usize, // 1 or 2 bank(s)
}

impl Nrom {
    pub fn new(prg_rom: Vec<u8>, chr_rom: Vec<u8>, prg_rom_banks: usize) -> Self {
        let chr_writable = chr_rom.is_empty();

        Self {
            prg_rom,
            chr: if chr_writable {
                vec![0; CHR_BANK_SIZE]
            } else {
                chr_rom
            },
            chr_writable,
            prg_ram: [0; PRG_RAM_SIZE],
            prg_rom_banks,
        }
    }
}

impl Mapper for Nrom {
    fn mapped_cpu_read(&mut self, addr: usize) -> Option<u8> {
        match addr {
            PRG_RAM_START..=PRG_RAM_END => Some(self.prg_ram[addr - PRG_RAM_START]),
            PRG_ROM_START..=PRG_ROM_END => {
                let addr = addr - PRG_ROM_START;

                Some(if self.prg_rom_banks == 1 {
                    // address wraps back for ROMs with only a single 16KB bank
                    self.prg_rom[addr % PRG_BANK_SIZE]
                } else {
                    self.prg_rom[addr]
                })
            }
            _ => None,
        }
    }

    fn mapped_cpu_write(&mut self, addr: usize, byte: u8) -> bool {
        match addr {
            PRG_RAM_START..=PRG_RAM_END => {
                self.prg_ram[addr - PRG_RAM_START] = byte;
                true
            }
            _ => false,
        }
    }

    fn mapped_ppu_read(&self, addr: usize) -> u8 {
        match addr {
            PATTERN_START..=PATTERN_END => self.chr[addr],
            _ => unreachable!(),
        }
    }

    fn mapped_ppu_write(&mut self, addr: usize, byte: u8) {
        if self.chr_writable {
            self.chr[addr] = byte;
        }
    }
}
