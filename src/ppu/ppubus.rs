use crate::cartridge::CartridgeNes;
use crate::SystemControl;

use super::registers::{PpuCtrl, PpuMask, PpuStatus};

const PATTERN_TABLE_START: usize = 0x0000;
const PATTERN_TABLE_END: usize = 0x1FFF;

pub const NAME_TABLE_START: usize = 0x2000;
const NAME_TABLE_END: usize = 0x3EFF;
pub const ATTR_TABLE_START: usize = 0x23C0;

pub const PALETTE_TABLE_START: usize = 0x3F00;
const PALETTE_TABLE_END: usize = 0x3FFF;

const PALETTE_TABLE_SIZE: usize = 0x20;
pub const OAM_SIZE: usize = 0x100;

#[derive(Clone, Copy)]
pub struct OamEntry {
    pub y: usize,
    pub id: usize,
    attributes: usize,
    pub x: usize,
}

impl OamEntry {
    pub fn y_flipped(&self) -> bool {
        self.attributes & 0x80 != 0
    }

    pub fn x_flipped(&self) -> bool {
        self.attributes & 0x40 != 0
    }

    pub fn in_front_of_bg(&self) -> bool {
        self.attributes & 0x20 == 0
    }

    pub fn palette(&self) -> usize {
        self.attributes & 0x03
    }
}

/// The PPU's CPU-facing register file plus the memory only it can reach:
/// OAM and palette RAM. Name tables and pattern space live behind the
/// cartridge. Address writes go high byte then low byte through a single
/// latch shared with the scroll register.
pub struct PpuBus {
    palette_table: [u8; PALETTE_TABLE_SIZE],
    oam: [u8; OAM_SIZE],

    pub ctrl: PpuCtrl,
    pub mask: PpuMask,
    pub status: PpuStatus,
    pub oam_addr_reg: u8,

    pub scroll_x: u8,
    pub scroll_y: u8,

    vram_addr: u16,
    addr_latch: bool,
    data_buffer: u8,
}

impl SystemControl for PpuBus {
    fn reset(&mut self) {
        self.ctrl = PpuCtrl::from_bits_truncate(0);
        self.mask = PpuMask::from_bits_truncate(0);
        self.status = PpuStatus::from_bits_truncate(0);
        self.oam_addr_reg = 0;

        self.scroll_x = 0;
        self.scroll_y = 0;

        self.vram_addr = 0;
        self.addr_latch = false;
        self.data_buffer = 0;
    }
}

impl PpuBus {
    pub fn new() -> Self {
        Self {
            palette_table: [0; PALETTE_TABLE_SIZE],
            oam: [0; OAM_SIZE],

            ctrl: PpuCtrl::from_bits_truncate(0),
            mask: PpuMask::from_bits_truncate(0),
            status: PpuStatus::from_bits_truncate(0),
            oam_addr_reg: 0,

            scroll_x: 0,
            scroll_y: 0,

            vram_addr: 0,
            addr_latch: false,
            data_buffer: 0,
        }
    }

    pub fn read_oam_entry(&self, oam_pos: usize) -> OamEntry {
        OamEntry {
            y: self.oam[oam_pos] as usize,
            id: self.oam[oam_pos + 1] as usize,
            attributes: self.oam[oam_pos + 2] as usize,
            x: self.oam[oam_pos + 3] as usize,
        }
    }

    pub fn transfer_to_oam(&mut self, offset: usize, byte: u8) {
        self.oam[((self.oam_addr_reg as usize) + offset) & 0xFF] = byte;
    }

    // CPU can only reach the PPU memory map through these eight registers
    pub fn cpu_read_reg(&mut self, addr: usize, cartridge: &mut CartridgeNes) -> u8 {
        match addr & 0x0007 {
            0x0002 => {
                let ret = (self.status.bits() & 0b11100000) | (self.data_buffer & 0b00011111);

                self.status.remove(PpuStatus::IN_VBLANK);
                self.addr_latch = false;

                ret
            }
            0x0004 => {
                let ret = self.oam[self.oam_addr_reg as usize];

                // address only advances while the PPU is actively rendering
                let blanked = self.status.contains(PpuStatus::IN_VBLANK)
                    || !self.mask.rendering_enabled();
                if !blanked {
                    self.oam_addr_reg = self.oam_addr_reg.wrapping_add(1);
                }

                ret
            }
            0x0007 => {
                let addr = (self.vram_addr & 0x3FFF) as usize;

                let ret = if addr >= PALETTE_TABLE_START {
                    // palette reads bypass the buffer, which still picks up
                    // the name table byte underneath
                    self.data_buffer = self.ppu_read(addr - 0x1000, cartridge);
                    self.ppu_read(addr, cartridge)
                } else {
                    let ret = self.data_buffer;
                    self.data_buffer = self.ppu_read(addr, cartridge);
                    ret
                };

                self.vram_addr = self.vram_addr.wrapping_add(self.ctrl.vram_addr_inc());

                ret
            }
            _ => 0,
        }
    }

    pub fn cpu_write_reg(&mut self, addr: usize, byte: u8, cartridge: &mut CartridgeNes) {
        match addr & 0x0007 {
            0x0000 => self.ctrl = PpuCtrl::from_bits_truncate(byte),
            0x0001 => self.mask = PpuMask::from_bits_truncate(byte),
            0x0002 => {}
            0x0003 => self.oam_addr_reg = byte,
            0x0004 => {
                self.oam[self.oam_addr_reg as usize] = byte;
                self.oam_addr_reg = self.oam_addr_reg.wrapping_add(1);
            }
            0x0005 => {
                if !self.addr_latch {
                    self.scroll_x = byte;
                } else {
                    self.scroll_y = byte;
                }

                self.addr_latch = !self.addr_latch;
            }
            0x0006 => {
                if !self.addr_latch {
                    self.vram_addr = (((byte & 0x3F) as u16) << 8) | (self.vram_addr & 0x00FF);
                } else {
                    self.vram_addr = (self.vram_addr & 0xFF00) | (byte as u16);
                }

                self.addr_latch = !self.addr_latch;
            }
            0x0007 => {
                self.ppu_write(self.vram_addr as usize, byte, cartridge);
                self.vram_addr = self.vram_addr.wrapping_add(self.ctrl.vram_addr_inc());
            }
            _ => unreachable!(),
        }
    }

    pub fn ppu_read(&self, addr: usize, cartridge: &CartridgeNes) -> u8 {
        let mut addr = addr & 0x3FFF;

        match addr {
            PATTERN_TABLE_START..=PATTERN_TABLE_END => cartridge.ppu_read(addr),
            NAME_TABLE_START..=NAME_TABLE_END => {
                // 0x3000-0x3EFF shadows 0x2000-0x2EFF
                cartridge.name_table_read(NAME_TABLE_START | (addr & 0x0FFF))
            }
            PALETTE_TABLE_START..=PALETTE_TABLE_END => {
                addr &= 0x001F;

                if addr == 0x10 || addr == 0x14 || addr == 0x18 || addr == 0x1C {
                    addr -= 0x10;
                }

                self.palette_table[addr] & if self.mask.greyscale_on() { 0x30 } else { 0x3F }
            }
            _ => unreachable!(),
        }
    }

    pub fn ppu_write(&mut self, addr: usize, byte: u8, cartridge: &mut CartridgeNes) {
        let mut addr = addr & 0x3FFF;

        match addr {
            PATTERN_TABLE_START..=PATTERN_TABLE_END => cartridge.ppu_write(addr, byte),
            NAME_TABLE_START..=NAME_TABLE_END => {
                cartridge.name_table_write(NAME_TABLE_START | (addr & 0x0FFF), byte);
            }
            PALETTE_TABLE_START..=PALETTE_TABLE_END => {
                addr &= 0x001F;

                if addr == 0x10 || addr == 0x14 || addr == 0x18 || addr == 0x1C {
                    addr -= 0x10;
                }

                self.palette_table[addr] = byte;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (PpuBus, CartridgeNes) {
        (PpuBus::new(), CartridgeNes::test_new())
    }

    #[test]
    fn status_read_resets_address_latch() {
        let (mut ppu_bus, mut cartridge) = setup();

        // half an address write, then a status read abandons it
        ppu_bus.cpu_write_reg(0x2006, 0x3F, &mut cartridge);
        ppu_bus.cpu_read_reg(0x2002, &mut cartridge);

        ppu_bus.cpu_write_reg(0x2006, 0x21, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2006, 0x08, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2007, 0x55, &mut cartridge);

        assert_eq!(ppu_bus.ppu_read(0x2108, &cartridge), 0x55);
    }

    #[test]
    fn status_read_clears_vblank() {
        let (mut ppu_bus, mut cartridge) = setup();
        ppu_bus.status.insert(PpuStatus::IN_VBLANK);

        let first = ppu_bus.cpu_read_reg(0x2002, &mut cartridge);
        let second = ppu_bus.cpu_read_reg(0x2002, &mut cartridge);

        assert_ne!(first & 0x80, 0);
        assert_eq!(second & 0x80, 0);
    }

    #[test]
    fn data_port_reads_are_buffered_except_palette() {
        let (mut ppu_bus, mut cartridge) = setup();
        cartridge.name_table_write(0x2005, 0x42);
        ppu_bus.palette_table[0x01] = 0x21;

        ppu_bus.cpu_write_reg(0x2006, 0x20, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2006, 0x05, &mut cartridge);

        // first read returns the stale buffer, second the real byte
        ppu_bus.cpu_read_reg(0x2007, &mut cartridge);
        assert_eq!(ppu_bus.cpu_read_reg(0x2007, &mut cartridge), 0x42);

        ppu_bus.cpu_write_reg(0x2006, 0x3F, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2006, 0x01, &mut cartridge);

        assert_eq!(ppu_bus.cpu_read_reg(0x2007, &mut cartridge), 0x21);
    }

    #[test]
    fn data_port_increment_honours_ctrl_bit() {
        let (mut ppu_bus, mut cartridge) = setup();

        ppu_bus.cpu_write_reg(0x2000, 0x00, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2006, 0x20, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2006, 0x00, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2007, 0x01, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2007, 0x02, &mut cartridge);

        assert_eq!(ppu_bus.ppu_read(0x2000, &cartridge), 0x01);
        assert_eq!(ppu_bus.ppu_read(0x2001, &cartridge), 0x02);

        ppu_bus.cpu_write_reg(0x2000, 0x04, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2006, 0x20, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2006, 0x40, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2007, 0x03, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2007, 0x04, &mut cartridge);

        assert_eq!(ppu_bus.ppu_read(0x2040, &cartridge), 0x03);
        assert_eq!(ppu_bus.ppu_read(0x2060, &cartridge), 0x04);
    }

    #[test]
    fn palette_mirror_entries_fold() {
        let (mut ppu_bus, mut cartridge) = setup();

        ppu_bus.ppu_write(0x3F10, 0x2A, &mut cartridge);
        assert_eq!(ppu_bus.ppu_read(0x3F00, &cartridge), 0x2A);

        ppu_bus.ppu_write(0x3F04, 0x1B, &mut cartridge);
        assert_eq!(ppu_bus.ppu_read(0x3F14, &cartridge), 0x1B);

        ppu_bus.ppu_write(0x3F18, 0x0C, &mut cartridge);
        assert_eq!(ppu_bus.ppu_read(0x3F08, &cartridge), 0x0C);
    }

    #[test]
    fn name_table_shadow_range_folds_down() {
        let (mut ppu_bus, mut cartridge) = setup();

        ppu_bus.ppu_write(0x3123, 0x77, &mut cartridge);
        assert_eq!(ppu_bus.ppu_read(0x2123, &cartridge), 0x77);
    }

    #[test]
    fn oam_data_write_advances_address() {
        let (mut ppu_bus, mut cartridge) = setup();

        ppu_bus.cpu_write_reg(0x2003, 0x10, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2004, 0xAA, &mut cartridge);
        ppu_bus.cpu_write_reg(0x2004, 0xBB, &mut cartridge);

        assert_eq!(ppu_bus.oam[0x10], 0xAA);
        assert_eq!(ppu_bus.oam[0x11], 0xBB);
    }

    #[test]
    fn oam_data_read_holds_address_while_blanked() {
        let (mut ppu_bus, mut cartridge) = setup();
        ppu_bus.status.insert(PpuStatus::IN_VBLANK);

        ppu_bus.oam[0x20] = 0xCD;
        ppu_bus.cpu_write_reg(0x2003, 0x20, &mut cartridge);

        assert_eq!(ppu_bus.cpu_read_reg(0x2004, &mut cartridge), 0xCD);
        assert_eq!(ppu_bus.cpu_read_reg(0x2004, &mut cartridge), 0xCD);
        assert_eq!(ppu_bus.oam_addr_reg, 0x20);
    }
}
