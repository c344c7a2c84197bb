use crate::apu::Apu2A03;
use crate::cartridge::CartridgeNes;
use crate::joypad::{Buttons, Joypad, Zapper, ZapperState};
use crate::ppu::PpuBus;
use crate::SystemControl;

const CPU_RAM_START: usize = 0x0000;
const CPU_RAM_END: usize = 0x1FFF;
const PPU_REG_START: usize = 0x2000;
const PPU_REG_END: usize = 0x3FFF;

const APU_REG_START: usize = 0x4000;
const APU_REG_END: usize = 0x4013;
pub const DMA_REG_ADDR: usize = 0x4014;
const APU_STATUS_REG: usize = 0x4015;
const JOYPAD1_REG: usize = 0x4016;
const FRAME_COUNTER_REG: usize = 0x4017;

// APU/IO test mode registers, disabled on a production console
const DISABLED_START: usize = 0x4018;
const DISABLED_END: usize = 0x401F;

const CPU_RAM_LENGTH: usize = 0x800;

pub struct SystemBus {
    pub cartridge: CartridgeNes,
    pub ppu_bus: PpuBus,
    pub apu: Apu2A03,

    pub joypads: [Joypad; 2],
    pub zapper: Zapper,

    cpu_ram: [u8; CPU_RAM_LENGTH],
}

impl SystemControl for SystemBus {
    fn reset(&mut self) {
        self.cartridge.reset();
        self.ppu_bus.reset();
        self.apu.reset();
        self.joypads[0].reset();
        self.joypads[1].reset();
        self.zapper.reset();
    }
}

impl SystemBus {
    pub fn new(cartridge: CartridgeNes, apu: Apu2A03) -> Self {
        Self {
            cartridge,
            ppu_bus: PpuBus::new(),
            apu,

            joypads: [Joypad::new(), Joypad::new()],
            zapper: Zapper::new(),

            cpu_ram: [0; CPU_RAM_LENGTH],
        }
    }

    pub fn cpu_read(&mut self, addr: usize) -> Option<u8> {
        if let Some(byte) = self.cartridge.cpu_read(addr) {
            return Some(byte);
        }

        match addr {
            CPU_RAM_START..=CPU_RAM_END => Some(self.cpu_ram[addr % CPU_RAM_LENGTH]),
            PPU_REG_START..=PPU_REG_END => {
                Some(self.ppu_bus.cpu_read_reg(addr, &mut self.cartridge))
            }
            APU_REG_START..=APU_REG_END | DMA_REG_ADDR => Some(0),
            APU_STATUS_REG => Some(self.apu.read_status()),
            JOYPAD1_REG => Some(self.joypads[0].read()),
            FRAME_COUNTER_REG => Some(self.joypads[1].read() | self.zapper.register_bits()),
            DISABLED_START..=DISABLED_END => {
                panic!("read from disabled test register {:#06X}", addr)
            }
            _ => None,
        }
    }

    pub fn cpu_write(&mut self, addr: usize, byte: u8) -> bool {
        if self.cartridge.cpu_write(addr, byte) {
            return true;
        }

        let mut success = true;

        match addr {
            CPU_RAM_START..=CPU_RAM_END => self.cpu_ram[addr % CPU_RAM_LENGTH] = byte,
            PPU_REG_START..=PPU_REG_END => {
                self.ppu_bus.cpu_write_reg(addr, byte, &mut self.cartridge)
            }
            APU_REG_START..=APU_REG_END | APU_STATUS_REG | FRAME_COUNTER_REG => {
                self.apu.write_register(addr, byte)
            }
            DMA_REG_ADDR => self.oam_dma(byte),
            JOYPAD1_REG => {
                self.joypads[0].write_strobe(byte);
                self.joypads[1].write_strobe(byte);
            }
            DISABLED_START..=DISABLED_END => {
                panic!("write to disabled test register {:#06X}", addr)
            }
            _ => success = false,
        };

        success
    }

    // whole-page OAM transfer, offset by the current OAM address
    fn oam_dma(&mut self, page: u8) {
        for offset in 0..=0xFF {
            let byte = self
                .cpu_read(((page as usize) << 8) | offset)
                .unwrap_or_default();

            self.ppu_bus.transfer_to_oam(offset, byte);
        }
    }

    pub fn ppu_read(&self, addr: usize) -> u8 {
        self.ppu_bus.ppu_read(addr, &self.cartridge)
    }

    pub fn update_input(&mut self, buttons: Buttons, zapper: ZapperState) {
        self.joypads[0].set_buttons(buttons);
        self.zapper.set_state(zapper);
    }

    pub fn irq_active(&mut self) -> bool {
        self.apu.irq_active()
    }
}

#[cfg(test)]
impl SystemBus {
    pub fn test_new() -> Self {
        SystemBus::new(CartridgeNes::test_new(), Apu2A03::new(44_100))
    }

    /// Flat 64KB memory behind a test mapper, for exercising the CPU.
    pub fn test_new_flat() -> Self {
        SystemBus::new(CartridgeNes::test_new_flat(), Apu2A03::new(44_100))
    }

    pub fn load_ram(&mut self, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.cartridge.cpu_write(i, *byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_ram_mirrors_every_0x800() {
        let mut bus = SystemBus::test_new();

        bus.cpu_write(0x0123, 0xAB);

        assert_eq!(bus.cpu_read(0x0923), Some(0xAB));
        assert_eq!(bus.cpu_read(0x1123), Some(0xAB));
        assert_eq!(bus.cpu_read(0x1923), Some(0xAB));
    }

    #[test]
    fn ppu_registers_mirror_every_eight() {
        let mut bus = SystemBus::test_new();
        bus.ppu_bus
            .status
            .insert(crate::ppu::registers::PpuStatus::IN_VBLANK);

        // 0x3FFA mirrors 0x2002; the read also clears the flag
        let byte = bus.cpu_read(0x3FFA).unwrap();
        assert_ne!(byte & 0x80, 0);
        assert!(!bus
            .ppu_bus
            .status
            .contains(crate::ppu::registers::PpuStatus::IN_VBLANK));
    }

    #[test]
    fn oam_dma_copies_a_full_page() {
        let mut bus = SystemBus::test_new();

        for i in 0..=0xFF {
            bus.cpu_write(0x0200 + i, i as u8);
        }

        bus.cpu_write(0x2003, 0x00);
        bus.cpu_write(DMA_REG_ADDR, 0x02);

        assert_eq!(bus.ppu_bus.read_oam_entry(0x10).y, 0x10);
        assert_eq!(bus.ppu_bus.read_oam_entry(0xFC).x, 0xFF);
    }

    #[test]
    fn oam_dma_respects_oam_address_offset() {
        let mut bus = SystemBus::test_new();

        for i in 0..=0xFF {
            bus.cpu_write(0x0300 + i, i as u8);
        }

        bus.cpu_write(0x2003, 0x80);
        bus.cpu_write(DMA_REG_ADDR, 0x03);

        // byte 0 of the page lands at OAM 0x80, wrapping at the top
        assert_eq!(bus.ppu_bus.read_oam_entry(0x80).y, 0x00);
        assert_eq!(bus.ppu_bus.read_oam_entry(0x00).y, 0x80);
    }

    #[test]
    #[should_panic(expected = "disabled test register")]
    fn disabled_window_read_panics() {
        let mut bus = SystemBus::test_new();
        bus.cpu_read(0x4018);
    }

    #[test]
    #[should_panic(expected = "disabled test register")]
    fn disabled_window_write_panics() {
        let mut bus = SystemBus::test_new();
        bus.cpu_write(0x401F, 0x00);
    }

    #[test]
    fn joypad_strobe_and_shift_through_bus() {
        let mut bus = SystemBus::test_new();
        bus.update_input(Buttons::A | Buttons::RIGHT, ZapperState::default());

        bus.cpu_write(JOYPAD1_REG, 1);
        bus.cpu_write(JOYPAD1_REG, 0);

        let bits: Vec<u8> = (0..8).map(|_| bus.cpu_read(JOYPAD1_REG).unwrap()).collect();
        assert_eq!(bits, vec![1, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn zapper_bits_on_second_port() {
        let mut bus = SystemBus::test_new();
        bus.update_input(
            Buttons::empty(),
            ZapperState {
                trigger: true,
                aim_x: 0,
                aim_y: 0,
            },
        );

        // no light sensed: D3 high, D4 follows the trigger
        let byte = bus.cpu_read(FRAME_COUNTER_REG).unwrap();
        assert_ne!(byte & 0x10, 0);
        assert_ne!(byte & 0x08, 0);
    }
}
