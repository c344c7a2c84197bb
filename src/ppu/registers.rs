const PATTERN_TABLE_1_ADDR: usize = 0x0000;
const PATTERN_TABLE_2_ADDR: usize = 0x1000;

bitflags! {
    #[derive(Debug, Clone, Copy)]
    pub struct PpuCtrl: u8 {
        const NAME_TABLE_X     = 0b00000001;
        const NAME_TABLE_Y     = 0b00000010;
        const VRAM_ADDR_INC    = 0b00000100;
        const SPR_PATTERN_ADDR = 0b00001000;
        const BG_PATTERN_ADDR  = 0b00010000;
        const SPR_SIZE         = 0b00100000;
        const MASTER_SELECT    = 0b01000000;
        const NMI_ENABLED      = 0b10000000;
    }

    #[derive(Debug, Clone, Copy)]
    pub struct PpuMask: u8 {
        const GREYSCALE_ON  = 0b00000001;
        const SHOW_BG_LEFT  = 0b00000010;
        const SHOW_SPR_LEFT = 0b00000100;
        const SHOW_BG       = 0b00001000;
        const SHOW_SPR      = 0b00010000;
        const EMP_RED       = 0b00100000;
        const EMP_GREEN     = 0b01000000;
        const EMP_BLUE      = 0b10000000;
    }

    #[derive(Debug, Clone, Copy)]
    pub struct PpuStatus: u8 {
        const SPR_OVERFLOW = 0b00100000;
        const SPR_0_HIT    = 0b01000000;
        const IN_VBLANK    = 0b10000000;
    }
}

impl PpuCtrl {
    #[inline]
    pub fn base_name_table(&self) -> usize {
        0x2000 + 0x400 * (self.bits() & 0x03) as usize
    }

    #[inline]
    pub fn vram_addr_inc(&self) -> u16 {
        if self.contains(PpuCtrl::VRAM_ADDR_INC) {
            32
        } else {
            1
        }
    }

    #[inline]
    pub fn spr_pattern_addr(&self) -> usize {
        if self.contains(PpuCtrl::SPR_PATTERN_ADDR) {
            PATTERN_TABLE_2_ADDR
        } else {
            PATTERN_TABLE_1_ADDR
        }
    }

    #[inline]
    pub fn bg_pattern_addr(&self) -> usize {
        if self.contains(PpuCtrl::BG_PATTERN_ADDR) {
            PATTERN_TABLE_2_ADDR
        } else {
            PATTERN_TABLE_1_ADDR
        }
    }

    #[inline]
    pub fn spr_height(&self) -> usize {
        if self.contains(PpuCtrl::SPR_SIZE) {
            16
        } else {
            8
        }
    }

    #[inline]
    pub fn nmi_enabled(&self) -> bool {
        self.contains(PpuCtrl::NMI_ENABLED)
    }
}

impl PpuMask {
    #[inline]
    pub fn greyscale_on(&self) -> bool {
        self.contains(PpuMask::GREYSCALE_ON)
    }

    #[inline]
    pub fn show_bg_left(&self) -> bool {
        self.contains(PpuMask::SHOW_BG_LEFT)
    }

    #[inline]
    pub fn show_spr_left(&self) -> bool {
        self.contains(PpuMask::SHOW_SPR_LEFT)
    }

    #[inline]
    pub fn show_bg(&self) -> bool {
        self.contains(PpuMask::SHOW_BG)
    }

    #[inline]
    pub fn show_spr(&self) -> bool {
        self.contains(PpuMask::SHOW_SPR)
    }

    #[inline]
    pub fn rendering_enabled(&self) -> bool {
        self.intersects(PpuMask::SHOW_BG.union(PpuMask::SHOW_SPR))
    }
}
