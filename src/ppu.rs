pub mod palette;
pub(crate) mod ppubus;
pub(crate) mod registers;

use crate::bus::SystemBus;
use crate::cartridge::CartridgeNes;
use crate::{PixelSink, SystemControl, DISPLAY_HEIGHT, DISPLAY_WIDTH};

use self::palette::{Colour, SYSTEM_PALETTE};
use self::ppubus::PALETTE_TABLE_START;
pub(crate) use self::ppubus::PpuBus;
use self::registers::PpuStatus;

const DOTS_PER_SCANLINE: usize = 341;
const SCANLINES_PER_FRAME: usize = 262;

const VBLANK_SCANLINE: usize = 240;
const PRE_RENDER_SCANLINE: usize = 261;

const TILE_SIZE: usize = 8;
const SPRITE_COUNT: usize = 64;
const MAX_SPRITES_PER_SCANLINE: usize = 8;

/// The picture processor, stepped three dots per CPU cycle. The whole frame
/// is composed in one pass when the VBLANK boundary is reached, which keeps
/// the CPU-observable status and NMI timing of the dot-by-dot original.
pub struct Ppu2C03 {
    scanline: usize,
    dot: usize,

    nmi_request: bool,
    frame_count: u64,

    frame: Vec<Colour>,
    bg_opaque: Vec<bool>,
}

impl SystemControl for Ppu2C03 {
    fn reset(&mut self) {
        self.scanline = 0;
        self.dot = 0;
        self.nmi_request = false;
        self.frame_count = 0;
        self.frame.fill(Colour::default());
        self.bg_opaque.fill(false);
    }
}

impl Ppu2C03 {
    pub fn new() -> Self {
        Self {
            scanline: 0,
            dot: 0,

            nmi_request: false,
            frame_count: 0,

            frame: vec![Colour::default(); DISPLAY_WIDTH * DISPLAY_HEIGHT],
            bg_opaque: vec![false; DISPLAY_WIDTH * DISPLAY_HEIGHT],
        }
    }

    /// Advances the PPU by one dot.
    pub fn clock(&mut self, bus: &mut SystemBus, pixels: &mut dyn PixelSink) {
        if self.scanline == VBLANK_SCANLINE && self.dot == 0 {
            bus.ppu_bus.status.insert(PpuStatus::IN_VBLANK);

            if bus.ppu_bus.ctrl.nmi_enabled() {
                self.nmi_request = true;
            }

            self.render_frame(bus, pixels);
            self.frame_count += 1;
        }

        if self.scanline == PRE_RENDER_SCANLINE && self.dot == 1 {
            bus.ppu_bus.status.remove(
                PpuStatus::IN_VBLANK | PpuStatus::SPR_0_HIT | PpuStatus::SPR_OVERFLOW,
            );
        }

        self.dot += 1;
        if self.dot == DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline = (self.scanline + 1) % SCANLINES_PER_FRAME;
        }
    }

    /// True exactly once per raised frame interrupt.
    pub fn take_nmi_request(&mut self) -> bool {
        let ret = self.nmi_request;
        self.nmi_request = false;
        ret
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Perceived brightness of the last composed frame at a screen
    /// coordinate, for light gun sensing.
    pub fn frame_brightness(&self, x: usize, y: usize) -> u16 {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return 0;
        }

        self.frame[y * DISPLAY_WIDTH + x].brightness()
    }

    fn render_frame(&mut self, bus: &mut SystemBus, pixels: &mut dyn PixelSink) {
        let SystemBus {
            ppu_bus, cartridge, ..
        } = bus;

        let backdrop = pixel_colour(ppu_bus, cartridge, 0, 0, false);
        self.frame.fill(backdrop);
        self.bg_opaque.fill(false);

        if ppu_bus.mask.show_bg() {
            self.render_background(ppu_bus, cartridge);
        }

        if ppu_bus.mask.rendering_enabled() {
            self.evaluate_sprite_overflow(ppu_bus);
        }

        if ppu_bus.mask.show_spr() {
            self.render_sprites(ppu_bus, cartridge);
        }

        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                pixels.put_pixel(x, y, self.frame[y * DISPLAY_WIDTH + x]);
            }
        }
        pixels.present_frame();
    }

    fn render_background(&mut self, ppu_bus: &mut PpuBus, cartridge: &CartridgeNes) {
        let name_table_base = ppu_bus.ctrl.base_name_table();
        let attr_table_base = name_table_base + 0x3C0;
        let pattern_base = ppu_bus.ctrl.bg_pattern_addr();

        let left_edge = if ppu_bus.mask.show_bg_left() {
            0
        } else {
            TILE_SIZE
        };

        for y in 0..DISPLAY_HEIGHT {
            for tile_x in 0..DISPLAY_WIDTH / TILE_SIZE {
                let x = tile_x * TILE_SIZE;

                let name_table_index = (y / TILE_SIZE) * 32 + tile_x;
                let tile_id =
                    ppu_bus.ppu_read(name_table_base + name_table_index, cartridge) as usize;

                let tile_row = y % TILE_SIZE;
                let pattern_addr = pattern_base + tile_id * 16 + tile_row;
                let plane_lo = ppu_bus.ppu_read(pattern_addr, cartridge);
                let plane_hi = ppu_bus.ppu_read(pattern_addr + 8, cartridge);

                // one attribute byte covers a 4x4 tile area, two bits per
                // 2x2 tile quadrant
                let attr_index = (y / 32) * 8 + x / 32;
                let attr = ppu_bus.ppu_read(attr_table_base + attr_index, cartridge);
                let quadrant = (((y / 16) % 2) << 1) | ((x / 16) % 2);
                let palette_index = ((attr >> (quadrant * 2)) & 0x03) as usize;

                for tile_col in 0..TILE_SIZE {
                    if x + tile_col < left_edge {
                        continue;
                    }

                    let pixel = (((plane_hi >> (7 - tile_col)) & 0x01) << 1)
                        | ((plane_lo >> (7 - tile_col)) & 0x01);

                    let index = y * DISPLAY_WIDTH + x + tile_col;
                    self.frame[index] =
                        pixel_colour(ppu_bus, cartridge, palette_index, pixel, false);
                    self.bg_opaque[index] = pixel != 0;
                }
            }
        }
    }

    fn render_sprites(&mut self, ppu_bus: &mut PpuBus, cartridge: &CartridgeNes) {
        let pattern_base = ppu_bus.ctrl.spr_pattern_addr();

        let left_edge = if ppu_bus.mask.show_spr_left() {
            0
        } else {
            TILE_SIZE
        };

        // back to front, so the lowest OAM index wins overlaps
        for i in (0..SPRITE_COUNT).rev() {
            let sprite = ppu_bus.read_oam_entry(i * 4);

            if sprite.y > DISPLAY_HEIGHT - TILE_SIZE {
                continue;
            }

            for row in 0..TILE_SIZE {
                let tile_row = if sprite.y_flipped() { 7 - row } else { row };

                let pattern_addr = pattern_base + sprite.id * 16 + tile_row;
                let plane_lo = ppu_bus.ppu_read(pattern_addr, cartridge);
                let plane_hi = ppu_bus.ppu_read(pattern_addr + 8, cartridge);

                for col in 0..TILE_SIZE {
                    let bit = if sprite.x_flipped() { col } else { 7 - col };
                    let pixel = (((plane_hi >> bit) & 0x01) << 1) | ((plane_lo >> bit) & 0x01);

                    // colour 0 is transparent for sprites
                    if pixel == 0 {
                        continue;
                    }

                    let x = sprite.x + col;
                    let y = sprite.y + row;
                    if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT || x < left_edge {
                        continue;
                    }

                    let index = y * DISPLAY_WIDTH + x;

                    if i == 0 && self.bg_opaque[index] && x != 255 {
                        ppu_bus.status.insert(PpuStatus::SPR_0_HIT);
                    }

                    if !sprite.in_front_of_bg() && self.bg_opaque[index] {
                        continue;
                    }

                    self.frame[index] =
                        pixel_colour(ppu_bus, cartridge, sprite.palette(), pixel, true);
                }
            }
        }
    }

    // more than eight sprites falling on one scanline sets the overflow bit
    fn evaluate_sprite_overflow(&self, ppu_bus: &mut PpuBus) {
        let height = ppu_bus.ctrl.spr_height();

        for y in 0..DISPLAY_HEIGHT {
            let mut count = 0;

            for i in 0..SPRITE_COUNT {
                let sprite_y = ppu_bus.read_oam_entry(i * 4).y;

                if (sprite_y..sprite_y + height).contains(&y) {
                    count += 1;
                }
            }

            if count > MAX_SPRITES_PER_SCANLINE {
                ppu_bus.status.insert(PpuStatus::SPR_OVERFLOW);
                return;
            }
        }
    }
}

fn pixel_colour(
    ppu_bus: &PpuBus,
    cartridge: &CartridgeNes,
    palette_index: usize,
    pixel: u8,
    sprite: bool,
) -> Colour {
    // colour 0 of every sub-palette mirrors the shared backdrop entry
    let addr = if pixel == 0 {
        PALETTE_TABLE_START
    } else {
        PALETTE_TABLE_START + (sprite as usize) * 0x10 + palette_index * 4 + pixel as usize
    };

    SYSTEM_PALETTE[(ppu_bus.ppu_read(addr, cartridge) & 0x3F) as usize]
}
