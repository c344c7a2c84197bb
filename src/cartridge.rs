use tracing::info;

use crate::error::RomError;
use crate::mapper::{Mapper, Nrom};
use crate::SystemControl;

// The size of each PRG-ROM bank
pub const PRG_BANK_SIZE: usize = 0x4000;

// The size of each CHR-ROM bank
pub const CHR_BANK_SIZE: usize = 0x2000;

const HEADER_SIZE: usize = 0x10;
const TRAINER_SIZE: usize = 0x200;

const NAME_TABLE_SIZE: usize = 0x400;

const INES_MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    HORIZONTAL,
    VERTICAL,
    ONE_SCREEN_LO,
    ONE_SCREEN_HI,
    FOUR_SCREEN,
}

/// A parsed iNES image: the mapper (which owns the PRG/CHR bytes) plus the
/// console-side name table VRAM the cartridge's mirroring wiring folds.
pub struct CartridgeNes {
    mirroring: Mirroring,
    mapper: Box<dyn Mapper>,
    name_tables: [[u8; NAME_TABLE_SIZE]; 4],
}

impl SystemControl for CartridgeNes {
    fn reset(&mut self) {
        self.mapper.reset();
    }
}

impl CartridgeNes {
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, RomError> {
        if data.len() < HEADER_SIZE {
            return Err(RomError::HeaderTooShort(data.len()));
        }

        // First three bytes must be "NES" in ASCII, followed by 0x1A
        if data[0..4] != INES_MAGIC {
            return Err(RomError::BadMagic([data[0], data[1], data[2], data[3]]));
        }

        let prg_rom_banks = data[4] as usize;
        let chr_rom_banks = data[5] as usize;

        let mut mirroring = if data[6] & 0x01 == 0 {
            Mirroring::HORIZONTAL
        } else {
            Mirroring::VERTICAL
        };

        if data[6] & 0b00001000 != 0 {
            mirroring = Mirroring::FOUR_SCREEN;
        }

        let has_trainer = data[6] & 0x04 != 0;

        let mapper_num = (data[7] & 0b11110000) | (data[6] >> 4);

        let prg_start = HEADER_SIZE + if has_trainer { TRAINER_SIZE } else { 0 };
        let prg_len = prg_rom_banks * PRG_BANK_SIZE;
        let chr_start = prg_start + prg_len;
        let chr_len = chr_rom_banks * CHR_BANK_SIZE;

        if data.len() < chr_start {
            return Err(RomError::SectionTruncated {
                section: "PRG-ROM",
                expected: prg_len,
                actual: data.len().saturating_sub(prg_start),
            });
        }

        if data.len() < chr_start + chr_len {
            return Err(RomError::SectionTruncated {
                section: "CHR-ROM",
                expected: chr_len,
                actual: data.len() - chr_start,
            });
        }

        let prg_rom = data[prg_start..chr_start].to_vec();
        let chr_rom = data[chr_start..chr_start + chr_len].to_vec();

        let mapper: Box<dyn Mapper> = match mapper_num {
            0 => Box::new(Nrom::new(prg_rom, chr_rom, prg_rom_banks)),
            _ => return Err(RomError::UnsupportedMapper(mapper_num)),
        };

        info!(
            mapper = mapper_num,
            prg_rom_banks,
            chr_rom_banks,
            ?mirroring,
            trainer = has_trainer,
            "cartridge loaded"
        );

        Ok(Self {
            mirroring,
            mapper,
            name_tables: [[0; NAME_TABLE_SIZE]; 4],
        })
    }

    pub fn cpu_read(&mut self, addr: usize) -> Option<u8> {
        self.mapper.mapped_cpu_read(addr)
    }

    pub fn cpu_write(&mut self, addr: usize, byte: u8) -> bool {
        self.mapper.mapped_cpu_write(addr, byte)
    }

    pub fn ppu_read(&self, addr: usize) -> u8 {
        self.mapper.mapped_ppu_read(addr)
    }

    pub fn ppu_write(&mut self, addr: usize, byte: u8) {
        self.mapper.mapped_ppu_write(addr, byte)
    }

    /// Reads name table VRAM; addr must already be folded into 0x2000-0x2FFF.
    pub fn name_table_read(&self, addr: usize) -> u8 {
        self.name_tables[self.physical_table(addr)][addr & (NAME_TABLE_SIZE - 1)]
    }

    pub fn name_table_write(&mut self, addr: usize, byte: u8) {
        self.name_tables[self.physical_table(addr)][addr & (NAME_TABLE_SIZE - 1)] = byte;
    }

    pub fn mirroring(&self) -> Mirroring {
        match self.mapper.get_updated_mirroring() {
            Some(mirroring) => mirroring,
            None => self.mirroring,
        }
    }

    fn physical_table(&self, addr: usize) -> usize {
        match self.mirroring() {
            Mirroring::HORIZONTAL => (addr >> 11) & 0x01,
            Mirroring::VERTICAL => (addr >> 10) & 0x01,
            Mirroring::ONE_SCREEN_LO => 0,
            Mirroring::ONE_SCREEN_HI => 1,
            Mirroring::FOUR_SCREEN => (addr >> 10) & 0x03,
        }
    }
}

#[cfg(test)]
impl CartridgeNes {
    pub fn test_new() -> Self {
        let mut data = vec![0; HEADER_SIZE + PRG_BANK_SIZE + CHR_BANK_SIZE];
        data[0..4].copy_from_slice(&INES_MAGIC);
        data[4] = 1;
        data[5] = 1;

        CartridgeNes::from_ines_bytes(&data).unwrap()
    }

    pub fn test_new_with_mirroring(mirroring: Mirroring) -> Self {
        let mut cartridge = CartridgeNes::test_new();
        cartridge.mirroring = mirroring;
        cartridge
    }

    /// Flat 64KB memory behind every CPU address, for CPU tests.
    pub fn test_new_flat() -> Self {
        CartridgeNes {
            mirroring: Mirroring::HORIZONTAL,
            mapper: Box::new(crate::mapper::TestMapper::new()),
            name_tables: [[0; NAME_TABLE_SIZE]; 4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ines_image(prg_banks: u8, chr_banks: u8, flags6: u8, flags7: u8) -> Vec<u8> {
        let mut data = vec![
            0;
            HEADER_SIZE
                + prg_banks as usize * PRG_BANK_SIZE
                + chr_banks as usize * CHR_BANK_SIZE
        ];
        data[0..4].copy_from_slice(&INES_MAGIC);
        data[4] = prg_banks;
        data[5] = chr_banks;
        data[6] = flags6;
        data[7] = flags7;
        data
    }

    #[test]
    fn rejects_short_buffer() {
        assert!(matches!(
            CartridgeNes::from_ines_bytes(&[0x4E, 0x45]),
            Err(RomError::HeaderTooShort(2))
        ));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = ines_image(1, 1, 0, 0);
        data[3] = 0x00;

        assert!(matches!(
            CartridgeNes::from_ines_bytes(&data),
            Err(RomError::BadMagic(_))
        ));
    }

    #[test]
    fn rejects_truncated_sections() {
        let data = ines_image(2, 1, 0, 0);

        assert!(matches!(
            CartridgeNes::from_ines_bytes(&data[..HEADER_SIZE + PRG_BANK_SIZE]),
            Err(RomError::SectionTruncated { section: "PRG-ROM", .. })
        ));

        assert!(matches!(
            CartridgeNes::from_ines_bytes(&data[..data.len() - 1]),
            Err(RomError::SectionTruncated { section: "CHR-ROM", .. })
        ));
    }

    #[test]
    fn rejects_unsupported_mapper() {
        let data = ines_image(1, 1, 0x10, 0);

        assert!(matches!(
            CartridgeNes::from_ines_bytes(&data),
            Err(RomError::UnsupportedMapper(1))
        ));
    }

    #[test]
    fn trainer_offsets_prg_section() {
        let mut data = vec![0; HEADER_SIZE + TRAINER_SIZE + PRG_BANK_SIZE + CHR_BANK_SIZE];
        data[0..4].copy_from_slice(&INES_MAGIC);
        data[4] = 1;
        data[5] = 1;
        data[6] = 0x04;
        data[HEADER_SIZE + TRAINER_SIZE] = 0x60;

        let mut cartridge = CartridgeNes::from_ines_bytes(&data).unwrap();
        assert_eq!(cartridge.cpu_read(0x8000), Some(0x60));
    }

    #[test]
    fn vertical_mirroring_pairs_tables() {
        let mut cartridge = CartridgeNes::test_new_with_mirroring(Mirroring::VERTICAL);

        cartridge.name_table_write(0x2000, 0xAA);
        assert_eq!(cartridge.name_table_read(0x2800), 0xAA);

        cartridge.name_table_write(0x2400, 0xBB);
        assert_eq!(cartridge.name_table_read(0x2C00), 0xBB);

        assert_ne!(cartridge.name_table_read(0x2400), 0xAA);
    }

    #[test]
    fn horizontal_mirroring_pairs_tables() {
        let mut cartridge = CartridgeNes::test_new_with_mirroring(Mirroring::HORIZONTAL);

        cartridge.name_table_write(0x2000, 0xAA);
        assert_eq!(cartridge.name_table_read(0x2400), 0xAA);

        cartridge.name_table_write(0x2800, 0xBB);
        assert_eq!(cartridge.name_table_read(0x2C00), 0xBB);

        assert_ne!(cartridge.name_table_read(0x2800), 0xAA);
    }

    #[test]
    fn four_screen_keeps_tables_distinct() {
        let mut cartridge = CartridgeNes::test_new_with_mirroring(Mirroring::FOUR_SCREEN);

        cartridge.name_table_write(0x2000, 0x01);
        cartridge.name_table_write(0x2400, 0x02);
        cartridge.name_table_write(0x2800, 0x03);
        cartridge.name_table_write(0x2C00, 0x04);

        assert_eq!(cartridge.name_table_read(0x2000), 0x01);
        assert_eq!(cartridge.name_table_read(0x2400), 0x02);
        assert_eq!(cartridge.name_table_read(0x2800), 0x03);
        assert_eq!(cartridge.name_table_read(0x2C00), 0x04);
    }
}
