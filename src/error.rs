use thiserror::Error;

/// Everything that can go wrong while parsing an iNES image. Construction
/// fails atomically; no partially-loaded cartridge escapes.
#[derive(Debug, Error)]
pub enum RomError {
    #[error("ROM is {0} bytes, shorter than the 16-byte iNES header")]
    HeaderTooShort(usize),

    #[error("bad iNES magic bytes: {0:02X?}")]
    BadMagic([u8; 4]),

    #[error("{section} section truncated: header promises {expected} bytes, {actual} remain")]
    SectionTruncated {
        section: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("mapper {0} is not supported")]
    UnsupportedMapper(u8),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    #[error("invalid opcode {opcode:#04X} at {pc:#06X}")]
    InvalidOpcode { opcode: u8, pc: usize },
}
