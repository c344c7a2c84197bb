/// One RGB entry of the 2C02's fixed 64-colour output palette.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Rough perceived brightness, used for light gun sensing.
    pub fn brightness(&self) -> u16 {
        self.r as u16 + self.g as u16 + self.b as u16
    }
}

/// The composite 2C02 output palette, indexed by a 6-bit palette RAM byte.
pub const SYSTEM_PALETTE: [Colour; 64] = [
    Colour::new(84, 84, 84),
    Colour::new(0, 30, 116),
    Colour::new(8, 16, 144),
    Colour::new(48, 0, 136),
    Colour::new(68, 0, 100),
    Colour::new(92, 0, 48),
    Colour::new(84, 4, 0),
    Colour::new(60, 24, 0),
    Colour::new(32, 42, 0),
    Colour::new(8, 58, 0),
    Colour::new(0, 64, 0),
    Colour::new(0, 60, 0),
    Colour::new(0, 50, 60),
    Colour::new(0, 0, 0),
    Colour::new(0, 0, 0),
    Colour::new(0, 0, 0),
    Colour::new(152, 150, 152),
    Colour::new(8, 76, 196),
    Colour::new(48, 50, 236),
    Colour::new(92, 30, 228),
    Colour::new(136, 20, 176),
    Colour::new(160, 20, 100),
    Colour::new(152, 34, 32),
    Colour::new(120, 60, 0),
    Colour::new(84, 90, 0),
    Colour::new(40, 114, 0),
    Colour::new(8, 124, 0),
    Colour::new(0, 118, 40),
    Colour::new(0, 102, 120),
    Colour::new(0, 0, 0),
    Colour::new(0, 0, 0),
    Colour::new(0, 0, 0),
    Colour::new(236, 238, 236),
    Colour::new(76, 154, 236),
    Colour::new(120, 124, 236),
    Colour::new(176, 98, 236),
    Colour::new(228, 84, 236),
    Colour::new(236, 88, 180),
    Colour::new(236, 106, 100),
    Colour::new(212, 136, 32),
    Colour::new(160, 170, 0),
    Colour::new(116, 196, 0),
    Colour::new(76, 208, 32),
    Colour::new(56, 204, 108),
    Colour::new(56, 180, 204),
    Colour::new(60, 60, 60),
    Colour::new(0, 0, 0),
    Colour::new(0, 0, 0),
    Colour::new(236, 238, 236),
    Colour::new(168, 204, 236),
    Colour::new(188, 188, 236),
    Colour::new(212, 178, 236),
    Colour::new(236, 174, 236),
    Colour::new(236, 174, 212),
    Colour::new(236, 180, 176),
    Colour::new(228, 196, 144),
    Colour::new(204, 210, 120),
    Colour::new(180, 222, 120),
    Colour::new(168, 226, 144),
    Colour::new(152, 226, 180),
    Colour::new(160, 214, 228),
    Colour::new(160, 162, 160),
    Colour::new(0, 0, 0),
    Colour::new(0, 0, 0),
];
