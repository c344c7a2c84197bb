use super::Mapper;

pub struct TestMapper {
    prg_rom: Vec<u8>,
    chr_rom: Vec<u8>,
}

impl Mapper for TestMapper {
    fn mapped_cpu_read(&mut self, addr: usize) -> Option<u8> {
        Some(self.prg_rom[addr])
    }

    fn mapped_cpu_write(&mut self, addr: usize, byte: u8) -> bool {
        self.prg_rom[addr] = byte;
        true
    }

    fn mapped_ppu_read(&self, addr: usize) -> u8 {
        self.chr_rom[addr]
    }

    fn mapped_ppu_write(&mut self, addr: usize, byte: u8) {
        self.chr_rom[addr] = byte;
    }
}

impl TestMapper {
    pub fn new() -> Self {
        Self {
            prg_rom: vec![0; 0x10000],
            chr_rom: vec![0; 0x2000],
        }
    }
}
