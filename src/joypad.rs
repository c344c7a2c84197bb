use crate::SystemControl;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u8 {
        const RIGHT  = 0b00000001;
        const LEFT   = 0b00000010;
        const DOWN   = 0b00000100;
        const UP     = 0b00001000;
        const START  = 0b00010000;
        const SELECT = 0b00100000;
        const B      = 0b01000000;
        const A      = 0b10000000;
    }
}

/// Light gun state as reported by the host. Whether the photodiode actually
/// sees light is decided against the rendered frame, not by the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZapperState {
    pub trigger: bool,
    pub aim_x: usize,
    pub aim_y: usize,
}

/// Standard controller: a strobe latch feeding an 8-bit shift register,
/// read out A first. Reads past the eighth return 1, like the real pad's
/// pulled-up data line.
pub struct Joypad {
    state: Buttons,
    strobe: bool,
    shift_reg: u8,
    reads: u8,
}

impl SystemControl for Joypad {
    fn reset(&mut self) {
        self.state = Buttons::empty();
        self.strobe = false;
        self.shift_reg = 0;
        self.reads = 0;
    }
}

impl Joypad {
    pub fn new() -> Self {
        Self {
            state: Buttons::empty(),
            strobe: false,
            shift_reg: 0,
            reads: 0,
        }
    }

    pub fn set_buttons(&mut self, state: Buttons) {
        self.state = state;
    }

    pub fn write_strobe(&mut self, byte: u8) {
        self.strobe = byte & 0x01 != 0;

        if self.strobe {
            self.shift_reg = self.state.bits();
            self.reads = 0;
        }
    }

    pub fn read(&mut self) -> u8 {
        if self.strobe {
            // latch is held open; every read sees the live A button
            return self.state.contains(Buttons::A) as u8;
        }

        if self.reads >= 8 {
            return 1;
        }

        let bit = (self.shift_reg & 0x80) >> 7;
        self.shift_reg <<= 1;
        self.reads += 1;

        bit
    }
}

/// Light gun on the second port. D4 is the trigger; D3 goes low while the
/// photodiode sees light.
pub struct Zapper {
    pub trigger: bool,
    pub light_sensed: bool,
    pub aim_x: usize,
    pub aim_y: usize,
}

impl SystemControl for Zapper {
    fn reset(&mut self) {
        self.trigger = false;
        self.light_sensed = false;
        self.aim_x = 0;
        self.aim_y = 0;
    }
}

impl Zapper {
    pub fn new() -> Self {
        Self {
            trigger: false,
            light_sensed: false,
            aim_x: 0,
            aim_y: 0,
        }
    }

    pub fn set_state(&mut self, state: ZapperState) {
        self.trigger = state.trigger;
        self.aim_x = state.aim_x;
        self.aim_y = state.aim_y;
    }

    pub fn register_bits(&self) -> u8 {
        ((self.trigger as u8) << 4) | ((!self.light_sensed as u8) << 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_shift_out_a_first() {
        let mut joypad = Joypad::new();
        joypad.set_buttons(Buttons::A | Buttons::START);

        joypad.write_strobe(1);
        joypad.write_strobe(0);

        let bits: Vec<u8> = (0..8).map(|_| joypad.read()).collect();
        assert_eq!(bits, vec![1, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn reads_return_one_after_exhaustion() {
        let mut joypad = Joypad::new();
        joypad.set_buttons(Buttons::empty());

        joypad.write_strobe(1);
        joypad.write_strobe(0);

        for _ in 0..8 {
            assert_eq!(joypad.read(), 0);
        }
        assert_eq!(joypad.read(), 1);
        assert_eq!(joypad.read(), 1);
    }

    #[test]
    fn held_strobe_keeps_reporting_a() {
        let mut joypad = Joypad::new();
        joypad.set_buttons(Buttons::A);
        joypad.write_strobe(1);

        assert_eq!(joypad.read(), 1);
        assert_eq!(joypad.read(), 1);

        joypad.set_buttons(Buttons::empty());
        assert_eq!(joypad.read(), 0);
    }

    #[test]
    fn zapper_register_bits() {
        let mut zapper = Zapper::new();
        assert_eq!(zapper.register_bits(), 0b00001000);

        zapper.trigger = true;
        zapper.light_sensed = true;
        assert_eq!(zapper.register_bits(), 0b00010000);
    }
}
