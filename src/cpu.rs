mod opcode;

use crate::bus::SystemBus;
use crate::error::CpuError;

use self::opcode::{AddrMode, Instr, OPCODES_LOOKUP};

const STACK_START: u16 = 0x100;
const STACK_END: u16 = 0x1FF;

const NMI_VECTOR: u16 = 0xFFFA;
const RESET_VECTOR: u16 = 0xFFFC;
const IRQ_VECTOR: u16 = 0xFFFE;

bitflags! {
    struct StatusFlag: u8 {
        const C = 0b00000001;
        const Z = 0b00000010;
        const I = 0b00000100;
        const D = 0b00001000;
        const B = 0b00010000;
        const U = 0b00100000;
        const V = 0b01000000;
        const N = 0b10000000;
    }
}

pub struct Cpu6502 {
    accumulator: u8,
    x_index_reg: u8,
    y_index_reg: u8,
    program_counter: u16,
    stack_pointer: u8,
    processor_status: u8,

    addr_mode: AddrMode,
    operand_addr: u16,
    operand_data: u8,
    page_crossed: bool,

    cycles: u32,
    total_cycles: u64,
}

impl Cpu6502 {
    pub fn new() -> Self {
        Self {
            accumulator: 0,
            x_index_reg: 0,
            y_index_reg: 0,
            program_counter: 0,
            stack_pointer: 0xFD,
            processor_status: 0,

            addr_mode: AddrMode::IMP,
            operand_addr: 0,
            operand_data: 0,
            page_crossed: false,

            cycles: 0,
            total_cycles: 0,
        }
    }

    /// Runs one clock tick; a new instruction begins whenever the previous
    /// one has used up its cycles.
    pub fn clock(&mut self, bus: &mut SystemBus) -> Result<(), CpuError> {
        if self.cycles == 0 {
            self.cycles = self.step(bus)?;
        }

        self.cycles -= 1;
        self.total_cycles += 1;

        Ok(())
    }

    /// Fetches, decodes and executes a single instruction, returning the
    /// cycles it took including any page-cross or branch penalty.
    pub fn step(&mut self, bus: &mut SystemBus) -> Result<u32, CpuError> {
        let pc = self.program_counter;
        let opcode = self.advance_pc(bus);

        let op = OPCODES_LOOKUP[opcode as usize].ok_or(CpuError::InvalidOpcode {
            opcode,
            pc: pc as usize,
        })?;

        self.resolve_addressing(bus, op.addr_mode);

        Ok(op.cycles + self.execute(bus, op.instr))
    }

    pub fn reset(&mut self, bus: &mut SystemBus) {
        self.accumulator = 0x00;
        self.x_index_reg = 0x00;
        self.y_index_reg = 0x00;
        self.stack_pointer = 0xFD;
        self.processor_status = 0x24;

        let lo = self.read_byte(bus, RESET_VECTOR) as u16;
        let hi = self.read_byte(bus, RESET_VECTOR + 1) as u16;
        self.program_counter = (hi << 8) | lo;

        self.cycles = 7;
        self.total_cycles = 7;
        self.addr_mode = AddrMode::IMP;
        self.operand_addr = 0x0000;
        self.operand_data = 0x00;
        self.page_crossed = false;
    }

    pub fn irq(&mut self, bus: &mut SystemBus) {
        if self.get_flag(StatusFlag::I) {
            return;
        }

        self.trigger_interrupt(bus, IRQ_VECTOR, false);

        self.cycles += 7;
    }

    pub fn nmi(&mut self, bus: &mut SystemBus) {
        self.trigger_interrupt(bus, NMI_VECTOR, false);

        self.cycles += 7;
    }

    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    fn trigger_interrupt(&mut self, bus: &mut SystemBus, vector_addr: u16, brk_caused: bool) {
        if brk_caused {
            self.processor_status |= StatusFlag::B.bits();
        } else {
            self.processor_status |= StatusFlag::U.bits();
        }

        self.push_word_to_stack(bus, self.program_counter);
        self.push_byte_to_stack(bus, self.processor_status);

        self.processor_status |= StatusFlag::I.bits();
        self.processor_status &= !StatusFlag::B.bits();

        let lo = self.read_byte(bus, vector_addr) as u16;
        let hi = self.read_byte(bus, vector_addr + 1) as u16;
        self.program_counter = (hi << 8) | lo;
    }

    fn resolve_addressing(&mut self, bus: &mut SystemBus, addr_mode: AddrMode) {
        match addr_mode {
            AddrMode::IMP => self.imp_addressing(),
            AddrMode::ACC => self.acc_addressing(),
            AddrMode::IMM => self.imm_addressing(bus),
            AddrMode::ZPG => self.zpg_addressing(bus),
            AddrMode::ZPX => self.zpx_addressing(bus),
            AddrMode::ZPY => self.zpy_addressing(bus),
            AddrMode::REL => self.rel_addressing(bus),
            AddrMode::ABS => self.abs_addressing(bus),
            AddrMode::ABX => self.abx_addressing(bus),
            AddrMode::ABY => self.aby_addressing(bus),
            AddrMode::IND => self.ind_addressing(bus),
            AddrMode::INX => self.inx_addressing(bus),
            AddrMode::INY => self.iny_addressing(bus),
            AddrMode::JAB => self.jab_addressing(bus),
        }
    }

    fn execute(&mut self, bus: &mut SystemBus, instr: Instr) -> u32 {
        match instr {
            Instr::ADC => self.add_with_carry(bus),
            Instr::AND => self.and_accumulator(bus),
            Instr::ASL => self.arithmetic_shift_left(bus),
            Instr::BCC => self.branch_if_cond(!self.get_flag(StatusFlag::C)),
            Instr::BCS => self.branch_if_cond(self.get_flag(StatusFlag::C)),
            Instr::BEQ => self.branch_if_cond(self.get_flag(StatusFlag::Z)),
            Instr::BIT => self.bit_test(bus),
            Instr::BMI => self.branch_if_cond(self.get_flag(StatusFlag::N)),
            Instr::BNE => self.branch_if_cond(!self.get_flag(StatusFlag::Z)),
            Instr::BPL => self.branch_if_cond(!self.get_flag(StatusFlag::N)),
            Instr::BRK => self.force_interrupt(bus),
            Instr::BVC => self.branch_if_cond(!self.get_flag(StatusFlag::V)),
            Instr::BVS => self.branch_if_cond(self.get_flag(StatusFlag::V)),
            Instr::CLC => self.set_flag_op(StatusFlag::C, false),
            Instr::CLD => self.set_flag_op(StatusFlag::D, false),
            Instr::CLI => self.set_flag_op(StatusFlag::I, false),
            Instr::CLV => self.set_flag_op(StatusFlag::V, false),
            Instr::CMP => self.compare_accumulator(bus),
            Instr::CPX => self.compare_x_reg(bus),
            Instr::CPY => self.compare_y_reg(bus),
            Instr::DEC => self.decrement_memory(bus),
            Instr::DEX => self.decrement_x_reg(),
            Instr::DEY => self.decrement_y_reg(),
            Instr::EOR => self.exclusive_or_accumulator(bus),
            Instr::INC => self.increment_memory(bus),
            Instr::INX => self.increment_x_reg(),
            Instr::INY => self.increment_y_reg(),
            Instr::JMP => self.jump(),
            Instr::JSR => self.jump_to_subroutine(bus),
            Instr::LDA => self.load_accumulator(bus),
            Instr::LDX => self.load_x_reg(bus),
            Instr::LDY => self.load_y_reg(bus),
            Instr::LSR => self.logical_shift_right(bus),
            Instr::NOP => self.page_crossed as u32,
            Instr::ORA => self.or_accumulator(bus),
            Instr::PHA => self.push_accumulator(bus),
            Instr::PHP => self.push_processor_status(bus),
            Instr::PLA => self.pull_accumulator(bus),
            Instr::PLP => self.pull_processor_status(bus),
            Instr::ROL => self.rotate_left(bus),
            Instr::ROR => self.rotate_right(bus),
            Instr::RTI => self.return_from_interrupt(bus),
            Instr::RTS => self.return_from_subroutine(bus),
            Instr::SBC => self.subtract_with_carry(bus),
            Instr::SEC => self.set_flag_op(StatusFlag::C, true),
            Instr::SED => self.set_flag_op(StatusFlag::D, true),
            Instr::SEI => self.set_flag_op(StatusFlag::I, true),
            Instr::STA => self.store_accumulator(bus),
            Instr::STX => self.store_x_reg(bus),
            Instr::STY => self.store_y_reg(bus),
            Instr::TAX => self.transfer_accumulator_to_x(),
            Instr::TAY => self.transfer_accumulator_to_y(),
            Instr::TSX => self.transfer_stack_pointer_to_x(),
            Instr::TXA => self.transfer_x_to_accumulator(),
            Instr::TXS => self.transfer_x_to_stack_pointer(),
            Instr::TYA => self.transfer_y_to_accumulator(),
        }
    }

    fn add_with_carry(&mut self, bus: &mut SystemBus) -> u32 {
        let op1 = self.accumulator;
        let op2 = self.read_operand(bus);
        let carry = self.get_flag(StatusFlag::C) as u16;

        let sum = op1 as u16 + op2 as u16 + carry;
        let signed_sum = (op1 as i8) as i16 + (op2 as i8) as i16 + carry as i16;
        self.accumulator = sum as u8;

        self.set_flag(StatusFlag::C, sum > 0xFF);
        self.set_flag(StatusFlag::V, !(-128..=127).contains(&signed_sum));
        self.set_z_and_n_flag(self.accumulator);

        self.page_crossed as u32
    }

    fn subtract_with_carry(&mut self, bus: &mut SystemBus) -> u32 {
        let op1 = self.accumulator;
        let op2 = self.read_operand(bus);
        let borrow = !self.get_flag(StatusFlag::C) as i16;

        let diff = op1 as i16 - op2 as i16 - borrow;
        let signed_diff = (op1 as i8) as i16 - (op2 as i8) as i16 - borrow;
        self.accumulator = diff as u8;

        self.set_flag(StatusFlag::C, diff >= 0);
        self.set_flag(StatusFlag::V, !(-128..=127).contains(&signed_diff));
        self.set_z_and_n_flag(self.accumulator);

        self.page_crossed as u32
    }

    fn and_accumulator(&mut self, bus: &mut SystemBus) -> u32 {
        self.accumulator &= self.read_operand(bus);

        self.set_z_and_n_flag(self.accumulator);

        self.page_crossed as u32
    }

    fn or_accumulator(&mut self, bus: &mut SystemBus) -> u32 {
        self.accumulator |= self.read_operand(bus);

        self.set_z_and_n_flag(self.accumulator);

        self.page_crossed as u32
    }

    fn exclusive_or_accumulator(&mut self, bus: &mut SystemBus) -> u32 {
        self.accumulator ^= self.read_operand(bus);

        self.set_z_and_n_flag(self.accumulator);

        self.page_crossed as u32
    }

    fn arithmetic_shift_left(&mut self, bus: &mut SystemBus) -> u32 {
        let data = self.read_operand(bus);
        let result = data.wrapping_shl(1);
        self.write_operand(bus, result);

        self.set_flag(StatusFlag::C, data & 0b10000000 != 0);
        self.set_z_and_n_flag(result);

        0
    }

    fn logical_shift_right(&mut self, bus: &mut SystemBus) -> u32 {
        let data = self.read_operand(bus);
        let result = data.wrapping_shr(1);
        self.write_operand(bus, result);

        self.set_flag(StatusFlag::C, data & 0b00000001 != 0);
        self.set_z_and_n_flag(result);

        0
    }

    fn rotate_left(&mut self, bus: &mut SystemBus) -> u32 {
        let data = self.read_operand(bus);
        let result = data.wrapping_shl(1) | (self.get_flag(StatusFlag::C) as u8);
        self.write_operand(bus, result);

        self.set_flag(StatusFlag::C, data & 0b10000000 != 0);
        self.set_z_and_n_flag(result);

        0
    }

    fn rotate_right(&mut self, bus: &mut SystemBus) -> u32 {
        let data = self.read_operand(bus);
        let result = data.wrapping_shr(1) | ((self.get_flag(StatusFlag::C) as u8) << 7);
        self.write_operand(bus, result);

        self.set_flag(StatusFlag::C, data & 0b00000001 != 0);
        self.set_z_and_n_flag(result);

        0
    }

    fn bit_test(&mut self, bus: &mut SystemBus) -> u32 {
        let data = self.read_operand(bus);
        self.set_flag(StatusFlag::Z, self.accumulator & data == 0);
        self.set_flag(StatusFlag::V, data & 0b01000000 != 0);
        self.set_flag(StatusFlag::N, data & 0b10000000 != 0);

        0
    }

    fn branch_if_cond(&mut self, cond: bool) -> u32 {
        if cond {
            self.program_counter = self.operand_addr;

            1 + self.page_crossed as u32
        } else {
            0
        }
    }

    fn force_interrupt(&mut self, bus: &mut SystemBus) -> u32 {
        // padding byte after the opcode
        let _ = self.advance_pc(bus);

        self.trigger_interrupt(bus, IRQ_VECTOR, true);

        0
    }

    fn compare_accumulator(&mut self, bus: &mut SystemBus) -> u32 {
        self.compare_register(bus, self.accumulator);

        self.page_crossed as u32
    }

    fn compare_x_reg(&mut self, bus: &mut SystemBus) -> u32 {
        self.compare_register(bus, self.x_index_reg);

        0
    }

    fn compare_y_reg(&mut self, bus: &mut SystemBus) -> u32 {
        self.compare_register(bus, self.y_index_reg);

        0
    }

    fn compare_register(&mut self, bus: &mut SystemBus, register: u8) {
        let data = self.read_operand(bus);
        self.set_flag(StatusFlag::C, register >= data);
        self.set_flag(StatusFlag::Z, register == data);
        self.set_flag(StatusFlag::N, register.wrapping_sub(data) & 0b10000000 != 0);
    }

    fn decrement_memory(&mut self, bus: &mut SystemBus) -> u32 {
        let result = self.read_operand(bus).wrapping_sub(1);
        self.write_operand(bus, result);

        self.set_z_and_n_flag(result);

        0
    }

    fn increment_memory(&mut self, bus: &mut SystemBus) -> u32 {
        let result = self.read_operand(bus).wrapping_add(1);
        self.write_operand(bus, result);

        self.set_z_and_n_flag(result);

        0
    }

    fn decrement_x_reg(&mut self) -> u32 {
        self.x_index_reg = self.x_index_reg.wrapping_sub(1);

        self.set_z_and_n_flag(self.x_index_reg);

        0
    }

    fn decrement_y_reg(&mut self) -> u32 {
        self.y_index_reg = self.y_index_reg.wrapping_sub(1);

        self.set_z_and_n_flag(self.y_index_reg);

        0
    }

    fn increment_x_reg(&mut self) -> u32 {
        self.x_index_reg = self.x_index_reg.wrapping_add(1);

        self.set_z_and_n_flag(self.x_index_reg);

        0
    }

    fn increment_y_reg(&mut self) -> u32 {
        self.y_index_reg = self.y_index_reg.wrapping_add(1);

        self.set_z_and_n_flag(self.y_index_reg);

        0
    }

    fn jump(&mut self) -> u32 {
        self.program_counter = self.operand_addr;

        0
    }

    fn jump_to_subroutine(&mut self, bus: &mut SystemBus) -> u32 {
        self.push_word_to_stack(bus, self.program_counter.wrapping_sub(1));

        // edge case: upper byte of the new pc is read AFTER the stack push;
        // new pc can be altered by the push if the operand sits in the stack page
        self.program_counter =
            if matches!(self.program_counter.wrapping_sub(1), STACK_START..=STACK_END) {
                ((self.read_byte(bus, self.program_counter - 1) as u16) << 8)
                    | (self.operand_addr & 0x00FF)
            } else {
                self.operand_addr
            };

        0
    }

    fn return_from_subroutine(&mut self, bus: &mut SystemBus) -> u32 {
        self.program_counter = self.pop_word_from_stack(bus).wrapping_add(1);

        0
    }

    fn return_from_interrupt(&mut self, bus: &mut SystemBus) -> u32 {
        self.processor_status = self.pop_byte_from_stack(bus);
        self.processor_status &= !StatusFlag::B.bits();
        self.processor_status |= StatusFlag::U.bits();
        self.program_counter = self.pop_word_from_stack(bus);

        0
    }

    fn load_accumulator(&mut self, bus: &mut SystemBus) -> u32 {
        self.accumulator = self.read_operand(bus);

        self.set_z_and_n_flag(self.accumulator);

        self.page_crossed as u32
    }

    fn load_x_reg(&mut self, bus: &mut SystemBus) -> u32 {
        self.x_index_reg = self.read_operand(bus);

        self.set_z_and_n_flag(self.x_index_reg);

        self.page_crossed as u32
    }

    fn load_y_reg(&mut self, bus: &mut SystemBus) -> u32 {
        self.y_index_reg = self.read_operand(bus);

        self.set_z_and_n_flag(self.y_index_reg);

        self.page_crossed as u32
    }

    fn store_accumulator(&mut self, bus: &mut SystemBus) -> u32 {
        self.write_operand(bus, self.accumulator);

        0
    }

    fn store_x_reg(&mut self, bus: &mut SystemBus) -> u32 {
        self.write_operand(bus, self.x_index_reg);

        0
    }

    fn store_y_reg(&mut self, bus: &mut SystemBus) -> u32 {
        self.write_operand(bus, self.y_index_reg);

        0
    }

    fn push_accumulator(&mut self, bus: &mut SystemBus) -> u32 {
        self.push_byte_to_stack(bus, self.accumulator);

        0
    }

    fn push_processor_status(&mut self, bus: &mut SystemBus) -> u32 {
        self.push_byte_to_stack(
            bus,
            self.processor_status | StatusFlag::B.bits() | StatusFlag::U.bits(),
        );

        0
    }

    fn pull_accumulator(&mut self, bus: &mut SystemBus) -> u32 {
        self.accumulator = self.pop_byte_from_stack(bus);

        self.set_z_and_n_flag(self.accumulator);

        0
    }

    fn pull_processor_status(&mut self, bus: &mut SystemBus) -> u32 {
        self.processor_status = self.pop_byte_from_stack(bus);
        self.processor_status &= !StatusFlag::B.bits();
        self.processor_status |= StatusFlag::U.bits();

        0
    }

    fn transfer_accumulator_to_x(&mut self) -> u32 {
        self.x_index_reg = self.accumulator;

        self.set_z_and_n_flag(self.x_index_reg);

        0
    }

    fn transfer_accumulator_to_y(&mut self) -> u32 {
        self.y_index_reg = self.accumulator;

        self.set_z_and_n_flag(self.y_index_reg);

        0
    }

    fn transfer_stack_pointer_to_x(&mut self) -> u32 {
        self.x_index_reg = self.stack_pointer;

        self.set_z_and_n_flag(self.x_index_reg);

        0
    }

    fn transfer_x_to_accumulator(&mut self) -> u32 {
        self.accumulator = self.x_index_reg;

        self.set_z_and_n_flag(self.accumulator);

        0
    }

    fn transfer_x_to_stack_pointer(&mut self) -> u32 {
        self.stack_pointer = self.x_index_reg;

        0
    }

    fn transfer_y_to_accumulator(&mut self) -> u32 {
        self.accumulator = self.y_index_reg;

        self.set_z_and_n_flag(self.accumulator);

        0
    }

    fn set_flag_op(&mut self, flag: StatusFlag, val: bool) -> u32 {
        self.set_flag(flag, val);

        0
    }

    #[inline]
    fn imp_addressing(&mut self) {
        self.addr_mode = AddrMode::IMP;

        self.set_operand_data(0);
    }

    #[inline]
    fn acc_addressing(&mut self) {
        self.addr_mode = AddrMode::ACC;

        self.set_operand_data(self.accumulator);
    }

    #[inline]
    fn imm_addressing(&mut self, bus: &mut SystemBus) {
        self.addr_mode = AddrMode::IMM;
        let operand_data = self.advance_pc(bus);

        self.set_operand_data(operand_data);
    }

    #[inline]
    fn zpg_addressing(&mut self, bus: &mut SystemBus) {
        self.addr_mode = AddrMode::ZPG;
        let operand_addr = self.advance_pc(bus) as u16;

        self.set_operand_addr(operand_addr);
    }

    #[inline]
    fn zpx_addressing(&mut self, bus: &mut SystemBus) {
        self.addr_mode = AddrMode::ZPX;
        let operand_addr = self.advance_pc(bus).wrapping_add(self.x_index_reg) as u16;

        self.set_operand_addr(operand_addr);
    }

    #[inline]
    fn zpy_addressing(&mut self, bus: &mut SystemBus) {
        self.addr_mode = AddrMode::ZPY;
        let operand_addr = self.advance_pc(bus).wrapping_add(self.y_index_reg) as u16;

        self.set_operand_addr(operand_addr);
    }

    #[inline]
    fn rel_addressing(&mut self, bus: &mut SystemBus) {
        self.addr_mode = AddrMode::REL;
        let offset = (self.advance_pc(bus) as i8) as i32;

        self.set_operand_addr((self.program_counter as i32 + offset) as u16);
        self.page_crossed = (self.program_counter & 0xFF00) != (self.operand_addr & 0xFF00)
    }

    #[inline]
    fn abs_addressing(&mut self, bus: &mut SystemBus) {
        self.addr_mode = AddrMode::ABS;
        let abs_address = self.fetch_abs_address(bus);

        self.set_operand_addr(abs_address);
    }

    #[inline]
    fn abx_addressing(&mut self, bus: &mut SystemBus) {
        self.addr_mode = AddrMode::ABX;
        let addr = self.fetch_abs_address(bus);

        self.set_operand_addr(addr.wrapping_add(self.x_index_reg as u16));
        self.page_crossed = ((self.operand_addr ^ addr) & 0xFF00) != 0;
    }

    #[inline]
    fn aby_addressing(&mut self, bus: &mut SystemBus) {
        self.addr_mode = AddrMode::ABY;
        let addr = self.fetch_abs_address(bus);

        self.set_operand_addr(addr.wrapping_add(self.y_index_reg as u16));
        self.page_crossed = ((self.operand_addr ^ addr) & 0xFF00) != 0;
    }

    #[inline]
    fn ind_addressing(&mut self, bus: &mut SystemBus) {
        self.addr_mode = AddrMode::IND;
        let ptr = self.fetch_abs_address(bus);

        let lo = self.read_byte(bus, ptr) as u16;

        // a pointer ending in 0xFF wraps within its page instead of
        // carrying into the next one
        let hi = if ptr & 0xFF == 0xFF {
            self.read_byte(bus, ptr & 0xFF00)
        } else {
            self.read_byte(bus, ptr.wrapping_add(1))
        } as u16;

        self.set_operand_addr((hi << 8) | lo);
    }

    #[inline]
    fn inx_addressing(&mut self, bus: &mut SystemBus) {
        self.addr_mode = AddrMode::INX;
        let ptr = self.advance_pc(bus).wrapping_add(self.x_index_reg);

        let lo = self.read_byte(bus, ptr as u16) as u16;
        let hi = self.read_byte(bus, ptr.wrapping_add(1) as u16) as u16;

        self.set_operand_addr((hi << 8) | lo);
    }

    #[inline]
    fn iny_addressing(&mut self, bus: &mut SystemBus) {
        self.addr_mode = AddrMode::INY;
        let ptr = self.advance_pc(bus);

        let lo = self.read_byte(bus, ptr as u16) as u16;
        let hi = self.read_byte(bus, ptr.wrapping_add(1) as u16) as u16;

        let addr = (hi << 8) | lo;

        self.set_operand_addr(addr.wrapping_add(self.y_index_reg as u16));
        self.page_crossed = ((self.operand_addr ^ addr) & 0xFF00) != 0;
    }

    #[inline]
    fn jab_addressing(&mut self, bus: &mut SystemBus) {
        self.addr_mode = AddrMode::JAB;
        let target = self.fetch_abs_address(bus);

        self.set_operand_addr(target);
    }

    #[inline]
    fn write_operand(&mut self, bus: &mut SystemBus, byte: u8) {
        match self.addr_mode {
            AddrMode::ACC | AddrMode::IMP => self.accumulator = byte,
            _ => self.write_byte(bus, self.operand_addr, byte),
        }
    }

    #[inline]
    fn read_operand(&self, bus: &mut SystemBus) -> u8 {
        match self.addr_mode {
            AddrMode::IMP | AddrMode::JAB => {
                panic!("tried to read operand of a non-operand addressing mode")
            }
            AddrMode::ACC | AddrMode::IMM => self.operand_data,
            _ => self.read_byte(bus, self.operand_addr),
        }
    }

    #[inline]
    fn set_operand_addr(&mut self, operand_addr: u16) {
        self.operand_addr = operand_addr;
        self.page_crossed = false;
    }

    #[inline]
    fn set_operand_data(&mut self, operand_data: u8) {
        self.operand_data = operand_data;
        self.page_crossed = false;
    }

    #[inline]
    fn fetch_abs_address(&mut self, bus: &mut SystemBus) -> u16 {
        let lo = self.advance_pc(bus) as u16;
        let hi = self.advance_pc(bus) as u16;

        (hi << 8) | lo
    }

    #[inline]
    fn push_word_to_stack(&mut self, bus: &mut SystemBus, word: u16) {
        self.push_byte_to_stack(bus, ((word & 0xFF00) >> 8) as u8);
        self.push_byte_to_stack(bus, word as u8);
    }

    #[inline]
    fn pop_word_from_stack(&mut self, bus: &mut SystemBus) -> u16 {
        let lo = self.pop_byte_from_stack(bus) as u16;
        let hi = self.pop_byte_from_stack(bus) as u16;
        (hi << 8) | lo
    }

    #[inline]
    fn push_byte_to_stack(&mut self, bus: &mut SystemBus, byte: u8) {
        self.write_byte(bus, STACK_START | self.stack_pointer as u16, byte);
        self.stack_pointer = self.stack_pointer.wrapping_sub(1);
    }

    #[inline]
    fn pop_byte_from_stack(&mut self, bus: &mut SystemBus) -> u8 {
        self.stack_pointer = self.stack_pointer.wrapping_add(1);
        self.read_byte(bus, STACK_START | self.stack_pointer as u16)
    }

    #[inline]
    fn set_z_and_n_flag(&mut self, byte: u8) {
        self.set_flag(StatusFlag::Z, byte == 0);
        self.set_flag(StatusFlag::N, byte & 0b10000000 != 0);
    }

    #[inline]
    fn set_flag(&mut self, flag: StatusFlag, val: bool) {
        let mask = flag.bits();
        if val {
            self.processor_status |= mask;
        } else {
            self.processor_status &= !mask;
        }
    }

    #[inline]
    fn get_flag(&self, flag: StatusFlag) -> bool {
        (self.processor_status & flag.bits()) != 0
    }

    #[inline]
    fn advance_pc(&mut self, bus: &mut SystemBus) -> u8 {
        let ret = self.read_byte(bus, self.program_counter);
        self.program_counter = self.program_counter.wrapping_add(1);
        ret
    }

    fn read_byte(&self, bus: &mut SystemBus, addr: u16) -> u8 {
        bus.cpu_read(addr as usize).unwrap_or_default()
    }

    fn write_byte(&mut self, bus: &mut SystemBus, addr: u16, byte: u8) {
        bus.cpu_write(addr as usize, byte);
    }
}
