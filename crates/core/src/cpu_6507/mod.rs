//! Cycle-accurate MOS 6507 CPU core.
//!
//! The 6507 is a 6502 die in a 28-pin package: only 13 address lines are
//! bonded out and there are no IRQ/NMI pins. The core itself still drives a
//! full 16-bit address; the system bus is responsible for discarding the
//! upper bits.
//!
//! Unlike an instruction-stepped interpreter, every call to [`Cpu6507::tick`]
//! performs exactly one bus cycle. Cycle 0 of every instruction is the opcode
//! fetch; the addressing mode then fetches operands one byte per cycle and the
//! operation runs on the final cycle. This lets a host interleave other chips
//! (and stall the CPU, e.g. for WSYNC) at cycle granularity.
//!
//! Decimal mode is not emulated: the D flag can be set and cleared but ADC and
//! SBC always use binary arithmetic.

mod table;


pub use table::{build_dispatch_table, dispatch_table, AddressingMode, Instruction, Operation};

use crate::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};

pub const FLAG_C: u8 = 0x01;
pub const FLAG_Z: u8 = 0x02;
pub const FLAG_I: u8 = 0x04;
pub const FLAG_D: u8 = 0x08;
pub const FLAG_B: u8 = 0x10;
pub const FLAG_U: u8 = 0x20;
pub const FLAG_V: u8 = 0x40;
pub const FLAG_N: u8 = 0x80;

pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;
const STACK_BASE: u16 = 0x0100;

/// Bus interface seen by the CPU.
pub trait Memory6507 {
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, val: u8);
}

/// Result of a single bus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// The current instruction needs more cycles.
    InProgress,
    /// An instruction finished on this cycle.
    Completed { opcode: u8 },
    /// An opcode without a documented meaning finished on this cycle.
    /// It behaved as a two-cycle, one-byte NOP.
    Illegal { opcode: u8, address: u16 },
}

impl TickStatus {
    pub fn is_complete(&self) -> bool {
        !matches!(self, TickStatus::InProgress)
    }
}

/// Outcome of one cycle of an instruction.
enum Step {
    Continue,
    /// Finish and continue at the byte after the last one consumed.
    Done,
    /// Finish and continue at the given address.
    Jump(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
    Modify,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu6507 {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub status: u8,
    /// Address of the byte most recently consumed while an instruction is in
    /// flight; address of the next opcode between instructions.
    pub pc: u16,
    pub address_bus: u16,
    pub data_bus: u8,
    /// Total bus cycles executed since reset.
    pub cycles: u64,

    opcode: Option<u8>,
    opcode_address: u16,
    cycle: u8,

    // Per-instruction scratch latches.
    lo: u8,
    hi: u8,
    pointer: u8,
    operand: u8,
    effective: Option<u16>,
    access_cycle: u8,
}

impl Default for Cpu6507 {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn word(lo: u8, hi: u8) -> u16 {
    u16::from_le_bytes([lo, hi])
}

impl Cpu6507 {
    /// A CPU with every register cleared. Call [`reset`](Self::reset) to load
    /// the program counter from the reset vector.
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0,
            status: 0,
            pc: 0,
            address_bus: 0,
            data_bus: 0,
            cycles: 0,
            opcode: None,
            opcode_address: 0,
            cycle: 0,
            lo: 0,
            hi: 0,
            pointer: 0,
            operand: 0,
            effective: None,
            access_cycle: 0,
        }
    }

    /// Clear all registers and load PC from the reset vector.
    ///
    /// The high byte (0xFFFD) is read before the low byte (0xFFFC).
    pub fn reset<M: Memory6507>(&mut self, bus: &mut M) {
        *self = Self::new();
        let hi = self.read(bus, RESET_VECTOR.wrapping_add(1));
        let lo = self.read(bus, RESET_VECTOR);
        self.pc = word(lo, hi);
        self.address_bus = self.pc;
    }

    /// Clear all registers and start executing at `pc` without touching the
    /// bus. Used to run short synthetic programs.
    pub fn reset_to(&mut self, pc: u16) {
        *self = Self::new();
        self.pc = pc;
        self.address_bus = pc;
    }

    /// Opcode currently executing, if any.
    pub fn opcode(&self) -> Option<u8> {
        self.opcode
    }

    /// Cycle index within the current instruction (0 between instructions).
    pub fn cycle(&self) -> u8 {
        self.cycle
    }

    pub fn flag(&self, flag: u8) -> bool {
        self.status & flag != 0
    }

    /// Run one bus cycle.
    pub fn tick<M: Memory6507>(&mut self, bus: &mut M) -> TickStatus {
        self.cycles += 1;

        let opcode = match self.opcode {
            Some(op) => op,
            None => {
                let op = self.read(bus, self.pc);
                self.opcode = Some(op);
                self.opcode_address = self.pc;
                self.cycle = 0;
                op
            }
        };

        let instruction = dispatch_table()[opcode as usize];
        let next = match self.execute(instruction, bus) {
            Step::Continue => {
                self.cycle += 1;
                return TickStatus::InProgress;
            }
            Step::Done => self.pc.wrapping_add(1),
            Step::Jump(target) => target,
        };
        self.complete(next);

        if instruction.is_illegal() {
            TickStatus::Illegal {
                opcode,
                address: self.opcode_address,
            }
        } else {
            TickStatus::Completed { opcode }
        }
    }

    /// Tick until the current (or next) instruction completes.
    /// Returns the number of cycles it took.
    pub fn step<M: Memory6507>(&mut self, bus: &mut M) -> u32 {
        let mut ticks = 1;
        while !self.tick(bus).is_complete() {
            ticks += 1;
        }
        ticks
    }

    fn complete(&mut self, next: u16) {
        self.pc = next;
        self.address_bus = next;
        self.opcode = None;
        self.cycle = 0;
        self.effective = None;
    }

    fn read<M: Memory6507>(&mut self, bus: &M, addr: u16) -> u8 {
        self.address_bus = addr;
        self.data_bus = bus.read(addr);
        self.data_bus
    }

    fn write<M: Memory6507>(&mut self, bus: &mut M, addr: u16, val: u8) {
        self.address_bus = addr;
        self.data_bus = val;
        bus.write(addr, val);
    }

    /// Advance PC and read the operand byte it now points at.
    fn fetch<M: Memory6507>(&mut self, bus: &M) -> u8 {
        self.pc = self.pc.wrapping_add(1);
        self.read(bus, self.pc)
    }

    /// Bus cycle whose result the CPU throws away.
    fn dummy_read<M: Memory6507>(&mut self, bus: &M, addr: u16) {
        self.read(bus, addr);
    }

    fn push<M: Memory6507>(&mut self, bus: &mut M, val: u8) {
        self.write(bus, STACK_BASE | self.sp as u16, val);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull<M: Memory6507>(&mut self, bus: &M) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.read(bus, STACK_BASE | self.sp as u16)
    }

    fn set_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    fn set_zero_and_negative(&mut self, val: u8) {
        self.set_flag(FLAG_Z, val == 0);
        self.set_flag(FLAG_N, val & 0x80 != 0);
    }

    fn execute<M: Memory6507>(&mut self, instruction: Instruction, bus: &mut M) -> Step {
        use Operation::*;

        // Cycle 0 is the opcode fetch, already done by tick().
        if self.cycle == 0 {
            return Step::Continue;
        }

        let op = instruction.operation;
        match op {
            Lda | Ldx | Ldy | Adc | Sbc | And | Ora | Eor | Cmp | Cpx | Cpy | Bit => {
                self.read_instruction(op, instruction.mode, bus)
            }
            Sta | Stx | Sty => self.write_instruction(op, instruction.mode, bus),
            Asl | Lsr | Rol | Ror if instruction.mode == AddressingMode::Accumulator => {
                self.dummy_read(bus, self.pc.wrapping_add(1));
                self.a = self.modify(op, self.a);
                Step::Done
            }
            Asl | Lsr | Rol | Ror | Inc | Dec => {
                self.modify_instruction(op, instruction.mode, bus)
            }
            Bpl => self.branch(!self.flag(FLAG_N), bus),
            Bmi => self.branch(self.flag(FLAG_N), bus),
            Bvc => self.branch(!self.flag(FLAG_V), bus),
            Bvs => self.branch(self.flag(FLAG_V), bus),
            Bcc => self.branch(!self.flag(FLAG_C), bus),
            Bcs => self.branch(self.flag(FLAG_C), bus),
            Bne => self.branch(!self.flag(FLAG_Z), bus),
            Beq => self.branch(self.flag(FLAG_Z), bus),
            Jmp => self.jmp(instruction.mode, bus),
            Jsr => self.jsr(bus),
            Rts => self.rts(bus),
            Rti => self.rti(bus),
            Brk => self.brk(bus),
            Pha | Php => self.push_instruction(op, bus),
            Pla | Plp => self.pull_instruction(op, bus),
            Illegal => {
                log(LogCategory::CPU, LogLevel::Warn, || {
                    format!(
                        "CPU: illegal opcode {:02X} at {:04X}, treated as NOP",
                        self.opcode.unwrap_or_default(),
                        self.opcode_address
                    )
                });
                Step::Done
            }
            _ => {
                self.dummy_read(bus, self.pc.wrapping_add(1));
                self.implied(op);
                Step::Done
            }
        }
    }

    /// Addressing-mode state machine shared by every memory-operand
    /// instruction. Returns the effective address on the cycle where the
    /// operand access itself happens, `None` on the cycles before it.
    fn resolve<M: Memory6507>(
        &mut self,
        mode: AddressingMode,
        access: Access,
        bus: &M,
    ) -> Option<u16> {
        use AddressingMode::*;

        let cycle = self.cycle;
        match mode {
            Immediate => {
                self.pc = self.pc.wrapping_add(1);
                Some(self.pc)
            }
            ZeroPage => match cycle {
                1 => {
                    self.lo = self.fetch(bus);
                    None
                }
                _ => Some(self.lo as u16),
            },
            ZeroPageX | ZeroPageY => {
                let index = if mode == ZeroPageX { self.x } else { self.y };
                match cycle {
                    1 => {
                        self.lo = self.fetch(bus);
                        None
                    }
                    2 => {
                        self.dummy_read(bus, self.lo as u16);
                        None
                    }
                    _ => Some(self.lo.wrapping_add(index) as u16),
                }
            }
            Absolute => match cycle {
                1 => {
                    self.lo = self.fetch(bus);
                    None
                }
                2 => {
                    self.hi = self.fetch(bus);
                    None
                }
                _ => Some(word(self.lo, self.hi)),
            },
            AbsoluteX | AbsoluteY => {
                let index = if mode == AbsoluteX { self.x } else { self.y };
                match cycle {
                    1 => {
                        self.lo = self.fetch(bus);
                        None
                    }
                    2 => {
                        self.hi = self.fetch(bus);
                        None
                    }
                    3 => self.indexed_access(index, access, bus),
                    _ => Some(word(self.lo, self.hi).wrapping_add(index as u16)),
                }
            }
            IndirectX => match cycle {
                1 => {
                    self.pointer = self.fetch(bus);
                    None
                }
                2 => {
                    self.dummy_read(bus, self.pointer as u16);
                    self.pointer = self.pointer.wrapping_add(self.x);
                    None
                }
                3 => {
                    self.lo = self.read(bus, self.pointer as u16);
                    None
                }
                4 => {
                    self.hi = self.read(bus, self.pointer.wrapping_add(1) as u16);
                    None
                }
                _ => Some(word(self.lo, self.hi)),
            },
            IndirectY => match cycle {
                1 => {
                    self.pointer = self.fetch(bus);
                    None
                }
                2 => {
                    self.lo = self.read(bus, self.pointer as u16);
                    None
                }
                3 => {
                    self.hi = self.read(bus, self.pointer.wrapping_add(1) as u16);
                    None
                }
                4 => self.indexed_access(self.y, access, bus),
                _ => Some(word(self.lo, self.hi).wrapping_add(self.y as u16)),
            },
            Accumulator | Implied | Relative | Indirect => {
                debug_assert!(false, "{mode:?} has no memory operand");
                Some(self.pc)
            }
        }
    }

    /// Index-add cycle of the absolute-indexed and indirect-indexed modes.
    /// Reads complete here unless the low byte carried into the high byte;
    /// writes and read-modify-writes always take the fix-up cycle.
    fn indexed_access<M: Memory6507>(&mut self, index: u8, access: Access, bus: &M) -> Option<u16> {
        let (low, crossed) = self.lo.overflowing_add(index);
        let partial = word(low, self.hi);
        if crossed || access != Access::Read {
            self.dummy_read(bus, partial);
            None
        } else {
            Some(partial)
        }
    }

    fn read_instruction<M: Memory6507>(
        &mut self,
        op: Operation,
        mode: AddressingMode,
        bus: &mut M,
    ) -> Step {
        match self.resolve(mode, Access::Read, bus) {
            None => Step::Continue,
            Some(addr) => {
                let value = self.read(bus, addr);
                self.alu(op, value);
                Step::Done
            }
        }
    }

    fn write_instruction<M: Memory6507>(
        &mut self,
        op: Operation,
        mode: AddressingMode,
        bus: &mut M,
    ) -> Step {
        match self.resolve(mode, Access::Write, bus) {
            None => Step::Continue,
            Some(addr) => {
                let value = match op {
                    Operation::Stx => self.x,
                    Operation::Sty => self.y,
                    _ => self.a,
                };
                self.write(bus, addr, value);
                Step::Done
            }
        }
    }

    /// Read, write back the unmodified value, then write the result.
    fn modify_instruction<M: Memory6507>(
        &mut self,
        op: Operation,
        mode: AddressingMode,
        bus: &mut M,
    ) -> Step {
        let Some(addr) = self.effective else {
            return match self.resolve(mode, Access::Modify, bus) {
                None => Step::Continue,
                Some(addr) => {
                    self.operand = self.read(bus, addr);
                    self.effective = Some(addr);
                    self.access_cycle = self.cycle;
                    Step::Continue
                }
            };
        };

        if self.cycle - self.access_cycle == 1 {
            self.write(bus, addr, self.operand);
            Step::Continue
        } else {
            let result = self.modify(op, self.operand);
            self.write(bus, addr, result);
            Step::Done
        }
    }

    fn branch<M: Memory6507>(&mut self, taken: bool, bus: &M) -> Step {
        let next = self.pc.wrapping_add(1);
        let target = next.wrapping_add(self.lo as i8 as u16);
        match self.cycle {
            1 => {
                self.lo = self.fetch(bus);
                if taken {
                    Step::Continue
                } else {
                    Step::Done
                }
            }
            2 => {
                self.dummy_read(bus, next);
                if target & 0xFF00 == next & 0xFF00 {
                    Step::Jump(target)
                } else {
                    Step::Continue
                }
            }
            _ => {
                self.dummy_read(bus, (next & 0xFF00) | (target & 0x00FF));
                Step::Jump(target)
            }
        }
    }

    fn jmp<M: Memory6507>(&mut self, mode: AddressingMode, bus: &M) -> Step {
        match (mode, self.cycle) {
            (_, 1) => {
                self.lo = self.fetch(bus);
                Step::Continue
            }
            (AddressingMode::Absolute, _) => {
                self.hi = self.fetch(bus);
                Step::Jump(word(self.lo, self.hi))
            }
            (_, 2) => {
                self.hi = self.fetch(bus);
                Step::Continue
            }
            (_, 3) => {
                self.operand = self.read(bus, word(self.lo, self.hi));
                Step::Continue
            }
            _ => {
                // The pointer's high byte never carries: JMP ($10FF) reads $1000.
                let hi = self.read(bus, word(self.lo.wrapping_add(1), self.hi));
                Step::Jump(word(self.operand, hi))
            }
        }
    }

    fn jsr<M: Memory6507>(&mut self, bus: &mut M) -> Step {
        let ret = self.pc.wrapping_add(1);
        match self.cycle {
            1 => {
                self.lo = self.fetch(bus);
                Step::Continue
            }
            2 => {
                self.dummy_read(bus, STACK_BASE | self.sp as u16);
                Step::Continue
            }
            3 => {
                self.push(bus, (ret >> 8) as u8);
                Step::Continue
            }
            4 => {
                self.push(bus, ret as u8);
                Step::Continue
            }
            _ => {
                self.hi = self.fetch(bus);
                Step::Jump(word(self.lo, self.hi))
            }
        }
    }

    fn rts<M: Memory6507>(&mut self, bus: &mut M) -> Step {
        match self.cycle {
            1 => {
                self.dummy_read(bus, self.pc.wrapping_add(1));
                Step::Continue
            }
            2 => {
                self.dummy_read(bus, STACK_BASE | self.sp as u16);
                Step::Continue
            }
            3 => {
                self.lo = self.pull(bus);
                Step::Continue
            }
            4 => {
                self.hi = self.pull(bus);
                Step::Continue
            }
            _ => {
                let ret = word(self.lo, self.hi);
                self.dummy_read(bus, ret);
                Step::Jump(ret.wrapping_add(1))
            }
        }
    }

    fn rti<M: Memory6507>(&mut self, bus: &mut M) -> Step {
        match self.cycle {
            1 => {
                self.dummy_read(bus, self.pc.wrapping_add(1));
                Step::Continue
            }
            2 => {
                self.dummy_read(bus, STACK_BASE | self.sp as u16);
                Step::Continue
            }
            3 => {
                let p = self.pull(bus);
                self.status = p & !(FLAG_B | FLAG_U);
                Step::Continue
            }
            4 => {
                self.lo = self.pull(bus);
                Step::Continue
            }
            _ => {
                self.hi = self.pull(bus);
                Step::Jump(word(self.lo, self.hi))
            }
        }
    }

    /// BRK skips a padding byte, pushes PC and P, and jumps through 0xFFFE.
    fn brk<M: Memory6507>(&mut self, bus: &mut M) -> Step {
        match self.cycle {
            1 => {
                self.fetch(bus);
                Step::Continue
            }
            2 => {
                let ret = self.pc.wrapping_add(1);
                self.push(bus, (ret >> 8) as u8);
                Step::Continue
            }
            3 => {
                let ret = self.pc.wrapping_add(1);
                self.push(bus, ret as u8);
                Step::Continue
            }
            4 => {
                self.push(bus, self.status | FLAG_B | FLAG_U);
                self.set_flag(FLAG_I, true);
                Step::Continue
            }
            5 => {
                self.lo = self.read(bus, IRQ_VECTOR);
                Step::Continue
            }
            _ => {
                self.hi = self.read(bus, IRQ_VECTOR.wrapping_add(1));
                Step::Jump(word(self.lo, self.hi))
            }
        }
    }

    fn push_instruction<M: Memory6507>(&mut self, op: Operation, bus: &mut M) -> Step {
        if self.cycle == 1 {
            self.dummy_read(bus, self.pc.wrapping_add(1));
            return Step::Continue;
        }
        let value = if op == Operation::Php {
            self.status | FLAG_B | FLAG_U
        } else {
            self.a
        };
        self.push(bus, value);
        Step::Done
    }

    fn pull_instruction<M: Memory6507>(&mut self, op: Operation, bus: &mut M) -> Step {
        match self.cycle {
            1 => {
                self.dummy_read(bus, self.pc.wrapping_add(1));
                Step::Continue
            }
            2 => {
                self.dummy_read(bus, STACK_BASE | self.sp as u16);
                Step::Continue
            }
            _ => {
                let value = self.pull(bus);
                if op == Operation::Plp {
                    self.status = value & !(FLAG_B | FLAG_U);
                } else {
                    self.a = value;
                    self.set_zero_and_negative(value);
                }
                Step::Done
            }
        }
    }

    fn alu(&mut self, op: Operation, value: u8) {
        match op {
            Operation::Lda => {
                self.a = value;
                self.set_zero_and_negative(value);
            }
            Operation::Ldx => {
                self.x = value;
                self.set_zero_and_negative(value);
            }
            Operation::Ldy => {
                self.y = value;
                self.set_zero_and_negative(value);
            }
            Operation::Adc => self.add_with_carry(value),
            // Binary subtraction is addition of the ones' complement.
            Operation::Sbc => self.add_with_carry(!value),
            Operation::And => {
                self.a &= value;
                self.set_zero_and_negative(self.a);
            }
            Operation::Ora => {
                self.a |= value;
                self.set_zero_and_negative(self.a);
            }
            Operation::Eor => {
                self.a ^= value;
                self.set_zero_and_negative(self.a);
            }
            Operation::Cmp => self.compare(self.a, value),
            Operation::Cpx => self.compare(self.x, value),
            Operation::Cpy => self.compare(self.y, value),
            Operation::Bit => {
                self.set_flag(FLAG_Z, self.a & value == 0);
                self.set_flag(FLAG_N, value & 0x80 != 0);
                self.set_flag(FLAG_V, value & 0x40 != 0);
            }
            _ => {}
        }
    }

    fn add_with_carry(&mut self, value: u8) {
        let carry = (self.status & FLAG_C) as u16;
        let sum = self.a as u16 + value as u16 + carry;
        let result = sum as u8;
        self.set_flag(FLAG_C, sum > 0xFF);
        self.set_flag(
            FLAG_V,
            (self.a ^ value) & 0x80 == 0 && (self.a ^ result) & 0x80 != 0,
        );
        self.a = result;
        self.set_zero_and_negative(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.set_flag(FLAG_C, register >= value);
        self.set_zero_and_negative(register.wrapping_sub(value));
    }

    fn modify(&mut self, op: Operation, value: u8) -> u8 {
        let carry_in = self.status & FLAG_C;
        let result = match op {
            Operation::Asl => {
                self.set_flag(FLAG_C, value & 0x80 != 0);
                value << 1
            }
            Operation::Lsr => {
                self.set_flag(FLAG_C, value & 0x01 != 0);
                value >> 1
            }
            Operation::Rol => {
                self.set_flag(FLAG_C, value & 0x80 != 0);
                (value << 1) | carry_in
            }
            Operation::Ror => {
                self.set_flag(FLAG_C, value & 0x01 != 0);
                (value >> 1) | (carry_in << 7)
            }
            Operation::Inc => value.wrapping_add(1),
            Operation::Dec => value.wrapping_sub(1),
            _ => value,
        };
        self.set_zero_and_negative(result);
        result
    }

    fn implied(&mut self, op: Operation) {
        match op {
            Operation::Clc => self.set_flag(FLAG_C, false),
            Operation::Sec => self.set_flag(FLAG_C, true),
            Operation::Cli => self.set_flag(FLAG_I, false),
            Operation::Sei => self.set_flag(FLAG_I, true),
            Operation::Clv => self.set_flag(FLAG_V, false),
            Operation::Cld => self.set_flag(FLAG_D, false),
            Operation::Sed => self.set_flag(FLAG_D, true),
            Operation::Tax => {
                self.x = self.a;
                self.set_zero_and_negative(self.x);
            }
            Operation::Tay => {
                self.y = self.a;
                self.set_zero_and_negative(self.y);
            }
            Operation::Txa => {
                self.a = self.x;
                self.set_zero_and_negative(self.a);
            }
            Operation::Tya => {
                self.a = self.y;
                self.set_zero_and_negative(self.a);
            }
            Operation::Tsx => {
                self.x = self.sp;
                self.set_zero_and_negative(self.x);
            }
            Operation::Txs => self.sp = self.x,
            Operation::Inx => {
                self.x = self.x.wrapping_add(1);
                self.set_zero_and_negative(self.x);
            }
            Operation::Iny => {
                self.y = self.y.wrapping_add(1);
                self.set_zero_and_negative(self.y);
            }
            Operation::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.set_zero_and_negative(self.x);
            }
            Operation::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.set_zero_and_negative(self.y);
            }
            _ => {}
        }
    }
}

/// Flat 64K memory for tests and benchmarks.
pub struct ArrayMemory {
    pub data: Box<[u8; 0x10000]>,
}

impl ArrayMemory {
    pub fn new() -> Self {
        Self {
            data: Box::new([0; 0x10000]),
        }
    }

    /// Copy `program` to `offset` and point the reset vector at it.
    pub fn load_program(&mut self, offset: u16, program: &[u8]) {
        let start = offset as usize;
        self.data[start..start + program.len()].copy_from_slice(program);
        let [lo, hi] = offset.to_le_bytes();
        self.data[RESET_VECTOR as usize] = lo;
        self.data[RESET_VECTOR as usize + 1] = hi;
    }
}

impl Default for ArrayMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory6507 for ArrayMemory {
    fn read(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, val: u8) {
        self.data[addr as usize] = val;
    }
}
