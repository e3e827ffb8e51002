//! Opcode dispatch table for the 6507.
//!
//! Each of the 256 opcode bytes maps to an (operation, addressing mode) pair.
//! The table starts out with every slot set to [`Operation::Illegal`] and the
//! documented instruction set is then filled in on top.

use std::sync::OnceLock;

/// Instruction semantics, one variant per documented mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    /// Stand-in for every opcode without a documented meaning.
    Illegal,
}

/// Operand fetch strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    Accumulator,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Immediate,
    Implied,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub operation: Operation,
    pub mode: AddressingMode,
}

impl Instruction {
    pub const ILLEGAL: Instruction = Instruction {
        operation: Operation::Illegal,
        mode: AddressingMode::Implied,
    };

    pub fn is_illegal(&self) -> bool {
        self.operation == Operation::Illegal
    }
}

/// Build a fresh dispatch table.
///
/// Most callers want [`dispatch_table`], which builds the table once and
/// shares it for the rest of the process.
pub fn build_dispatch_table() -> [Instruction; 256] {
    use AddressingMode::*;
    use Operation::*;

    let mut table = [Instruction::ILLEGAL; 256];
    let mut set = |opcode: u8, operation: Operation, mode: AddressingMode| {
        table[opcode as usize] = Instruction { operation, mode };
    };

    // ALU group: aaa bbb 01
    for (base, op) in [
        (0x01u8, Ora),
        (0x21, And),
        (0x41, Eor),
        (0x61, Adc),
        (0x81, Sta),
        (0xA1, Lda),
        (0xC1, Cmp),
        (0xE1, Sbc),
    ] {
        set(base, op, IndirectX);
        set(base + 0x04, op, ZeroPage);
        if op != Sta {
            set(base + 0x08, op, Immediate);
        }
        set(base + 0x0C, op, Absolute);
        set(base + 0x10, op, IndirectY);
        set(base + 0x14, op, ZeroPageX);
        set(base + 0x18, op, AbsoluteY);
        set(base + 0x1C, op, AbsoluteX);
    }

    // Shifts and rotates: aaa bbb 10
    for (base, op) in [(0x02u8, Asl), (0x22, Rol), (0x42, Lsr), (0x62, Ror)] {
        set(base + 0x04, op, ZeroPage);
        set(base + 0x08, op, Accumulator);
        set(base + 0x0C, op, Absolute);
        set(base + 0x14, op, ZeroPageX);
        set(base + 0x1C, op, AbsoluteX);
    }
    for (base, op) in [(0xC2u8, Dec), (0xE2, Inc)] {
        set(base + 0x04, op, ZeroPage);
        set(base + 0x0C, op, Absolute);
        set(base + 0x14, op, ZeroPageX);
        set(base + 0x1C, op, AbsoluteX);
    }

    set(0x86, Stx, ZeroPage);
    set(0x8E, Stx, Absolute);
    set(0x96, Stx, ZeroPageY);
    set(0xA2, Ldx, Immediate);
    set(0xA6, Ldx, ZeroPage);
    set(0xAE, Ldx, Absolute);
    set(0xB6, Ldx, ZeroPageY);
    set(0xBE, Ldx, AbsoluteY);

    set(0x84, Sty, ZeroPage);
    set(0x8C, Sty, Absolute);
    set(0x94, Sty, ZeroPageX);
    set(0xA0, Ldy, Immediate);
    set(0xA4, Ldy, ZeroPage);
    set(0xAC, Ldy, Absolute);
    set(0xB4, Ldy, ZeroPageX);
    set(0xBC, Ldy, AbsoluteX);

    set(0xC0, Cpy, Immediate);
    set(0xC4, Cpy, ZeroPage);
    set(0xCC, Cpy, Absolute);
    set(0xE0, Cpx, Immediate);
    set(0xE4, Cpx, ZeroPage);
    set(0xEC, Cpx, Absolute);
    set(0x24, Bit, ZeroPage);
    set(0x2C, Bit, Absolute);

    for (opcode, op) in [
        (0x10u8, Bpl),
        (0x30, Bmi),
        (0x50, Bvc),
        (0x70, Bvs),
        (0x90, Bcc),
        (0xB0, Bcs),
        (0xD0, Bne),
        (0xF0, Beq),
    ] {
        set(opcode, op, Relative);
    }

    set(0x00, Brk, Implied);
    set(0x20, Jsr, Absolute);
    set(0x40, Rti, Implied);
    set(0x60, Rts, Implied);
    set(0x4C, Jmp, Absolute);
    set(0x6C, Jmp, Indirect);

    for (opcode, op) in [
        (0x08u8, Php),
        (0x28, Plp),
        (0x48, Pha),
        (0x68, Pla),
        (0x18, Clc),
        (0x38, Sec),
        (0x58, Cli),
        (0x78, Sei),
        (0xB8, Clv),
        (0xD8, Cld),
        (0xF8, Sed),
        (0x88, Dey),
        (0xC8, Iny),
        (0xCA, Dex),
        (0xE8, Inx),
        (0x8A, Txa),
        (0x98, Tya),
        (0x9A, Txs),
        (0xA8, Tay),
        (0xAA, Tax),
        (0xBA, Tsx),
        (0xEA, Nop),
    ] {
        set(opcode, op, Implied);
    }

    table
}

/// The process-wide dispatch table, built on first use.
pub fn dispatch_table() -> &'static [Instruction; 256] {
    static TABLE: OnceLock<[Instruction; 256]> = OnceLock::new();
    TABLE.get_or_init(build_dispatch_table)
}
