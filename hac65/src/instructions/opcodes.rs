//! The 151-entry catalog mapping each legal 6502 opcode byte to its
//! mnemonic, addressing mode, and memory operation.

use crate::common::{AddressMode, MemoryOperation, Mnemonic, Opcode, OpcodeInfo};
use std::sync::OnceLock;

use AddressMode::{
	Absolute, AbsoluteX, AbsoluteY, Accumulator, Immediate, Implied, Indirect, IndirectX,
	IndirectY, Relative, ZeroPage, ZeroPageX, ZeroPageY,
};
use MemoryOperation::{Both, None as NoMemOp, Read, Write};
use Mnemonic::{
	Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc, Cld, Cli, Clv, Cmp, Cpx,
	Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla,
	Plp, Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
};

const ENTRIES: [(Opcode, Mnemonic, AddressMode, MemoryOperation); 151] = [
	(0x69, Adc, Immediate, Read),
	(0x65, Adc, ZeroPage, Read),
	(0x75, Adc, ZeroPageX, Read),
	(0x6d, Adc, Absolute, Read),
	(0x7d, Adc, AbsoluteX, Read),
	(0x79, Adc, AbsoluteY, Read),
	(0x61, Adc, IndirectX, Read),
	(0x71, Adc, IndirectY, Read),
	(0x29, And, Immediate, Read),
	(0x25, And, ZeroPage, Read),
	(0x35, And, ZeroPageX, Read),
	(0x2d, And, Absolute, Read),
	(0x3d, And, AbsoluteX, Read),
	(0x39, And, AbsoluteY, Read),
	(0x21, And, IndirectX, Read),
	(0x31, And, IndirectY, Read),
	(0x0a, Asl, Accumulator, NoMemOp),
	(0x06, Asl, ZeroPage, Both),
	(0x16, Asl, ZeroPageX, Both),
	(0x0e, Asl, Absolute, Both),
	(0x1e, Asl, AbsoluteX, Both),
	(0x90, Bcc, Relative, NoMemOp),
	(0xb0, Bcs, Relative, NoMemOp),
	(0xf0, Beq, Relative, NoMemOp),
	(0x24, Bit, ZeroPage, Read),
	(0x2c, Bit, Absolute, Read),
	(0x30, Bmi, Relative, NoMemOp),
	(0xd0, Bne, Relative, NoMemOp),
	(0x10, Bpl, Relative, NoMemOp),
	(0x00, Brk, Implied, NoMemOp),
	(0x50, Bvc, Relative, NoMemOp),
	(0x70, Bvs, Relative, NoMemOp),
	(0x18, Clc, Implied, NoMemOp),
	(0xd8, Cld, Implied, NoMemOp),
	(0x58, Cli, Implied, NoMemOp),
	(0xb8, Clv, Implied, NoMemOp),
	(0xc9, Cmp, Immediate, Read),
	(0xc5, Cmp, ZeroPage, Read),
	(0xd5, Cmp, ZeroPageX, Read),
	(0xcd, Cmp, Absolute, Read),
	(0xdd, Cmp, AbsoluteX, Read),
	(0xd9, Cmp, AbsoluteY, Read),
	(0xc1, Cmp, IndirectX, Read),
	(0xd1, Cmp, IndirectY, Read),
	(0xe0, Cpx, Immediate, Read),
	(0xe4, Cpx, ZeroPage, Read),
	(0xec, Cpx, Absolute, Read),
	(0xc0, Cpy, Immediate, Read),
	(0xc4, Cpy, ZeroPage, Read),
	(0xcc, Cpy, Absolute, Read),
	(0xc6, Dec, ZeroPage, Both),
	(0xd6, Dec, ZeroPageX, Both),
	(0xce, Dec, Absolute, Both),
	(0xde, Dec, AbsoluteX, Both),
	(0xca, Dex, Implied, NoMemOp),
	(0x88, Dey, Implied, NoMemOp),
	(0x49, Eor, Immediate, Read),
	(0x45, Eor, ZeroPage, Read),
	(0x55, Eor, ZeroPageX, Read),
	(0x4d, Eor, Absolute, Read),
	(0x5d, Eor, AbsoluteX, Read),
	(0x59, Eor, AbsoluteY, Read),
	(0x41, Eor, IndirectX, Read),
	(0x51, Eor, IndirectY, Read),
	(0xe6, Inc, ZeroPage, Both),
	(0xf6, Inc, ZeroPageX, Both),
	(0xee, Inc, Absolute, Both),
	(0xfe, Inc, AbsoluteX, Both),
	(0xe8, Inx, Implied, NoMemOp),
	(0xc8, Iny, Implied, NoMemOp),
	(0x4c, Jmp, Absolute, NoMemOp),
	(0x6c, Jmp, Indirect, NoMemOp),
	(0x20, Jsr, Absolute, NoMemOp),
	(0xa9, Lda, Immediate, Read),
	(0xa5, Lda, ZeroPage, Read),
	(0xb5, Lda, ZeroPageX, Read),
	(0xad, Lda, Absolute, Read),
	(0xbd, Lda, AbsoluteX, Read),
	(0xb9, Lda, AbsoluteY, Read),
	(0xa1, Lda, IndirectX, Read),
	(0xb1, Lda, IndirectY, Read),
	(0xa2, Ldx, Immediate, Read),
	(0xa6, Ldx, ZeroPage, Read),
	(0xb6, Ldx, ZeroPageY, Read),
	(0xae, Ldx, Absolute, Read),
	(0xbe, Ldx, AbsoluteY, Read),
	(0xa0, Ldy, Immediate, Read),
	(0xa4, Ldy, ZeroPage, Read),
	(0xb4, Ldy, ZeroPageX, Read),
	(0xac, Ldy, Absolute, Read),
	(0xbc, Ldy, AbsoluteX, Read),
	(0x4a, Lsr, Accumulator, NoMemOp),
	(0x46, Lsr, ZeroPage, Both),
	(0x56, Lsr, ZeroPageX, Both),
	(0x4e, Lsr, Absolute, Both),
	(0x5e, Lsr, AbsoluteX, Both),
	(0xea, Nop, Implied, NoMemOp),
	(0x09, Ora, Immediate, Read),
	(0x05, Ora, ZeroPage, Read),
	(0x15, Ora, ZeroPageX, Read),
	(0x0d, Ora, Absolute, Read),
	(0x1d, Ora, AbsoluteX, Read),
	(0x19, Ora, AbsoluteY, Read),
	(0x01, Ora, IndirectX, Read),
	(0x11, Ora, IndirectY, Read),
	(0x48, Pha, Implied, NoMemOp),
	(0x08, Php, Implied, NoMemOp),
	(0x68, Pla, Implied, NoMemOp),
	(0x28, Plp, Implied, NoMemOp),
	(0x2a, Rol, Accumulator, NoMemOp),
	(0x26, Rol, ZeroPage, Both),
	(0x36, Rol, ZeroPageX, Both),
	(0x2e, Rol, Absolute, Both),
	(0x3e, Rol, AbsoluteX, Both),
	(0x6a, Ror, Accumulator, NoMemOp),
	(0x66, Ror, ZeroPage, Both),
	(0x76, Ror, ZeroPageX, Both),
	(0x6e, Ror, Absolute, Both),
	(0x7e, Ror, AbsoluteX, Both),
	(0x40, Rti, Implied, NoMemOp),
	(0x60, Rts, Implied, NoMemOp),
	(0xe9, Sbc, Immediate, Read),
	(0xe5, Sbc, ZeroPage, Read),
	(0xf5, Sbc, ZeroPageX, Read),
	(0xed, Sbc, Absolute, Read),
	(0xfd, Sbc, AbsoluteX, Read),
	(0xf9, Sbc, AbsoluteY, Read),
	(0xe1, Sbc, IndirectX, Read),
	(0xf1, Sbc, IndirectY, Read),
	(0x38, Sec, Implied, NoMemOp),
	(0xf8, Sed, Implied, NoMemOp),
	(0x78, Sei, Implied, NoMemOp),
	(0x85, Sta, ZeroPage, Write),
	(0x95, Sta, ZeroPageX, Write),
	(0x8d, Sta, Absolute, Write),
	(0x9d, Sta, AbsoluteX, Write),
	(0x99, Sta, AbsoluteY, Write),
	(0x81, Sta, IndirectX, Write),
	(0x91, Sta, IndirectY, Write),
	(0x86, Stx, ZeroPage, Write),
	(0x96, Stx, ZeroPageY, Write),
	(0x8e, Stx, Absolute, Write),
	(0x84, Sty, ZeroPage, Write),
	(0x94, Sty, ZeroPageX, Write),
	(0x8c, Sty, Absolute, Write),
	(0xaa, Tax, Implied, NoMemOp),
	(0xa8, Tay, Implied, NoMemOp),
	(0xba, Tsx, Implied, NoMemOp),
	(0x8a, Txa, Implied, NoMemOp),
	(0x9a, Txs, Implied, NoMemOp),
	(0x98, Tya, Implied, NoMemOp),
];

fn build_opcode_table() -> [Option<OpcodeInfo>; 256] {
	let mut table = [None; 256];
	for (opcode, mnemonic, address_mode, memory_operation) in ENTRIES {
		table[opcode as usize] = Some(OpcodeInfo { mnemonic, address_mode, memory_operation });
	}
	table
}

fn opcode_table() -> &'static [Option<OpcodeInfo>; 256] {
	static TABLE: OnceLock<[Option<OpcodeInfo>; 256]> = OnceLock::new();
	TABLE.get_or_init(build_opcode_table)
}

/// Catalog entry for `opcode`, or `None` if it isn't one of the 151 legal
/// 6502 opcodes.
#[must_use]
pub fn lookup(opcode: Opcode) -> Option<OpcodeInfo> {
	opcode_table()[opcode as usize]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn jmp_absolute_matches_the_reserved_constant() {
		let info = lookup(crate::common::JMP_ABSOLUTE).expect("JMP absolute is legal");
		assert_eq!(info.mnemonic, Mnemonic::Jmp);
		assert_eq!(info.address_mode, AddressMode::Absolute);
	}

	#[test]
	fn table_has_exactly_151_legal_opcodes() {
		let count = (0u16..=255).filter(|&o| lookup(o as Opcode).is_some()).count();
		assert_eq!(count, 151);
	}

	#[test]
	fn brk_is_a_single_byte_implied_instruction() {
		let info = lookup(0x00).unwrap();
		assert_eq!(info.mnemonic, Mnemonic::Brk);
		assert_eq!(info.address_mode, AddressMode::Implied);
	}

	#[test]
	fn read_modify_write_opcodes_report_both() {
		let info = lookup(0xee).unwrap(); // INC absolute
		assert_eq!(info.memory_operation, MemoryOperation::Both);
	}

	#[test]
	fn store_opcodes_never_overlap_with_load_opcodes() {
		assert!(lookup(0x85).unwrap().mnemonic == Mnemonic::Sta);
		assert!(lookup(0xa5).unwrap().mnemonic == Mnemonic::Lda);
	}
}
