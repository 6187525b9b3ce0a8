//! 6502 instruction catalog: opcode table and addressing-mode metadata.

pub mod addressing;
pub mod opcodes;

pub use crate::common::{
	AddressMode, AddressModeInfo, Instruction, MemoryOperation, Mnemonic, Opcode, OpcodeInfo,
	Operand, JMP_ABSOLUTE,
};
