//! Core 6502 vocabulary shared across the analyzer, instruction tables, and
//! reporting: addresses, opcodes, mnemonics, address modes, and segments.

use std::fmt;

/// An 8-bit byte of the object image.
pub type Octet = u8;

/// A 16-bit location in the 6502 address space.
pub type Address = u16;

/// A single instruction opcode byte.
pub type Opcode = Octet;

/// A decoded operand, widened to 16 bits regardless of its encoded size.
pub type Operand = u16;

/// The 56 official 6502 mnemonics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mnemonic {
	Adc,
	And,
	Asl,
	Bcc,
	Bcs,
	Beq,
	Bne,
	Bmi,
	Bpl,
	Bvc,
	Bvs,
	Bit,
	Brk,
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
}

impl Mnemonic {
	/// Three-letter mnemonic text, as it appears in a disassembly listing.
	#[must_use]
	pub fn text(self) -> &'static str {
		match self {
			Self::Adc => "ADC",
			Self::And => "AND",
			Self::Asl => "ASL",
			Self::Bcc => "BCC",
			Self::Bcs => "BCS",
			Self::Beq => "BEQ",
			Self::Bne => "BNE",
			Self::Bmi => "BMI",
			Self::Bpl => "BPL",
			Self::Bvc => "BVC",
			Self::Bvs => "BVS",
			Self::Bit => "BIT",
			Self::Brk => "BRK",
			Self::Clc => "CLC",
			Self::Cld => "CLD",
			Self::Cli => "CLI",
			Self::Clv => "CLV",
			Self::Cmp => "CMP",
			Self::Cpx => "CPX",
			Self::Cpy => "CPY",
			Self::Dec => "DEC",
			Self::Dex => "DEX",
			Self::Dey => "DEY",
			Self::Eor => "EOR",
			Self::Inc => "INC",
			Self::Inx => "INX",
			Self::Iny => "INY",
			Self::Jmp => "JMP",
			Self::Jsr => "JSR",
			Self::Lda => "LDA",
			Self::Ldx => "LDX",
			Self::Ldy => "LDY",
			Self::Lsr => "LSR",
			Self::Nop => "NOP",
			Self::Ora => "ORA",
			Self::Pha => "PHA",
			Self::Php => "PHP",
			Self::Pla => "PLA",
			Self::Plp => "PLP",
			Self::Rol => "ROL",
			Self::Ror => "ROR",
			Self::Rti => "RTI",
			Self::Rts => "RTS",
			Self::Sbc => "SBC",
			Self::Sec => "SEC",
			Self::Sed => "SED",
			Self::Sei => "SEI",
			Self::Sta => "STA",
			Self::Stx => "STX",
			Self::Sty => "STY",
			Self::Tax => "TAX",
			Self::Tay => "TAY",
			Self::Tsx => "TSX",
			Self::Txa => "TXA",
			Self::Txs => "TXS",
			Self::Tya => "TYA",
		}
	}
}

impl fmt::Display for Mnemonic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.text())
	}
}

/// The 13 6502 addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressMode {
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

/// Rendering and decoding metadata for one addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressModeInfo {
	/// Number of operand octets following the opcode: 0, 1, or 2.
	pub operand_size: u8,
	/// Text printed before the operand (e.g. `"#"`, `"("`).
	pub operand_prefix: &'static str,
	/// Text printed after the operand (e.g. `",X"`, `"),Y"`).
	pub operand_suffix: &'static str,
}

/// Whether an instruction reads, writes, both, or neither touches memory
/// through its operand (beyond the opcode fetch itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOperation {
	None,
	Read,
	Write,
	Both,
}

/// Opcode of `JMP` absolute; vector-table ledge seeding asserts on it.
pub const JMP_ABSOLUTE: Opcode = 0x4c;

/// Static catalog entry for one of the 151 legal opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
	pub mnemonic: Mnemonic,
	pub address_mode: AddressMode,
	pub memory_operation: MemoryOperation,
}

/// A fully decoded instruction: its opcode byte, catalog entry, and operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
	pub opcode: Opcode,
	pub opcode_info: OpcodeInfo,
	pub operand: Operand,
}

/// The classification of a contiguous address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SegmentType {
	/// Data-classified region promoted because it decodes cleanly and
	/// borders code.
	CodeDark,
	/// Code discovered by following branches/jumps/calls from a known land.
	CodeInferred,
	/// Code reached directly from a declared land or vector table.
	CodeKnown,
	/// Data region whose boundary was not declared but inferred from a gap.
	DataInferred,
	/// Data region whose boundary is a declared vector table or labeled gap.
	DataKnown,
}

impl SegmentType {
	#[must_use]
	pub fn is_code(self) -> bool {
		!self.is_data()
	}

	#[must_use]
	pub fn is_data(self) -> bool {
		matches!(self, Self::DataInferred | Self::DataKnown)
	}
}

/// A contiguous, maximal address range of uniform classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
	pub segment_type: SegmentType,
	pub start_address: Address,
	pub end_address: Address,
	pub ordinal: usize,
}

impl Segment {
	#[must_use]
	pub fn is_code(&self) -> bool {
		self.segment_type.is_code()
	}

	#[must_use]
	pub fn is_data(&self) -> bool {
		self.segment_type.is_data()
	}
}

/// CPU-reserved NMI vector address; the region `[NMI_VECTOR, 0xFFFF]` is
/// never decoded as instructions.
pub const NMI_VECTOR: Address = 0xFFFA;

/// CPU-reserved RESET vector address.
pub const RESET_VECTOR: Address = 0xFFFC;

/// CPU-reserved IRQ/BRK vector address.
pub const IRQ_VECTOR: Address = 0xFFFE;
