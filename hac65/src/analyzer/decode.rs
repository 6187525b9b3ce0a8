//! The linear decoder (§4.2): walks a byte range one instruction at a time,
//! invoking a legal-instruction handler and an illegal-opcode handler.
//!
//! This is a free function rather than an `Analyzer` method so its two
//! handlers can mutate the analyzer's ledge sets (`lands`/`leaps`) without
//! fighting the borrow checker over a `&self` receiver mid-walk — the
//! assembly bytes are read from a caller-supplied slice instead.

use crate::common::{Address, Instruction, Octet, Opcode};
use crate::instructions::{self, AddressMode};

/// CPU-reserved NMI vector; decoding never crosses into `[NMI_VECTOR, 0xFFFF]`.
pub use crate::common::NMI_VECTOR;

/// Walk `[start_address, end_address]` of `assembly` (anchored at `origin`),
/// decoding one instruction at a time.
///
/// `legal` is invoked for every legal instruction; returning `true` halts the
/// walk (a control-flow terminator). `illegal` is invoked for every byte that
/// doesn't decode. Returns the number of illegal bytes encountered, and the
/// address one past the last byte the walk consumed -- whether it stopped
/// because `legal` requested a halt, it ran past `end_address`, or it hit the
/// reserved NMI vector region.
pub fn decode_instructions(
	origin: Address,
	assembly: &[Octet],
	start_address: Address,
	end_address: Address,
	mut legal: impl FnMut(Address, Instruction) -> bool,
	mut illegal: impl FnMut(Address, Opcode),
) -> (u32, Address) {
	let mut illegal_count = 0u32;
	let mut position = start_address.wrapping_sub(origin);
	let end_position = end_address.wrapping_sub(origin);

	loop {
		if position > end_position {
			break;
		}
		let address = origin.wrapping_add(position);
		if address >= NMI_VECTOR {
			break;
		}
		let Some(&opcode) = assembly.get(position as usize) else {
			break;
		};

		match instructions::opcodes::lookup(opcode) {
			None => {
				illegal(address, opcode);
				illegal_count += 1;
				position = position.wrapping_add(1);
			}
			Some(opcode_info) => {
				let size = instructions::addressing::operand_size(opcode_info.address_mode);
				let operand = match size {
					0 => 0,
					1 => u16::from(assembly.get(position as usize + 1).copied().unwrap_or(0)),
					2 => {
						let lo = u16::from(assembly.get(position as usize + 1).copied().unwrap_or(0));
						let hi = u16::from(assembly.get(position as usize + 2).copied().unwrap_or(0));
						lo | (hi << 8)
					}
					_ => unreachable!("addressing modes only ever take 0, 1, or 2 operand octets"),
				};
				let instruction = Instruction { opcode, opcode_info, operand };
				let halt = legal(address, instruction);
				position = position.wrapping_add(1 + u16::from(size));
				if halt {
					break;
				}
			}
		}
	}

	(illegal_count, origin.wrapping_add(position))
}

/// Sign-extend a `Relative` operand and compute the branch target following
/// an instruction of `address_mode` that started at `address`.
#[must_use]
pub fn branch_target(address: Address, address_mode: AddressMode, operand: u16) -> Address {
	let size = instructions::addressing::operand_size(address_mode);
	let offset = operand as u8 as i8;
	address.wrapping_add(u16::from(size)).wrapping_add(1).wrapping_add(offset as i16 as u16)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::common::Mnemonic;

	#[test]
	fn halts_at_the_nmi_vector_boundary() {
		let assembly = vec![0xea; 0x10];
		let mut count = 0;
		decode_instructions(0xFFF0, &assembly, 0xFFF0, 0xFFFF, |_, _| { count += 1; false }, |_, _| {});
		assert_eq!(count, 10); // 0xFFF0..=0xFFF9, then 0xFFFA halts
	}

	#[test]
	fn illegal_opcode_advances_by_one_octet() {
		let assembly = vec![0x02, 0xea];
		let mut illegals = Vec::new();
		let mut legals = Vec::new();
		decode_instructions(
			0,
			&assembly,
			0,
			1,
			|addr, instr| {
				legals.push((addr, instr.opcode_info.mnemonic));
				false
			},
			|addr, op| illegals.push((addr, op)),
		);
		assert_eq!(illegals, vec![(0, 0x02)]);
		assert_eq!(legals, vec![(1, Mnemonic::Nop)]);
	}

	#[test]
	fn legal_handler_returning_true_halts_the_walk() {
		let assembly = vec![0x60, 0xea, 0xea];
		let mut count = 0;
		decode_instructions(0, &assembly, 0, 2, |_, _| { count += 1; true }, |_, _| {});
		assert_eq!(count, 1);
	}

	#[test]
	fn branch_target_sign_extends_a_negative_offset() {
		// BNE at $1000 with operand 0xFE (-2): next = 0x1002, target = 0x1000.
		assert_eq!(branch_target(0x1000, AddressMode::Relative, 0xFE), 0x1000);
	}

	#[test]
	fn branch_target_handles_a_forward_offset() {
		assert_eq!(branch_target(0x1000, AddressMode::Relative, 0x02), 0x1004);
	}
}
