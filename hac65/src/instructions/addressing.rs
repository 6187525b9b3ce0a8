//! Static rendering metadata for the 13 6502 addressing modes.

use crate::common::{AddressMode, AddressModeInfo};
use std::sync::OnceLock;

fn build_address_mode_table() -> [(AddressMode, AddressModeInfo); 13] {
	[
		(AddressMode::Accumulator, AddressModeInfo { operand_size: 0, operand_prefix: "A", operand_suffix: "" }),
		(AddressMode::Absolute, AddressModeInfo { operand_size: 2, operand_prefix: "", operand_suffix: "" }),
		(AddressMode::AbsoluteX, AddressModeInfo { operand_size: 2, operand_prefix: "", operand_suffix: ",X" }),
		(AddressMode::AbsoluteY, AddressModeInfo { operand_size: 2, operand_prefix: "", operand_suffix: ",Y" }),
		(AddressMode::Immediate, AddressModeInfo { operand_size: 1, operand_prefix: "#", operand_suffix: "" }),
		(AddressMode::Implied, AddressModeInfo { operand_size: 0, operand_prefix: "", operand_suffix: "" }),
		(AddressMode::Indirect, AddressModeInfo { operand_size: 2, operand_prefix: "(", operand_suffix: ")" }),
		(AddressMode::IndirectX, AddressModeInfo { operand_size: 1, operand_prefix: "(", operand_suffix: ",X)" }),
		(AddressMode::IndirectY, AddressModeInfo { operand_size: 1, operand_prefix: "(", operand_suffix: "),Y" }),
		(AddressMode::Relative, AddressModeInfo { operand_size: 1, operand_prefix: "", operand_suffix: "" }),
		(AddressMode::ZeroPage, AddressModeInfo { operand_size: 1, operand_prefix: "", operand_suffix: "" }),
		(AddressMode::ZeroPageX, AddressModeInfo { operand_size: 1, operand_prefix: "", operand_suffix: ",X" }),
		(AddressMode::ZeroPageY, AddressModeInfo { operand_size: 1, operand_prefix: "", operand_suffix: ",Y" }),
	]
}

fn address_mode_table() -> &'static [(AddressMode, AddressModeInfo); 13] {
	static TABLE: OnceLock<[(AddressMode, AddressModeInfo); 13]> = OnceLock::new();
	TABLE.get_or_init(build_address_mode_table)
}

/// Rendering metadata for `mode`.
#[must_use]
pub fn address_mode_info(mode: AddressMode) -> AddressModeInfo {
	address_mode_table()
		.iter()
		.find(|(m, _)| *m == mode)
		.map(|(_, info)| *info)
		.expect("address_mode_table covers every AddressMode variant")
}

/// Number of operand octets following the opcode for `mode`: 0, 1, or 2.
#[must_use]
pub fn operand_size(mode: AddressMode) -> u8 {
	address_mode_info(mode).operand_size
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn immediate_is_one_operand_octet_with_hash_prefix() {
		let info = address_mode_info(AddressMode::Immediate);
		assert_eq!(info.operand_size, 1);
		assert_eq!(info.operand_prefix, "#");
	}

	#[test]
	fn indirect_y_suffix_has_comma_y_after_close_paren() {
		let info = address_mode_info(AddressMode::IndirectY);
		assert_eq!(info.operand_suffix, "),Y");
	}

	#[test]
	fn implied_and_accumulator_take_no_operand_bytes() {
		assert_eq!(operand_size(AddressMode::Implied), 0);
		assert_eq!(operand_size(AddressMode::Accumulator), 0);
	}
}
