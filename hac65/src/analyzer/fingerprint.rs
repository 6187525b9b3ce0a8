//! Per-segment MD5 fingerprints (§4.8): a canonicalized byte stream for code
//! (operands blanked so equal code at different addresses hashes equally)
//! and the raw byte range for data.

use super::decode::decode_instructions;
use crate::common::{AddressMode, Octet, Segment};

/// MD5 digest, rendered as the lowercase hex text the report prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
	#[must_use]
	pub fn to_hex(self) -> String {
		self.0.iter().map(|b| format!("{b:02x}")).collect()
	}

	/// MD5 over an arbitrary byte slice, used for the whole-object checksum
	/// the report header prints.
	#[must_use]
	pub fn of_bytes(bytes: &[u8]) -> Self {
		Self(*md5::compute(bytes))
	}
}

impl std::fmt::Display for Fingerprint {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.to_hex())
	}
}

/// MD5 over a canonicalized instruction stream: opcode followed by a
/// fixed-width run of zeroed operand octets, except Immediate/Relative whose
/// operand low byte is preserved (it encodes a value, not an address).
#[must_use]
pub fn fingerprint_code_segment(origin: crate::common::Address, assembly: &[Octet], segment: &Segment) -> Fingerprint {
	let mut filtered = Vec::new();
	decode_instructions(
		origin,
		assembly,
		segment.start_address,
		segment.end_address,
		|_address, instruction| {
			filtered.push(instruction.opcode);
			match instruction.opcode_info.address_mode {
				AddressMode::Accumulator | AddressMode::Implied => {}
				AddressMode::IndirectX
				| AddressMode::IndirectY
				| AddressMode::ZeroPage
				| AddressMode::ZeroPageX
				| AddressMode::ZeroPageY => filtered.push(0),
				AddressMode::Absolute | AddressMode::AbsoluteX | AddressMode::AbsoluteY | AddressMode::Indirect => {
					filtered.push(0);
					filtered.push(0);
				}
				AddressMode::Immediate | AddressMode::Relative => {
					filtered.push((instruction.operand & 0xFF) as Octet);
				}
			}
			false
		},
		|_, _| {},
	);
	Fingerprint(*md5::compute(&filtered))
}

/// MD5 over the raw bytes `[segment.start, segment.end]`.
#[must_use]
pub fn fingerprint_data_segment(origin: crate::common::Address, assembly: &[Octet], segment: &Segment) -> Fingerprint {
	let start = (segment.start_address - origin) as usize;
	let end = (segment.end_address - origin) as usize;
	Fingerprint(*md5::compute(&assembly[start..=end]))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::common::SegmentType;

	#[test]
	fn code_fingerprint_ignores_absolute_operand_value() {
		let a = vec![0x4c, 0x00, 0x10]; // JMP $1000
		let b = vec![0x4c, 0x34, 0x12]; // JMP $1234
		let segment = Segment { segment_type: SegmentType::CodeKnown, start_address: 0, end_address: 2, ordinal: 0 };
		assert_eq!(fingerprint_code_segment(0, &a, &segment), fingerprint_code_segment(0, &b, &segment));
	}

	#[test]
	fn code_fingerprint_distinguishes_immediate_operand_value() {
		let a = vec![0xa9, 0x01]; // LDA #$01
		let b = vec![0xa9, 0x02]; // LDA #$02
		let segment = Segment { segment_type: SegmentType::CodeKnown, start_address: 0, end_address: 1, ordinal: 0 };
		assert_ne!(fingerprint_code_segment(0, &a, &segment), fingerprint_code_segment(0, &b, &segment));
	}

	#[test]
	fn code_fingerprint_is_independent_of_origin() {
		let bytes = vec![0xa9, 0x01, 0x60]; // LDA #$01; RTS
		let at_origin_0 = Segment { segment_type: SegmentType::CodeKnown, start_address: 0, end_address: 2, ordinal: 0 };
		let at_origin_1000 =
			Segment { segment_type: SegmentType::CodeKnown, start_address: 0x1000, end_address: 0x1002, ordinal: 0 };
		assert_eq!(
			fingerprint_code_segment(0, &bytes, &at_origin_0),
			fingerprint_code_segment(0x1000, &bytes, &at_origin_1000)
		);
	}

	#[test]
	fn data_fingerprint_is_the_raw_byte_range() {
		let bytes = vec![0xde, 0xad, 0xbe, 0xef];
		let segment = Segment { segment_type: SegmentType::DataInferred, start_address: 0, end_address: 3, ordinal: 0 };
		assert_eq!(fingerprint_data_segment(0, &bytes, &segment).to_hex().len(), 32);
	}
}
