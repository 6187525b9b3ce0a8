//! The inference engine: the fixed-point algorithm that discovers code from
//! a handful of known entry points, classifies every byte of the image,
//! groups bytes into segments, and fingerprints the result.
//!
//! [`Analyzer`] owns the whole of the analysis state. It is populated by
//! `declare_*` calls (from an overlay loader or a caller acting directly),
//! then consumed exactly once by [`Analyzer::analyze`].

pub mod decode;
pub mod fingerprint;
pub mod vectors;

use crate::common::{
	Address, AddressMode, Instruction, MemoryOperation, Mnemonic, Octet, Opcode, OpcodeInfo, Segment, SegmentType,
	NMI_VECTOR,
};
use crate::error::{Hac65Error, Hac65Result};
use crate::instructions;
use decode::decode_instructions;
use std::collections::{BTreeMap, BTreeSet};

pub use fingerprint::Fingerprint;
pub use vectors::{VectorTableKind, VectorTableMap};

/// Whether a land was reached from a declared entry point or inferred by
/// following control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandType {
	CodeKnown,
	CodeInferred,
}

impl From<LandType> for SegmentType {
	fn from(land_type: LandType) -> Self {
		match land_type {
			LandType::CodeKnown => Self::CodeKnown,
			LandType::CodeInferred => Self::CodeInferred,
		}
	}
}

/// An address known to begin an instruction.
///
/// Ordered, and compared for equality, by `address` alone, mirroring a
/// `std::set<Land>` whose comparator ignores the type: a land re-declared at
/// an already-known address with a different type is a no-op, the first
/// insertion wins.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Land {
	pub address: Address,
	pub land_type: LandType,
}

impl PartialEq for Land {
	fn eq(&self, other: &Self) -> bool {
		self.address == other.address
	}
}

impl Eq for Land {}

impl PartialOrd for Land {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Land {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.address.cmp(&other.address)
	}
}

/// Maximum assembly image size: the full 16-bit address space.
pub const MAX_ASSEMBLY_SIZE: usize = 0x1_0000;

/// One per run; created empty, populated by `declare_*` calls, then consumed
/// exactly once by [`Analyzer::analyze`].
#[derive(Debug, Default)]
pub struct Analyzer {
	assembly: Vec<Octet>,
	origin_address: Address,
	has_origin_address: bool,
	end_address: Address,
	is_illuminating: bool,

	pub(crate) lands: BTreeSet<Land>,
	pub(crate) leaps: BTreeSet<Address>,
	segments: BTreeMap<Address, Segment>,
	instructions: BTreeMap<Address, Instruction>,
	illegals: BTreeMap<Address, Opcode>,
	data: BTreeMap<Address, Octet>,

	code_labels: BTreeMap<Address, String>,
	data_labels: BTreeMap<Address, Vec<String>>,
	equates: BTreeMap<u16, Vec<String>>,

	pub(crate) vector_tables: VectorTableMap,
	pub(crate) all_vector_addresses: BTreeSet<Address>,
}

impl Analyzer {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	// --- declarations (inputs) ------------------------------------------

	pub fn set_assembly(&mut self, assembly: Vec<Octet>) {
		self.assembly = assembly;
	}

	pub fn declare_origin_address(&mut self, address: Address) {
		self.origin_address = address;
		self.has_origin_address = true;
	}

	#[must_use]
	pub fn has_origin_address(&self) -> bool {
		self.has_origin_address
	}

	pub fn set_illuminating_mode(&mut self) {
		self.is_illuminating = true;
	}

	pub fn declare_code_label(&mut self, label: impl Into<String>, address: Address) {
		self.code_labels.insert(address, label.into());
		self.add_land(address, LandType::CodeKnown);
	}

	pub fn declare_data_label(&mut self, label: impl Into<String>, address: Address) {
		self.data_labels.entry(address).or_default().push(label.into());
	}

	pub fn declare_equate(&mut self, equate: impl Into<String>, value: u16) {
		self.equates.entry(value).or_default().push(equate.into());
	}

	/// Expert hint: `address` begins an instruction. Returns whether it was
	/// newly added (it is silently dropped if below the origin).
	pub fn declare_land(&mut self, address: Address) -> bool {
		let before = self.lands.len();
		self.add_land(address, LandType::CodeKnown);
		self.lands.len() > before
	}

	/// Expert hint: `address` is one past a terminating instruction. Returns
	/// whether it was newly added.
	pub fn declare_leap(&mut self, address: Address) -> bool {
		let before = self.leaps.len();
		self.add_leap(address);
		self.leaps.len() > before
	}

	// --- accessors (outputs) ---------------------------------------------

	#[must_use]
	pub fn assembly(&self) -> &[Octet] {
		&self.assembly
	}

	#[must_use]
	pub fn origin_address(&self) -> Address {
		self.origin_address
	}

	#[must_use]
	pub fn end_address(&self) -> Address {
		self.end_address
	}

	#[must_use]
	pub fn segments(&self) -> &BTreeMap<Address, Segment> {
		&self.segments
	}

	#[must_use]
	pub fn instructions(&self) -> &BTreeMap<Address, Instruction> {
		&self.instructions
	}

	#[must_use]
	pub fn illegals(&self) -> &BTreeMap<Address, Opcode> {
		&self.illegals
	}

	#[must_use]
	pub fn data(&self) -> &BTreeMap<Address, Octet> {
		&self.data
	}

	/// Catalog entry for `opcode`, delegating to the static instruction table.
	#[must_use]
	pub fn lookup_opcode_info(&self, opcode: Opcode) -> Option<OpcodeInfo> {
		instructions::opcodes::lookup(opcode)
	}

	/// Rendering metadata for `address_mode`, delegating to the static table.
	#[must_use]
	pub fn lookup_address_mode_info(&self, address_mode: AddressMode) -> crate::common::AddressModeInfo {
		instructions::addressing::address_mode_info(address_mode)
	}

	/// Code labels are tried first unless a concrete read/write operation
	/// routes straight to data labels; a data label's trailing `<`/`>` marker
	/// is matched against the requested operation, falling back to the first
	/// label registered at the address.
	#[must_use]
	pub fn lookup_label(&self, address: Address, memory_operation: Option<MemoryOperation>) -> Option<String> {
		let try_code_first =
			!matches!(memory_operation, Some(MemoryOperation::Read | MemoryOperation::Write | MemoryOperation::Both));
		if try_code_first {
			if let Some(label) = self.code_labels.get(&address) {
				return Some(label.clone());
			}
		}

		let labels = self.data_labels.get(&address)?;
		let mut first: Option<String> = None;
		for label in labels {
			let (name, marker) = match label.chars().last() {
				Some(c @ ('<' | '>')) => (&label[..label.len() - 1], Some(c)),
				_ => (label.as_str(), None),
			};
			if first.is_none() {
				first = Some(name.to_string());
			}
			let matches = matches!(
				(marker, memory_operation),
				(Some('<'), Some(MemoryOperation::Read | MemoryOperation::Both))
					| (Some('>'), Some(MemoryOperation::Write))
			);
			if matches {
				return Some(name.to_string());
			}
		}
		first
	}

	/// Every symbolic name registered for a 16-bit immediate value, in
	/// declaration order.
	#[must_use]
	pub fn lookup_equate(&self, value: u16) -> Vec<String> {
		self.equates.get(&value).cloned().unwrap_or_default()
	}

	// --- the pipeline ----------------------------------------------------

	/// Run the full pipeline. Single-use: consumes the declarations
	/// accumulated so far and populates `segments`, `instructions`,
	/// `illegals`, and `data`.
	pub fn analyze(&mut self) -> Hac65Result<()> {
		self.initialize()?;

		self.seed_ledges();
		log::debug!("fixed point: seeded {} lands, {} leaps", self.lands.len(), self.leaps.len());
		if self.infer_ledges_pass1() {
			self.infer_segments();
			let mut pass = 0u32;
			while self.infer_ledges_pass2() {
				pass += 1;
				log::debug!("fixed point: pass2 iteration {pass} grew lands to {}", self.lands.len());
				self.infer_segments();
			}
		} else {
			self.infer_segments();
		}
		log::debug!("fixed point converged: {} segments", self.segments.len());

		if self.segments.is_empty() {
			return Err(Hac65Error::Analysis(
				"no valid segments were discovered -- is the origin address set correctly? (see -o option)"
					.to_string(),
			));
		}

		self.extract_code();
		if self.is_illuminating {
			self.extract_dark_code();
		}
		self.extract_data();

		Ok(())
	}

	fn initialize(&mut self) -> Hac65Result<()> {
		if usize::from(self.origin_address) + self.assembly.len() > MAX_ASSEMBLY_SIZE {
			return Err(Hac65Error::Analysis(format!(
				"origin address (${:04X}) plus object size (${:04X}) exceeds the top of the address space -- is the origin address set correctly? (see -o option)",
				self.origin_address,
				self.assembly.len()
			)));
		}
		self.end_address = self.origin_address.wrapping_add(self.assembly.len() as u16).wrapping_sub(1);
		self.validate_vector_tables_in_bounds()
	}

	fn validate_vector_tables_in_bounds(&self) -> Hac65Result<()> {
		for (&kind, tables) in &self.vector_tables {
			let width = u32::from(kind.entry_width());
			for (&table_address, &count) in tables {
				let footprint = width * u32::from(count);
				if footprint == 0 {
					continue;
				}
				let last = u32::from(table_address) + footprint - 1;
				if table_address < self.origin_address || last > u32::from(self.end_address) {
					return Err(Hac65Error::Analysis(format!(
						"a declared vector table at ${table_address:04X} falls outside the loaded object -- is the origin address set correctly? (see -o option)"
					)));
				}
			}
		}
		Ok(())
	}

	fn add_segment(&mut self, address: Address, segment: Segment) {
		self.segments.insert(address, Segment { ordinal: self.segments.len(), ..segment });
	}

	// --- pass 1 and pass 2 -----------------------------------------------

	/// Returns `true` iff at least one new leap was discovered.
	///
	/// Walks lands in a worklist, not a one-time snapshot: a land reached
	/// from a JMP/JSR target discovered mid-walk still gets its own walk
	/// within this same call, so a forward reference isn't stranded until a
	/// later pass2 iteration that may never look at it (pass2 only walks
	/// already-known code segments, and a stranded land may sit inside a
	/// data segment it never forms a code segment for).
	fn infer_ledges_pass1(&mut self) -> bool {
		let before = self.leaps.len();
		let end_address = self.end_address;
		let assembly = self.assembly.clone();
		let origin = self.origin_address;
		let mut visited: BTreeSet<Address> = BTreeSet::new();
		loop {
			let pending: Vec<Address> =
				self.lands.iter().map(|l| l.address).filter(|a| !visited.contains(a)).collect();
			if pending.is_empty() {
				break;
			}
			for land in pending {
				visited.insert(land);
				let mut new_lands = Vec::new();
				let mut new_leaps = Vec::new();
				decode_instructions(
					origin,
					&assembly,
					land,
					end_address,
					|address, instruction| control_flow_handler(address, instruction, &mut new_lands, &mut new_leaps, true),
					|_, _| {},
				);
				for (address, land_type) in new_lands {
					log::trace!("pass1: land ${address:04X} ({land_type:?})");
					self.add_land(address, land_type);
				}
				for address in new_leaps {
					log::trace!("pass1: leap ${address:04X}");
					self.add_leap(address);
				}
			}
		}
		self.leaps.len() > before
	}

	/// Returns `true` iff at least one new land was discovered.
	///
	/// Unlike pass 1, the legal-handler never requests termination here:
	/// control continues past BRK/JMP/RTI/RTS because the enclosing code
	/// segment already bounds the walk. This intentionally differs from
	/// pass 1 -- keep it that way rather than unifying the two handlers.
	fn infer_ledges_pass2(&mut self) -> bool {
		let before = self.lands.len();
		let assembly = self.assembly.clone();
		let origin = self.origin_address;
		let code_segments: Vec<(Address, Address)> =
			self.segments.values().filter(|s| s.is_code()).map(|s| (s.start_address, s.end_address)).collect();
		for (start, end) in code_segments {
			let mut new_lands = Vec::new();
			let mut new_leaps = Vec::new();
			decode_instructions(
				origin,
				&assembly,
				start,
				end,
				|address, instruction| control_flow_handler(address, instruction, &mut new_lands, &mut new_leaps, false),
				|_, _| {},
			);
			for (address, land_type) in new_lands {
				log::trace!("pass2: land ${address:04X} ({land_type:?})");
				self.add_land(address, land_type);
			}
			for address in new_leaps {
				log::trace!("pass2: leap ${address:04X}");
				self.add_leap(address);
			}
		}
		self.lands.len() > before
	}

	// --- segment inference -------------------------------------------------

	fn infer_segments(&mut self) {
		self.segments.clear();
		log::trace!("segment discovery: {} lands, {} leaps on the table", self.lands.len(), self.leaps.len());

		let lands: Vec<Land> = self.lands.iter().copied().collect();
		let leaps: Vec<Address> = self.leaps.iter().copied().collect();
		let origin = self.origin_address;

		if !lands.is_empty() && !leaps.is_empty() {
			let mut land_idx = 0usize;
			let mut leap_idx = 0usize;
			let mut start = origin;
			let mut end = start;

			while start <= self.end_address && land_idx < lands.len() && leap_idx < leaps.len() {
				let mut segment_type;
				loop {
					segment_type = lands[land_idx].land_type;
					start = lands[land_idx].address;
					land_idx += 1;
					if !(start != origin && start <= end && land_idx < lands.len()) {
						break;
					}
				}
				loop {
					end = leaps[leap_idx];
					leap_idx += 1;
					if !(end < start && leap_idx < leaps.len()) {
						break;
					}
				}
				// `end` is a leap: one past the terminator it closes. The
				// segment itself is inclusive, so its recorded end is one
				// less -- a terminator sitting at the image's very last byte
				// produces a leap one past `end_address`, which must still
				// close a valid segment rather than getting dropped.
				let inclusive_end = end.wrapping_sub(1);
				if start <= inclusive_end && inclusive_end <= self.end_address {
					self.add_segment(
						start,
						Segment {
							segment_type: segment_type.into(),
							start_address: start,
							end_address: inclusive_end,
							ordinal: 0,
						},
					);
				}
			}
		}

		self.segment_declared_vector_tables();
		self.segment_gaps();
	}

	fn segment_declared_vector_tables(&mut self) {
		let tables: Vec<(Address, Address)> = self
			.vector_tables
			.iter()
			.filter(|(&kind, _)| kind != VectorTableKind::Jump)
			.flat_map(|(&kind, tables)| {
				let width = u32::from(kind.entry_width());
				tables.iter().map(move |(&address, &count)| {
					let footprint = (width * u32::from(count)).max(1);
					let end = (u32::from(address) + footprint - 1) as Address;
					(address, end)
				})
			})
			.collect();
		for (start, end) in tables {
			self.add_segment(
				start,
				Segment { segment_type: SegmentType::DataKnown, start_address: start, end_address: end, ordinal: 0 },
			);
		}
	}

	fn segment_gaps(&mut self) {
		let mut start = self.origin_address;
		let boundaries: Vec<(Address, Address)> =
			self.segments.values().map(|s| (s.start_address, s.end_address)).collect();
		for (segment_start, segment_end) in boundaries {
			if start < segment_start {
				let end = segment_start.wrapping_sub(1);
				let segment_type =
					if self.lookup_label(start, None).is_some() { SegmentType::DataKnown } else { SegmentType::DataInferred };
				self.add_segment(start, Segment { segment_type, start_address: start, end_address: end, ordinal: 0 });
			}
			start = segment_end.wrapping_add(1);
		}
		if start != 0 && start < self.end_address {
			self.add_segment(
				start,
				Segment {
					segment_type: SegmentType::DataInferred,
					start_address: start,
					end_address: self.end_address,
					ordinal: 0,
				},
			);
		}
	}

	// --- extraction and dark-code promotion -------------------------------

	fn extract_code(&mut self) {
		let assembly = self.assembly.clone();
		let origin = self.origin_address;
		let code_segments: Vec<(Address, Address)> =
			self.segments.values().filter(|s| s.is_code()).map(|s| (s.start_address, s.end_address)).collect();
		for (start, end) in code_segments {
			decode_instructions(
				origin,
				&assembly,
				start,
				end,
				|address, instruction| {
					self.instructions.insert(address, instruction);
					false
				},
				|address, opcode| {
					self.illegals.insert(address, opcode);
				},
			);
		}
	}

	fn extract_data(&mut self) {
		// A recorded illegal means its enclosing segment wasn't truly code;
		// demote it, then merge adjacent data segments of the same type.
		let illegal_addresses: Vec<Address> = self.illegals.keys().copied().collect();
		for illegal_address in illegal_addresses {
			let Some((&segment_address, &segment)) = self.segments.range(..=illegal_address).next_back() else {
				continue;
			};
			self.instructions.retain(|&a, _| !(a >= segment.start_address && a <= segment.end_address));
			if let Some(s) = self.segments.get_mut(&segment_address) {
				s.segment_type = SegmentType::DataInferred;
			}
		}

		let mut merged = BTreeMap::new();
		let mut iter = self.segments.values().copied().peekable();
		while let Some(mut segment) = iter.next() {
			if segment.is_data() {
				while let Some(next) = iter.peek() {
					if next.segment_type == segment.segment_type {
						segment.end_address = next.end_address;
						iter.next();
					} else {
						break;
					}
				}
			}
			merged.insert(segment.start_address, segment);
		}
		for (ordinal, segment) in merged.values_mut().enumerate() {
			segment.ordinal = ordinal;
		}
		self.segments = merged;

		let origin = self.origin_address;
		let assembly = self.assembly.clone();
		let data_ranges: Vec<(Address, Address)> =
			self.segments.values().filter(|s| s.is_data()).map(|s| (s.start_address, s.end_address)).collect();
		for (start, end) in data_ranges {
			let mut address = start;
			loop {
				let offset = address.wrapping_sub(origin) as usize;
				if let Some(&byte) = assembly.get(offset) {
					self.data.insert(address, byte);
				}
				if address == end {
					break;
				}
				address = address.wrapping_add(1);
			}
		}
	}

	/// Open question preserved as-is: the neighbour test treats the first and
	/// last segments as conservatively having a code neighbour on the side
	/// that doesn't exist, which can over-promote at the image's edges.
	fn extract_dark_code(&mut self) {
		let addresses: Vec<Address> = self.segments.keys().copied().collect();
		let origin = self.origin_address;
		let assembly = self.assembly.clone();

		for (index, &address) in addresses.iter().enumerate() {
			let segment = self.segments[&address];
			if segment.segment_type != SegmentType::DataInferred {
				continue;
			}

			let has_code_predecessor = if index == 0 { true } else { self.segments[&addresses[index - 1]].is_code() };
			let has_code_successor =
				if index + 1 == addresses.len() { true } else { self.segments[&addresses[index + 1]].is_code() };
			let long_enough = u32::from(segment.end_address) - u32::from(segment.start_address) > 1;
			let has_vectors = self.segment_has_vectors(&segment);

			if (has_code_predecessor || has_code_successor) && long_enough && !has_vectors {
				let (illegal_count, _) =
					decode_instructions(origin, &assembly, segment.start_address, segment.end_address, |_, _| false, |_, _| {});

				if illegal_count == 0 {
					if let Some(s) = self.segments.get_mut(&address) {
						s.segment_type = SegmentType::CodeDark;
					}
					decode_instructions(
						origin,
						&assembly,
						segment.start_address,
						segment.end_address,
						|addr, instruction| {
							self.instructions.insert(addr, instruction);
							false
						},
						|addr, opcode| {
							self.illegals.insert(addr, opcode);
						},
					);
				}
			}
		}
	}

	fn segment_has_vectors(&self, segment: &Segment) -> bool {
		self.all_vector_addresses.range(segment.start_address..=segment.end_address).next().is_some()
	}

	// --- fingerprinting ----------------------------------------------------

	#[must_use]
	pub fn fingerprint_code_segment(&self, segment: &Segment) -> Fingerprint {
		fingerprint::fingerprint_code_segment(self.origin_address, &self.assembly, segment)
	}

	#[must_use]
	pub fn fingerprint_data_segment(&self, segment: &Segment) -> Fingerprint {
		fingerprint::fingerprint_data_segment(self.origin_address, &self.assembly, segment)
	}

	// --- reads used while seeding vector tables (vectors.rs) --------------

	pub(crate) fn read_byte(&self, address: Address) -> Option<Octet> {
		let offset = address.checked_sub(self.origin_address)?;
		self.assembly.get(offset as usize).copied()
	}

	pub(crate) fn read_word(&self, address: Address) -> Option<u16> {
		let lo = self.read_byte(address)?;
		let hi = self.read_byte(address.wrapping_add(1))?;
		Some(u16::from(lo) | (u16::from(hi) << 8))
	}
}

/// Shared control-flow interpretation for pass 1 and pass 2: branches/JSR add
/// a land, BRK/JMP/RTI/RTS add a leap. `terminates` selects whether the
/// handler requests a walk-halt (pass 1) or not (pass 2).
fn control_flow_handler(
	address: Address,
	instruction: Instruction,
	new_lands: &mut Vec<(Address, LandType)>,
	new_leaps: &mut Vec<Address>,
	terminates: bool,
) -> bool {
	let address_mode = instruction.opcode_info.address_mode;
	let size = u16::from(instructions::addressing::operand_size(address_mode));
	// A leap marks one past the terminating instruction (the start of
	// whatever follows it), not its last byte -- the sweep in
	// `infer_segments` turns it into an inclusive segment end by
	// subtracting one at record time.
	let next = address.wrapping_add(size).wrapping_add(1);

	match instruction.opcode_info.mnemonic {
		Mnemonic::Bcc | Mnemonic::Bcs | Mnemonic::Beq | Mnemonic::Bne | Mnemonic::Bmi | Mnemonic::Bpl | Mnemonic::Bvc | Mnemonic::Bvs => {
			let target = decode::branch_target(address, address_mode, instruction.operand);
			new_lands.push((target, LandType::CodeInferred));
			false
		}
		Mnemonic::Brk => {
			new_leaps.push(next);
			terminates
		}
		Mnemonic::Jmp => {
			new_leaps.push(next);
			if address_mode != AddressMode::Indirect {
				new_lands.push((instruction.operand, LandType::CodeInferred));
			}
			terminates
		}
		Mnemonic::Jsr => {
			new_lands.push((instruction.operand, LandType::CodeInferred));
			false
		}
		Mnemonic::Rti | Mnemonic::Rts => {
			new_leaps.push(next);
			terminates
		}
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::common::SegmentType;

	fn analyzer_with(origin: Address, bytes: &[u8]) -> Analyzer {
		let mut analyzer = Analyzer::new();
		analyzer.declare_origin_address(origin);
		analyzer.set_assembly(bytes.to_vec());
		analyzer
	}

	#[test]
	fn single_straight_line_segment_from_a_declared_land() {
		let mut analyzer = analyzer_with(0x1000, &[0xa9, 0x01, 0x60]);
		analyzer.declare_land(0x1000);
		analyzer.analyze().unwrap();
		let segments: Vec<_> = analyzer.segments().values().collect();
		assert_eq!(segments.len(), 1);
		assert_eq!(segments[0].segment_type, SegmentType::CodeKnown);
		assert_eq!((segments[0].start_address, segments[0].end_address), (0x1000, 0x1002));
	}

	#[test]
	fn code_followed_by_inferred_trailing_data() {
		let mut analyzer = analyzer_with(0x1000, &[0xa9, 0x01, 0x60, 0xff, 0xff]);
		analyzer.declare_land(0x1000);
		analyzer.analyze().unwrap();
		let segments: Vec<_> = analyzer.segments().values().collect();
		assert_eq!(segments.len(), 2);
		assert_eq!(segments[0].segment_type, SegmentType::CodeKnown);
		assert_eq!(segments[1].segment_type, SegmentType::DataInferred);
		assert_eq!((segments[1].start_address, segments[1].end_address), (0x1003, 0x1004));
	}

	#[test]
	fn jmp_skips_an_inline_data_gap() {
		let mut analyzer = analyzer_with(0x1000, &[0x4c, 0x06, 0x10, 0x00, 0x00, 0x00, 0xa9, 0x02, 0x60]);
		analyzer.declare_land(0x1000);
		analyzer.analyze().unwrap();
		let segments: Vec<_> = analyzer.segments().values().collect();
		assert_eq!(segments.len(), 3);
		assert_eq!((segments[0].start_address, segments[0].end_address), (0x1000, 0x1002));
		// declare_land always records CodeKnown, and that's the type the
		// sweep keeps for the land it started from.
		assert_eq!(segments[0].segment_type, SegmentType::CodeKnown);
		assert_eq!((segments[1].start_address, segments[1].end_address), (0x1003, 0x1005));
		assert_eq!(segments[1].segment_type, SegmentType::DataInferred);
		assert_eq!((segments[2].start_address, segments[2].end_address), (0x1006, 0x1008));
		assert_eq!(segments[2].segment_type, SegmentType::CodeInferred);
	}

	#[test]
	fn jsr_target_past_an_inline_data_byte_forms_its_own_segment() {
		// JSR $1005; RTS; BRK; NOP; RTS -- the JSR's fallthrough (RTS at
		// 0x1003) and its call target (NOP at 0x1005) are two disjoint
		// walks with a single inert byte between them at 0x1004, so they
		// form separate code segments around a one-byte data gap rather
		// than merging into one.
		let mut analyzer = analyzer_with(0x1000, &[0x20, 0x05, 0x10, 0x60, 0x00, 0xea, 0x60]);
		analyzer.declare_land(0x1000);
		analyzer.analyze().unwrap();
		let segments: Vec<_> = analyzer.segments().values().collect();
		assert_eq!(segments.len(), 3);
		assert_eq!((segments[0].start_address, segments[0].end_address), (0x1000, 0x1003));
		assert_eq!(segments[0].segment_type, SegmentType::CodeKnown);
		assert_eq!((segments[1].start_address, segments[1].end_address), (0x1004, 0x1004));
		assert_eq!(segments[1].segment_type, SegmentType::DataInferred);
		assert_eq!((segments[2].start_address, segments[2].end_address), (0x1005, 0x1006));
		assert_eq!(segments[2].segment_type, SegmentType::CodeInferred);
	}

	#[test]
	fn branch_target_already_covered_by_the_fallthrough_walk() {
		let mut analyzer = analyzer_with(0x1000, &[0xd0, 0x02, 0xa9, 0x00, 0xa9, 0x01, 0x60]);
		analyzer.declare_land(0x1000);
		analyzer.analyze().unwrap();
		let segments: Vec<_> = analyzer.segments().values().collect();
		assert_eq!(segments.len(), 1);
		assert_eq!((segments[0].start_address, segments[0].end_address), (0x1000, 0x1006));
	}

	#[test]
	fn illumination_promotes_trailing_dark_code() {
		// A trailing gap needs to span more than one byte to qualify for
		// promotion (matching the reference disassembler's own
		// `endAddress - startAddress > 1` gate), hence three trailing NOPs
		// rather than two.
		let mut analyzer =
			analyzer_with(0x1000, &[0x20, 0x05, 0x10, 0x60, 0x00, 0xea, 0x60, 0xea, 0xea, 0xea]);
		analyzer.declare_land(0x1000);
		analyzer.set_illuminating_mode();
		analyzer.analyze().unwrap();
		let dark: Vec<_> = analyzer.segments().values().filter(|s| s.segment_type == SegmentType::CodeDark).collect();
		assert_eq!(dark.len(), 1);
		assert_eq!((dark[0].start_address, dark[0].end_address), (0x1007, 0x1009));
	}

	#[test]
	fn empty_lands_is_a_fatal_analysis_error() {
		let mut analyzer = analyzer_with(0x1000, &[0xea, 0xea]);
		let err = analyzer.analyze().unwrap_err();
		assert!(matches!(err, Hac65Error::Analysis(_)));
	}

	#[test]
	fn origin_plus_size_over_the_address_space_is_rejected() {
		let mut analyzer = Analyzer::new();
		analyzer.declare_origin_address(0xFFFF);
		analyzer.set_assembly(vec![0; 2]);
		let err = analyzer.analyze().unwrap_err();
		assert!(matches!(err, Hac65Error::Analysis(_)));
	}

	#[test]
	fn reserved_region_at_the_top_of_a_full_size_image_is_never_decoded() {
		let mut assembly = vec![0xea; 0x1000];
		assembly[0x0ffa..].copy_from_slice(&[0; 6]);
		let mut analyzer = analyzer_with(0xF000, &assembly);
		analyzer.declare_land(0xF000);
		analyzer.analyze().unwrap();
		assert_eq!(analyzer.end_address(), 0xFFFF);
		assert!(analyzer.instructions().keys().all(|&a| a < NMI_VECTOR));
	}

	#[test]
	fn segments_cover_the_full_image_without_overlap() {
		let mut analyzer = analyzer_with(0x1000, &[0xa9, 0x01, 0x60, 0xff, 0xff, 0xea, 0xea]);
		analyzer.declare_land(0x1000);
		analyzer.analyze().unwrap();
		let mut prev_end: Option<Address> = None;
		for segment in analyzer.segments().values() {
			if let Some(prev) = prev_end {
				assert_eq!(segment.start_address, prev + 1);
			} else {
				assert_eq!(segment.start_address, analyzer.origin_address());
			}
			prev_end = Some(segment.end_address);
		}
		assert_eq!(prev_end, Some(analyzer.end_address()));
	}

	#[test]
	fn analyzing_twice_from_fresh_analyzers_is_deterministic() {
		let build = || {
			let mut analyzer = analyzer_with(0x1000, &[0xa9, 0x01, 0x60, 0xff, 0xff]);
			analyzer.declare_land(0x1000);
			analyzer.analyze().unwrap();
			analyzer
		};
		let a = build();
		let b = build();
		let a_segments: Vec<_> = a.segments().values().copied().collect();
		let b_segments: Vec<_> = b.segments().values().copied().collect();
		assert_eq!(a_segments, b_segments);
	}

	#[test]
	fn data_label_markers_select_read_or_write_variant() {
		let mut analyzer = Analyzer::new();
		analyzer.declare_data_label("PORT<", 0x2000);
		analyzer.declare_data_label("PORT>", 0x2000);
		assert_eq!(analyzer.lookup_label(0x2000, Some(MemoryOperation::Read)).as_deref(), Some("PORT"));
		assert_eq!(analyzer.lookup_label(0x2000, Some(MemoryOperation::Write)).as_deref(), Some("PORT"));
	}

	#[test]
	fn lookup_label_falls_back_to_the_first_label_when_no_marker_matches() {
		let mut analyzer = Analyzer::new();
		analyzer.declare_data_label("FIRST", 0x2000);
		analyzer.declare_data_label("SECOND", 0x2000);
		assert_eq!(analyzer.lookup_label(0x2000, None).as_deref(), Some("FIRST"));
	}

	#[test]
	fn lookup_equate_preserves_insertion_order() {
		let mut analyzer = Analyzer::new();
		analyzer.declare_equate("ONE", 1);
		analyzer.declare_equate("UNITY", 1);
		assert_eq!(analyzer.lookup_equate(1), vec!["ONE".to_string(), "UNITY".to_string()]);
	}

	#[test]
	fn redeclaring_a_code_label_overwrites_the_previous_one() {
		let mut analyzer = Analyzer::new();
		analyzer.declare_code_label("OLD", 0x2000);
		analyzer.declare_code_label("NEW", 0x2000);
		assert_eq!(analyzer.lookup_label(0x2000, None).as_deref(), Some("NEW"));
	}
}
