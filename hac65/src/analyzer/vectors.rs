//! Declared vector-table shapes: indirection expansion and ledge seeding.
//!
//! The eight shapes from the original are modelled as one tagged
//! [`VectorTableKind`] with a per-shape entry width and decoder, rather than
//! eight near-identical containers.

use super::{Analyzer, Land, LandType};
use crate::common::Address;
use std::collections::BTreeMap;

/// One of the eight recognized vector-table encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VectorTableKind {
	Normal,
	MinusOne,
	Split,
	Keyed,
	Jump,
	Indirect,
	KeyedIndirect,
	KeyedIndirectMinusOne,
}

impl VectorTableKind {
	/// Octets occupied by one entry of this shape (for `Split`, this is the
	/// combined per-index width across both columns).
	#[must_use]
	pub fn entry_width(self) -> u16 {
		match self {
			Self::Normal | Self::MinusOne | Self::Split | Self::Indirect => 2,
			Self::Keyed | Self::Jump | Self::KeyedIndirect | Self::KeyedIndirectMinusOne => 3,
		}
	}
}

/// `table_address -> entry_count` declarations for every shape.
pub type VectorTableMap = BTreeMap<VectorTableKind, BTreeMap<Address, u16>>;

impl Analyzer {
	/// Record a declared vector table. Re-declaring the same
	/// `(kind, table_address)` overwrites the entry count.
	pub fn declare_vector_table(&mut self, kind: VectorTableKind, table_address: Address, entry_count: u16) {
		self.vector_tables.entry(kind).or_default().insert(table_address, entry_count);
	}

	/// Every octet covered by any declared vector table, after indirections
	/// have been expanded into their synthesized direct tables.
	pub(super) fn compute_all_vector_addresses(&self) -> std::collections::BTreeSet<Address> {
		let mut addresses = std::collections::BTreeSet::new();
		for (&kind, tables) in &self.vector_tables {
			let width = kind.entry_width();
			for (&table_address, &count) in tables {
				let footprint = u32::from(width) * u32::from(count);
				for offset in 0..footprint {
					addresses.insert(table_address.wrapping_add(offset as u16));
				}
			}
		}
		addresses
	}

	/// Turn every indirect table into a synthesized one-entry direct table
	/// at the pointer it names. Must run before [`Self::seed_ledges`].
	pub(super) fn expand_vector_indirections(&mut self) {
		let indirect = self.vector_tables.get(&VectorTableKind::Indirect).cloned().unwrap_or_default();
		for (table_address, count) in indirect {
			for i in 0..count {
				let entry_address = table_address.wrapping_add(i * 2);
				if let Some(pointer) = self.read_word(entry_address) {
					self.declare_vector_table(VectorTableKind::Normal, pointer, 1);
				}
			}
		}

		let keyed_indirect =
			self.vector_tables.get(&VectorTableKind::KeyedIndirect).cloned().unwrap_or_default();
		for (table_address, count) in keyed_indirect {
			for i in 0..count {
				let entry_address = table_address.wrapping_add(i * 3);
				if let Some(pointer) = self.read_word(entry_address.wrapping_add(1)) {
					self.declare_vector_table(VectorTableKind::Normal, pointer, 1);
				}
			}
		}

		let keyed_indirect_minus_one =
			self.vector_tables.get(&VectorTableKind::KeyedIndirectMinusOne).cloned().unwrap_or_default();
		for (table_address, count) in keyed_indirect_minus_one {
			for i in 0..count {
				let entry_address = table_address.wrapping_add(i * 3);
				if let Some(pointer) = self.read_word(entry_address.wrapping_add(1)) {
					self.declare_vector_table(VectorTableKind::MinusOne, pointer, 1);
				}
			}
		}
	}

	/// Seed initial lands and leaps from every declared (post-expansion)
	/// vector table.
	pub(super) fn seed_ledges(&mut self) {
		self.expand_vector_indirections();

		if let Some(tables) = self.vector_tables.get(&VectorTableKind::Normal).cloned() {
			for (table_address, count) in tables {
				for i in 0..count {
					if let Some(target) = self.read_word(table_address.wrapping_add(i * 2)) {
						self.add_land(target, LandType::CodeKnown);
					}
				}
			}
		}

		if let Some(tables) = self.vector_tables.get(&VectorTableKind::MinusOne).cloned() {
			for (table_address, count) in tables {
				for i in 0..count {
					if let Some(target) = self.read_word(table_address.wrapping_add(i * 2)) {
						self.add_land(target.wrapping_add(1), LandType::CodeKnown);
					}
				}
			}
		}

		if let Some(tables) = self.vector_tables.get(&VectorTableKind::Split).cloned() {
			for (table_address, count) in tables {
				for i in 0..count {
					let lo = self.read_byte(table_address.wrapping_add(i));
					let hi = self.read_byte(table_address.wrapping_add(count).wrapping_add(i));
					if let (Some(lo), Some(hi)) = (lo, hi) {
						let target = u16::from(lo) | (u16::from(hi) << 8);
						self.add_land(target, LandType::CodeKnown);
					}
				}
			}
		}

		if let Some(tables) = self.vector_tables.get(&VectorTableKind::Keyed).cloned() {
			for (table_address, count) in tables {
				for i in 0..count {
					if let Some(target) = self.read_word(table_address.wrapping_add(i * 3).wrapping_add(1)) {
						self.add_land(target, LandType::CodeKnown);
					}
				}
			}
		}

		if let Some(tables) = self.vector_tables.get(&VectorTableKind::Jump).cloned() {
			for (table_address, count) in tables {
				for i in 0..count {
					let entry_address = table_address.wrapping_add(i * 3);
					self.add_land(entry_address, LandType::CodeKnown);
					self.add_leap(entry_address.wrapping_add(3));
				}
			}
		}

		self.all_vector_addresses = self.compute_all_vector_addresses();
	}

	pub(super) fn add_land(&mut self, address: Address, land_type: LandType) {
		if address < self.origin_address {
			return;
		}
		self.lands.insert(Land { address, land_type });
	}

	pub(super) fn add_leap(&mut self, address: Address) {
		self.leaps.insert(address);
	}
}
