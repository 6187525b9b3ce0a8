//! Architecture overlay resolution and object-file loading (§4.10).
//!
//! A [`Loader`] resolves a named architecture to a declaration set -- either
//! a `.aro` file on disk or a built-in default -- applies it to an
//! [`Analyzer`], and then reads the object file's byte range into the
//! analyzer's assembly. The resolved overlay JSON documents are retained
//! (most-recently-loaded first) for the report's `o` section.

use crate::analyzer::{Analyzer, VectorTableKind};
use crate::analyzer::fingerprint::Fingerprint;
use crate::common::Address;
use crate::error::{Hac65Error, Hac65Result};
use crate::flexint;
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Largest object file this analyzer can address.
pub const MAX_OBJECT_SIZE: usize = 0x1_0000;

/// Overlay architecture consulted when `-A` names none.
pub const DEFAULT_ARCHITECTURE: &str = "Builtin_MOS6502";

const MAX_INCLUDE_DEPTH: u32 = 10;

fn builtin_architecture_json(architecture: &str) -> Option<&'static str> {
	match architecture {
		"Builtin_MOS6502" => Some(r#"{"structures":{"normal_vector_tables":{"$FFFA":3}}}"#),
		_ => None,
	}
}

fn structure_kind(name: &str) -> Option<VectorTableKind> {
	Some(match name {
		"normal_vector_tables" => VectorTableKind::Normal,
		"indirect_vector_tables" => VectorTableKind::Indirect,
		"keyed_vector_tables" => VectorTableKind::Keyed,
		"keyed_indirect_vector_tables" => VectorTableKind::KeyedIndirect,
		"keyed_indirect_minus_one_vector_tables" => VectorTableKind::KeyedIndirectMinusOne,
		"jump_vector_tables" => VectorTableKind::Jump,
		"minus_one_vector_tables" => VectorTableKind::MinusOne,
		"split_vector_tables" => VectorTableKind::Split,
		_ => return None,
	})
}

fn include_regex() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| {
		Regex::new(r#"(?i)^@include\s*"([A-Za-z0-9._-]{1,20})""#).expect("include directive regex is fixed and valid")
	})
}

fn parse_overlay_u16(text: &str) -> Hac65Result<u16> {
	flexint::parse_u16(text).map_err(|_| Hac65Error::Overlay(format!("malformed value: \"{text}\"")))
}

fn json_value_to_u16(value: &Value) -> Hac65Result<u16> {
	match value {
		Value::Number(n) => {
			let i = n.as_i64().ok_or_else(|| Hac65Error::Overlay(format!("malformed value: {value}")))?;
			u16::try_from(i).map_err(|_| Hac65Error::Overlay(format!("malformed value: {value}")))
		}
		Value::String(s) => parse_overlay_u16(s),
		_ => Err(Hac65Error::Overlay(format!("malformed value: {value}"))),
	}
}

fn as_object<'a>(value: &'a Value, what: &str) -> Hac65Result<&'a serde_json::Map<String, Value>> {
	value.as_object().ok_or_else(|| Hac65Error::Overlay(format!("malformed {what} spec: {value}")))
}

/// Apply one architecture's overlay JSON to an analyzer's declarations.
///
/// Declares origin, equates, code/data labels, vector-table structures, and
/// expert lands/leaps. Unknown top-level keys or structure kinds are
/// [`Hac65Error::Overlay`].
fn apply_overlay(analyzer: &mut Analyzer, json: &Value) -> Hac65Result<()> {
	let top = json.as_object().ok_or_else(|| Hac65Error::Overlay(format!("malformed overlay: {json}")))?;

	for (key, value) in top {
		match key.as_str() {
			"origin" => {
				if !value.is_number() && !value.is_string() {
					return Err(Hac65Error::Overlay(format!("malformed origin spec: {value}")));
				}
				let address: Address = json_value_to_u16(value)?;
				if !analyzer.has_origin_address() {
					analyzer.declare_origin_address(address);
				}
			}
			"equates" => {
				for (name, v) in as_object(value, "equates")? {
					analyzer.declare_equate(name.clone(), json_value_to_u16(v)?);
				}
			}
			"code_labels" => {
				for (label, v) in as_object(value, "code labels")? {
					analyzer.declare_code_label(label.clone(), json_value_to_u16(v)?);
				}
			}
			"data_labels" => {
				for (label, v) in as_object(value, "data labels")? {
					analyzer.declare_data_label(label.clone(), json_value_to_u16(v)?);
				}
			}
			"structures" => {
				for (structure_key, tables) in as_object(value, "structures")? {
					let Some(kind) = structure_kind(structure_key) else {
						return Err(Hac65Error::Overlay(format!("unknown vector table kind: {structure_key}")));
					};
					for (address_text, count_value) in as_object(tables, "tables")? {
						let address = parse_overlay_u16(address_text)?;
						let count = json_value_to_u16(count_value)?;
						analyzer.declare_vector_table(kind, address, count);
					}
				}
			}
			"expert" => {
				for (expert_key, expert_value) in as_object(value, "expert")? {
					let entries = expert_value
						.as_array()
						.ok_or_else(|| Hac65Error::Overlay(format!("malformed {expert_key} spec: {expert_value}")))?;
					match expert_key.as_str() {
						"lands" => {
							for entry in entries {
								analyzer.declare_land(json_value_to_u16(entry)?);
							}
						}
						"leaps" => {
							for entry in entries {
								analyzer.declare_leap(json_value_to_u16(entry)?);
							}
						}
						other => return Err(Hac65Error::Overlay(format!("unknown expert spec: {other}"))),
					}
				}
			}
			other => return Err(Hac65Error::Overlay(format!("unknown spec: {other}"))),
		}
	}

	Ok(())
}

fn include_directive(line: &str) -> Option<String> {
	include_regex().captures(line).map(|captures| captures[1].to_string())
}

/// Resolves an architecture overlay and the object file it describes.
#[derive(Debug, Default)]
pub struct Loader {
	architecture: Option<String>,
	start_position: Option<Address>,
	end_position: Option<Address>,
	object_filename: PathBuf,
	object_md5: Option<Fingerprint>,
	overlays: Vec<(String, Value)>,
}

impl Loader {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_architecture(&mut self, architecture: impl Into<String>) {
		self.architecture = Some(architecture.into());
	}

	pub fn set_start_position(&mut self, position: Address) {
		self.start_position = Some(position);
	}

	pub fn set_end_position(&mut self, position: Address) {
		self.end_position = Some(position);
	}

	pub fn set_object_filename(&mut self, filename: PathBuf) {
		self.object_filename = filename;
	}

	/// MD5 of the loaded object byte range. `None` until [`Self::load`] runs.
	#[must_use]
	pub fn object_md5(&self) -> Option<Fingerprint> {
		self.object_md5
	}

	/// Every overlay consulted, most-recently-resolved first.
	#[must_use]
	pub fn overlays(&self) -> &[(String, Value)] {
		&self.overlays
	}

	/// Resolve the configured architecture, read the object file, and hand
	/// its bytes to `analyzer`. Single-use, mirroring [`Analyzer::analyze`].
	pub fn load(&mut self, analyzer: &mut Analyzer) -> Hac65Result<()> {
		let architecture = self.architecture.clone().unwrap_or_else(|| DEFAULT_ARCHITECTURE.to_string());
		self.load_architecture(analyzer, &architecture, 1)?;

		let object = self.load_object_file()?;
		analyzer.set_assembly(object);
		Ok(())
	}

	fn load_architecture(&mut self, analyzer: &mut Analyzer, architecture: &str, depth: u32) -> Hac65Result<()> {
		if depth > MAX_INCLUDE_DEPTH {
			return Err(Hac65Error::Overlay(format!(
				"max architecture overlay depth of {MAX_INCLUDE_DEPTH} exceeded by {architecture}"
			)));
		}

		let path = PathBuf::from(format!("{architecture}.aro"));
		if path.is_file() {
			let text = std::fs::read_to_string(&path)
				.map_err(|e| Hac65Error::io(format!("reading architecture overlay '{architecture}'"), e))?;
			self.load_aro_stream(analyzer, architecture, &text, depth)
		} else if let Some(text) = builtin_architecture_json(architecture) {
			let json: Value =
				serde_json::from_str(text).expect("built-in architecture overlays are valid JSON literals");
			apply_overlay(analyzer, &json)?;
			self.overlays.insert(0, (architecture.to_string(), json));
			Ok(())
		} else {
			Err(Hac65Error::Overlay(format!("cannot find .aro file for '{architecture}'")))
		}
	}

	fn load_aro_stream(
		&mut self,
		analyzer: &mut Analyzer,
		architecture: &str,
		text: &str,
		depth: u32,
	) -> Hac65Result<()> {
		let mut json_text = String::new();
		for line in text.lines() {
			let stripped = line.split('#').next().unwrap_or("");
			if let Some(next_architecture) = include_directive(stripped) {
				self.load_architecture(analyzer, &next_architecture, depth + 1)?;
			} else if stripped.starts_with('@') {
				return Err(Hac65Error::Overlay(format!(
					"invalid architecture overlay directive '{stripped}' in {architecture}"
				)));
			} else {
				json_text.push_str(stripped);
				json_text.push('\n');
			}
		}

		let json: Value =
			serde_json::from_str(&json_text).map_err(|e| Hac65Error::json(format!("architecture overlay {architecture}"), e))?;
		apply_overlay(analyzer, &json)
			.map_err(|e| Hac65Error::Overlay(format!("architecture overlay {architecture}: {e}")))?;
		self.overlays.insert(0, (architecture.to_string(), json));
		Ok(())
	}

	fn load_object_file(&mut self) -> Hac65Result<Vec<u8>> {
		let path: &Path = &self.object_filename;
		let bytes = std::fs::read(path)
			.map_err(|_| Hac65Error::Usage(format!("cannot find object-file '{}'", path.display())))?;
		let file_size = bytes.len();

		let start = usize::from(self.start_position.unwrap_or(0));
		if start >= file_size {
			return Err(Hac65Error::Usage(format!(
				"invalid start position ${start:04X} (exceeds object file size ${file_size:04X})"
			)));
		}

		let end = match self.end_position {
			Some(position) => usize::from(position),
			None => file_size - 1,
		};
		if end < start {
			return Err(Hac65Error::Usage(format!(
				"invalid start position ${start:04X} (exceeds end position ${end:04X})"
			)));
		}
		if end >= file_size {
			return Err(Hac65Error::Usage(format!(
				"invalid end position ${end:04X} (exceeds object file size ${file_size:04X})"
			)));
		}

		let size = end - start + 1;
		if size > MAX_OBJECT_SIZE {
			return Err(Hac65Error::Usage(format!(
				"invalid object size ${size:04X} (exceeds max object size ${MAX_OBJECT_SIZE:04X})"
			)));
		}

		let slice = bytes[start..=end].to_vec();
		self.object_md5 = Some(Fingerprint::of_bytes(&slice));
		Ok(slice)
	}
}
