//! Ambient configuration assembled from command-line flags.
//!
//! Unlike a build tool, this analyzer has no project file to read: every
//! option in [`Config`] traces back to a CLI flag parsed in `main`.

use crate::common::Address;
use crate::error::{Hac65Error, Hac65Result};
use std::path::PathBuf;

/// Every report-section character the `-R` flag recognizes, in the order
/// emitted when no `-R` is given a value at all: segments only.
pub const ALL_REPORT_FLAGS: &str = "sdfo";

/// Which report sections to emit, and in what order, per `-R`.
///
/// This mirrors the original's report-flags string directly rather than a
/// set of booleans: the CLI iterates the characters in the order the caller
/// wrote them, and a segment fingerprint list sorted one way reads very
/// differently from a disassembly printed before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFlags(String);

impl Default for ReportFlags {
	fn default() -> Self {
		Self("s".to_string())
	}
}

impl ReportFlags {
	/// Parse a `-R` argument. An empty string means "every section, in
	/// `sdfo` order"; otherwise every character must be one of `s`/`d`/`f`/`o`.
	pub fn parse(flags: &str) -> Hac65Result<Self> {
		if flags.is_empty() {
			return Ok(Self(ALL_REPORT_FLAGS.to_string()));
		}
		for flag in flags.chars() {
			if !ALL_REPORT_FLAGS.contains(flag) {
				return Err(Hac65Error::Usage(format!("unknown report flag '{flag}' provided")));
			}
		}
		Ok(Self(flags.to_string()))
	}

	/// The requested sections, in the order they should be emitted.
	pub fn sections(&self) -> impl Iterator<Item = char> + '_ {
		self.0.chars()
	}
}

/// The built-in architecture consulted when `-A` names none.
pub const DEFAULT_ARCHITECTURE: &str = "Builtin_MOS6502";

/// Assembled options controlling one analysis run.
#[derive(Debug, Clone)]
pub struct Config {
	/// The object file to analyze (the sole positional argument).
	pub object_filename: PathBuf,
	/// `-A`: overlay architecture name.
	pub architecture: String,
	/// `-o`: force the origin address instead of inferring it from vectors.
	pub origin_override: Option<Address>,
	/// `-i`: promote clean-decoding gaps between code segments to code.
	pub illuminate: bool,
	/// `-S`: start byte position within the object file.
	pub start_position: Option<Address>,
	/// `-E`: end byte position within the object file, `None` for EOF.
	pub end_position: Option<Address>,
	/// `-R`: which report sections to print, in the requested order.
	pub report_flags: ReportFlags,
}

impl Config {
	/// Validate cross-field invariants the CLI parser can't express alone.
	pub fn validate(&self) -> Hac65Result<()> {
		if let (Some(start), Some(end)) = (self.start_position, self.end_position) {
			if start > end {
				return Err(Hac65Error::Usage(format!(
					"invalid start position ${start:04X} (exceeds end position ${end:04X})"
				)));
			}
		}
		Ok(())
	}
}

/// Builder mirroring [`Config`]'s fields one flag at a time, used by the CLI
/// entry point to assemble a [`Config`] from parsed arguments.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
	object_filename: Option<PathBuf>,
	architecture: Option<String>,
	origin_override: Option<Address>,
	illuminate: bool,
	start_position: Option<Address>,
	end_position: Option<Address>,
	report_flags: ReportFlags,
}

impl ConfigBuilder {
	/// Start building with all options at their CLI defaults.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn object_filename(mut self, path: PathBuf) -> Self {
		self.object_filename = Some(path);
		self
	}

	#[must_use]
	pub fn architecture(mut self, name: String) -> Self {
		self.architecture = Some(name);
		self
	}

	#[must_use]
	pub fn origin_override(mut self, address: Address) -> Self {
		self.origin_override = Some(address);
		self
	}

	#[must_use]
	pub fn illuminate(mut self, illuminate: bool) -> Self {
		self.illuminate = illuminate;
		self
	}

	#[must_use]
	pub fn start_position(mut self, offset: Address) -> Self {
		self.start_position = Some(offset);
		self
	}

	#[must_use]
	pub fn end_position(mut self, offset: Address) -> Self {
		self.end_position = Some(offset);
		self
	}

	#[must_use]
	pub fn report_flags(mut self, flags: ReportFlags) -> Self {
		self.report_flags = flags;
		self
	}

	/// Finish building, validating the result.
	pub fn build(self) -> Hac65Result<Config> {
		let object_filename =
			self.object_filename.ok_or_else(|| Hac65Error::Usage("no object file specified".to_string()))?;
		let config = Config {
			object_filename,
			architecture: self.architecture.unwrap_or_else(|| DEFAULT_ARCHITECTURE.to_string()),
			origin_override: self.origin_override,
			illuminate: self.illuminate,
			start_position: self.start_position,
			end_position: self.end_position,
			report_flags: self.report_flags,
		};
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_requires_an_object_filename() {
		let result = ConfigBuilder::new().build();
		assert!(result.is_err());
	}

	#[test]
	fn builder_produces_a_valid_default_config() {
		let config = ConfigBuilder::new().object_filename(PathBuf::from("game.bin")).build().unwrap();
		assert_eq!(config.object_filename, PathBuf::from("game.bin"));
		assert_eq!(config.architecture, DEFAULT_ARCHITECTURE);
		assert!(!config.illuminate);
		assert_eq!(config.report_flags, ReportFlags::default());
	}

	#[test]
	fn rejects_a_start_position_after_the_end_position() {
		let config = ConfigBuilder::new()
			.object_filename(PathBuf::from("game.bin"))
			.start_position(100)
			.end_position(50)
			.build();
		assert!(config.is_err());
	}

	#[test]
	fn report_flags_parse_accepts_any_sfdo_subset_in_order() {
		let flags = ReportFlags::parse("do").unwrap();
		assert_eq!(flags.sections().collect::<Vec<_>>(), vec!['d', 'o']);
	}

	#[test]
	fn report_flags_parse_rejects_unknown_characters() {
		assert!(ReportFlags::parse("x").is_err());
	}

	#[test]
	fn report_flags_parse_empty_means_every_section() {
		let flags = ReportFlags::parse("").unwrap();
		assert_eq!(flags.sections().collect::<Vec<_>>(), vec!['s', 'd', 'f', 'o']);
	}
}
