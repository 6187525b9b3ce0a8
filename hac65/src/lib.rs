//! # HAC/65
//!
//! An inferencing disassembler for MOS 6502 machine code. Given a raw
//! binary image at a known origin, and optionally an architecture overlay
//! describing labels, equates, vector tables, and forced entry points,
//! HAC/65 partitions the image into code and data segments by fixed-point
//! analysis, decodes the code segments into instructions, and renders a
//! report with per-segment MD5 fingerprints.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use hac65::analyzer::Analyzer;
//!
//! let mut analyzer = Analyzer::new();
//! analyzer.declare_origin_address(0x8000);
//! analyzer.set_assembly(vec![0; 0x8000]);
//! analyzer.analyze().expect("analysis should converge");
//! println!("segments found: {}", analyzer.segments().len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod analyzer;
pub mod common;
pub mod config;
pub mod error;
pub mod flexint;
pub mod instructions;
pub mod loader;
pub mod report;

pub use crate::analyzer::{Analyzer, Fingerprint};
pub use crate::config::{Config, ConfigBuilder, ReportFlags};
pub use crate::error::{Hac65Error, Hac65Result};
pub use crate::loader::Loader;

/// Library version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_version_string() {
		assert!(!VERSION.is_empty());
	}
}
