//! Error types for disassembly, overlay loading, and CLI usage.
//!
//! Each variant carries the exit code the original tool used for its
//! exception class: usage and overlay errors exit 1, analysis failures
//! exit 1 as well, and `-h`/`-V` exit 0 -- but the distinction matters for
//! anyone scripting against the binary's stderr.

use thiserror::Error;

/// Result type threaded through the loader, analyzer, and reporter.
pub type Hac65Result<T> = Result<T, Hac65Error>;

/// Everything that can go wrong loading an object file, analyzing it, or
/// producing a report.
#[derive(Error, Debug)]
pub enum Hac65Error {
	/// `-h`/`-V` short-circuited argument processing to print usage or
	/// version text. Not a failure: carries exit code 0.
	#[error("{0}")]
	Help(String),

	/// A command-line argument was malformed or contradictory.
	#[error("{0}")]
	Usage(String),

	/// An `.aro` overlay file was malformed, or named a structure/address
	/// that could not be resolved.
	#[error("{0}")]
	Overlay(String),

	/// The analyzer could not produce any valid segments, or otherwise
	/// failed to complete disassembly.
	#[error("{0}")]
	Analysis(String),

	/// Reading or writing a file failed.
	#[error("{message}: {source}")]
	Io {
		message: String,
		#[source]
		source: std::io::Error,
	},

	/// An overlay's JSON was syntactically invalid.
	#[error("{message}: {detail}")]
	Json { message: String, detail: String },
}

impl Clone for Hac65Error {
	fn clone(&self) -> Self {
		match self {
			Self::Help(message) => Self::Help(message.clone()),
			Self::Usage(message) => Self::Usage(message.clone()),
			Self::Overlay(message) => Self::Overlay(message.clone()),
			Self::Analysis(message) => Self::Analysis(message.clone()),
			Self::Io { message, source } => {
				Self::Io { message: message.clone(), source: std::io::Error::new(source.kind(), source.to_string()) }
			}
			Self::Json { message, detail } => Self::Json { message: message.clone(), detail: detail.clone() },
		}
	}
}

impl Hac65Error {
	/// Process exit code the original tool used for this error class.
	///
	/// Every category exits 1 except `Help`, which short-circuits a
	/// successful `-h`/`-V` invocation with exit code 0.
	#[must_use]
	pub fn exit_code(&self) -> i32 {
		match self {
			Self::Help(_) => 0,
			_ => 1,
		}
	}

	/// Wrap an I/O error with a short description of what was being done.
	pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
		Self::Io { message: message.into(), source }
	}

	/// Wrap a JSON parse error with a short description of what was being
	/// parsed.
	pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
		Self::Json { message: message.into(), detail: source.to_string() }
	}
}
