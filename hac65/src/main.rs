//! HAC/65 CLI
//!
//! Command-line entry point: parse flags, load the object file and its
//! architecture overlay, run the analyzer, and print the requested report.

use clap::Parser;
use hac65::analyzer::Analyzer;
use hac65::config::{Config, ConfigBuilder, ReportFlags};
use hac65::error::{Hac65Error, Hac65Result};
use hac65::flexint;
use hac65::loader::Loader;
use hac65::report;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(
	name = "hac65",
	version = hac65::VERSION,
	about = "HAC/65 6502 Inferencing Disassembler",
	disable_version_flag = true,
	disable_help_flag = true
)]
struct Cli {
	/// Object file to disassemble.
	#[arg(value_name = "OBJECT")]
	object: Option<PathBuf>,

	/// Print usage text and exit.
	#[arg(short = 'h', long = "help")]
	help: bool,

	/// Print version text and exit.
	#[arg(short = 'V', long = "version")]
	version: bool,

	/// Start byte position within the object file (flex-integer).
	#[arg(short = 'S', long = "start", value_name = "POSITION")]
	start: Option<String>,

	/// End byte position within the object file (flex-integer).
	#[arg(short = 'E', long = "end", value_name = "POSITION")]
	end: Option<String>,

	/// Architecture overlay name.
	#[arg(short = 'A', long = "architecture", value_name = "NAME")]
	architecture: Option<String>,

	/// Force the origin address (flex-integer), overriding vector inference.
	#[arg(short = 'o', long = "origin", value_name = "ADDRESS")]
	origin: Option<String>,

	/// Promote clean-decoding gaps between code segments to code.
	#[arg(short = 'i', long = "illuminate")]
	illuminate: bool,

	/// Report sections to print, e.g. "sdfo"; omit the value for all, omit
	/// the flag entirely for segments only.
	#[arg(short = 'R', long = "report", value_name = "FLAGS", num_args = 0..=1, default_missing_value = "")]
	report: Option<String>,
}

fn main() {
	env_logger::Builder::from_default_env().init();

	let args: Vec<String> = std::env::args().collect();
	match run(&args) {
		Ok(text) => {
			print!("{text}");
		}
		Err(err) => {
			let exit_code = err.exit_code();
			if exit_code != 0 {
				eprint!("Error: ");
			}
			eprintln!("{err}");
			process::exit(exit_code);
		}
	}
}

fn command_text(args: &[String]) -> String {
	let program = args
		.first()
		.map(|p| PathBuf::from(p).file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| p.clone()))
		.unwrap_or_else(|| "hac65".to_string());
	std::iter::once(program).chain(args.iter().skip(1).cloned()).collect::<Vec<_>>().join(" ")
}

fn time_text() -> String {
	let secs = std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0);
	format!("epoch+{secs}s")
}

fn run(args: &[String]) -> Hac65Result<String> {
	let cli = Cli::try_parse_from(args.iter().cloned()).map_err(|e| Hac65Error::Usage(e.to_string()))?;

	if cli.help {
		return Err(Hac65Error::Help(report::VERSION_TEXT.to_string()));
	}
	if cli.version {
		return Err(Hac65Error::Help(report::VERSION_TEXT.to_string()));
	}

	let object_filename =
		cli.object.ok_or_else(|| Hac65Error::Usage("expected exactly one object file".to_string()))?;

	let mut builder = ConfigBuilder::new().object_filename(object_filename).illuminate(cli.illuminate);
	if let Some(architecture) = cli.architecture {
		builder = builder.architecture(architecture);
	}
	if let Some(start) = cli.start {
		builder = builder.start_position(flexint::parse_u16(&start)?);
	}
	if let Some(end) = cli.end {
		builder = builder.end_position(flexint::parse_u16(&end)?);
	}
	if let Some(origin) = cli.origin {
		builder = builder.origin_override(flexint::parse_u16(&origin)?);
	}
	if let Some(report_flags) = cli.report {
		builder = builder.report_flags(ReportFlags::parse(&report_flags)?);
	}

	let config: Config = builder.build()?;
	run_with_config(&config, args)
}

fn run_with_config(config: &Config, args: &[String]) -> Hac65Result<String> {
	let mut loader = Loader::new();
	loader.set_architecture(config.architecture.clone());
	loader.set_object_filename(config.object_filename.clone());
	if let Some(start) = config.start_position {
		loader.set_start_position(start);
	}
	if let Some(end) = config.end_position {
		loader.set_end_position(end);
	}

	let mut analyzer = Analyzer::new();
	if let Some(origin) = config.origin_override {
		analyzer.declare_origin_address(origin);
	}
	if config.illuminate {
		analyzer.set_illuminating_mode();
	}

	loader.load(&mut analyzer)?;
	analyzer.analyze()?;

	Ok(report::report(&loader, &analyzer, &command_text(args), &time_text(), &config.report_flags))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_object_file_is_a_usage_error() {
		let err = run(&["hac65".to_string()]).unwrap_err();
		assert!(matches!(err, Hac65Error::Usage(_)));
	}

	#[test]
	fn help_flag_short_circuits_with_exit_code_zero() {
		let err = run(&["hac65".to_string(), "-h".to_string()]).unwrap_err();
		assert_eq!(err.exit_code(), 0);
	}

	#[test]
	fn unknown_report_flag_is_a_usage_error() {
		let dir = tempfile::tempdir().unwrap();
		let object_path = dir.path().join("game.bin");
		std::fs::write(&object_path, [0xa9, 0x05, 0x60]).unwrap();
		let err = run(&[
			"hac65".to_string(),
			object_path.to_string_lossy().into_owned(),
			"-R".to_string(),
			"x".to_string(),
		])
		.unwrap_err();
		assert!(matches!(err, Hac65Error::Usage(_)));
	}

	#[test]
	fn end_to_end_run_produces_a_segments_report() {
		let dir = tempfile::tempdir().unwrap();
		let object_path = dir.path().join("game.bin");
		// Full address space so the built-in CPU vector table at $FFFA
		// falls inside the loaded image regardless of origin.
		let mut bytes = vec![0u8; 0x10000];
		bytes[0x0600] = 0xa9; // LDA #$05
		bytes[0x0601] = 0x05;
		bytes[0x0602] = 0x60; // RTS
		bytes[0xFFFC] = 0x00;
		bytes[0xFFFD] = 0x06;
		std::fs::write(&object_path, &bytes).unwrap();

		let text = run(&["hac65".to_string(), object_path.to_string_lossy().into_owned()]).unwrap();
		assert!(text.contains("Segments Report"));
	}
}
