//! Report rendering (§4.11): four independently selectable sections over an
//! analyzed image, grounded in the original `Reporter` class's column layout.
//!
//! Every section is built into one `String` rather than threaded through an
//! `io::Write` -- nothing here can fail, so there's no error to propagate,
//! and the caller can print or test the result directly.

use crate::analyzer::decode::branch_target;
use crate::analyzer::Analyzer;
use crate::common::{Address, AddressMode, Instruction, Octet, Opcode, SegmentType};
use crate::config::ReportFlags;
use crate::loader::Loader;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Program name and release, printed in the report header.
pub const VERSION_TEXT: &str = "HAC/65 v0.5 6502 Inferencing Disassembler";

const MAX_LABEL_LENGTH: usize = 14;

fn address_to_string(analyzer: &Analyzer, address: Address, opcode: Option<Opcode>, is_symbolic: bool) -> String {
	let Some(opcode) = opcode else {
		return format!("{address:04X}");
	};
	let info = analyzer.lookup_opcode_info(opcode).expect("address_to_string is only called with legal opcodes");
	let mode = info.address_mode;

	let label =
		if is_symbolic && mode != AddressMode::Immediate { analyzer.lookup_label(address, Some(info.memory_operation)) } else { None };
	if let Some(label) = label {
		return label;
	}

	if mode != AddressMode::Immediate || address > 9 {
		let width = match mode {
			AddressMode::Absolute | AddressMode::AbsoluteX | AddressMode::AbsoluteY | AddressMode::Indirect => 4,
			_ => 2,
		};
		format!("${:0width$X}", address, width = width)
	} else {
		format!("{address:X}")
	}
}

fn segment_type_to_string(segment_type: SegmentType) -> &'static str {
	match segment_type {
		SegmentType::CodeDark => "code_dark",
		SegmentType::CodeInferred => "code_inferred",
		SegmentType::CodeKnown => "code_known",
		SegmentType::DataInferred => "data_inferred",
		SegmentType::DataKnown => "data_known",
	}
}

fn stream_label(analyzer: &Analyzer, address: Address) -> String {
	let mut label = analyzer.lookup_label(address, None).unwrap_or_default();
	if label.len() > MAX_LABEL_LENGTH {
		label.truncate(MAX_LABEL_LENGTH);
		label.push('/');
	}
	format!("{label:<width$}", width = MAX_LABEL_LENGTH + 2)
}

fn stream_octets(octets: &[Octet]) -> String {
	(0..3)
		.map(|i| match octets.get(i) {
			Some(octet) => format!("{octet:02X}"),
			None => "  ".to_string(),
		})
		.collect::<Vec<_>>()
		.join(" ")
}

fn stream_instruction(analyzer: &Analyzer, address: Address, instruction: &Instruction) -> String {
	let mut out = String::new();
	let mode_info = analyzer.lookup_address_mode_info(instruction.opcode_info.address_mode);
	let _ = write!(out, "{} {}", instruction.opcode_info.mnemonic, mode_info.operand_prefix);

	if instruction.opcode_info.address_mode == AddressMode::Immediate {
		let address_text = address_to_string(analyzer, instruction.operand, Some(instruction.opcode), false);
		let _ = write!(out, "{address_text:<8}");
		let equates = analyzer.lookup_equate(instruction.operand);
		if !equates.is_empty() {
			out.push(';');
			let names: Vec<String> = equates.iter().map(|e| format!("{e}?")).collect();
			out.push_str(&names.join(", "));
		}
	} else {
		let operand = if instruction.opcode_info.address_mode == AddressMode::Relative {
			branch_target(address, instruction.opcode_info.address_mode, instruction.operand)
		} else {
			instruction.operand
		};
		if mode_info.operand_size > 0 {
			out.push_str(&address_to_string(analyzer, operand, Some(instruction.opcode), true));
		}
	}

	out.push_str(mode_info.operand_suffix);
	out
}

fn stream_origin(analyzer: &Analyzer) -> String {
	format!("{:>37}{}\n", "*= $", address_to_string(analyzer, analyzer.origin_address(), None, false))
}

/// Disassemble one instruction into its raw byte columns and cooked
/// mnemonic text, returning the instruction's total size in octets.
fn disassemble_instruction(analyzer: &Analyzer, address: Address, instruction: &Instruction) -> (String, String, usize) {
	let origin = analyzer.origin_address();
	let assembly = analyzer.assembly();
	let mode_info = analyzer.lookup_address_mode_info(instruction.opcode_info.address_mode);
	let size = 1 + mode_info.operand_size as usize;
	let start = usize::from(address.wrapping_sub(origin));
	let octets = &assembly[start..start + size];
	(stream_octets(octets), stream_instruction(analyzer, address, instruction), size)
}

fn fingerprint_hex(analyzer: &Analyzer, segment: &crate::common::Segment) -> String {
	if segment.is_code() { analyzer.fingerprint_code_segment(segment).to_hex() } else { analyzer.fingerprint_data_segment(segment).to_hex() }
}

fn stream_code_segment(out: &mut String, analyzer: &Analyzer, start: Address, end: Address) {
	for (&address, instruction) in analyzer.instructions().range(start..=end) {
		let (raw, cooked, _) = disassemble_instruction(analyzer, address, instruction);
		let _ = writeln!(
			out,
			"{}  {}  {} {}",
			address_to_string(analyzer, address, None, false),
			raw,
			stream_label(analyzer, address),
			cooked
		);
	}
}

fn stream_data_segment(out: &mut String, analyzer: &Analyzer, start: Address, end: Address) {
	let origin = analyzer.origin_address();
	let assembly = analyzer.assembly();
	let mut location = start;
	let mut column = 0usize;
	loop {
		let octet = assembly[usize::from(location.wrapping_sub(origin))];
		let _ = write!(out, "{octet:02X}");
		column += 1;
		if location == end || column % 16 == 0 {
			out.push('\n');
		} else {
			out.push(' ');
		}
		if location == end {
			break;
		}
		location = location.wrapping_add(1);
	}
}

fn report_disassembly(out: &mut String, analyzer: &Analyzer) {
	let mut raw: BTreeMap<Address, String> = BTreeMap::new();
	let mut cooked: BTreeMap<Address, String> = BTreeMap::new();

	let mut instruction_count = 0usize;
	let mut instruction_octets = 0usize;
	for (&address, instruction) in analyzer.instructions() {
		let (raw_line, cooked_line, size) = disassemble_instruction(analyzer, address, instruction);
		raw.insert(address, raw_line);
		cooked.insert(address, cooked_line);
		instruction_count += 1;
		instruction_octets += size;
	}

	let origin = analyzer.origin_address();
	let assembly = analyzer.assembly();

	let mut illegal_octets = 0usize;
	for (&address, &opcode) in analyzer.illegals() {
		illegal_octets += 1;
		let _ = opcode;
		raw.insert(address, stream_octets(&[assembly[usize::from(address.wrapping_sub(origin))]]));
		cooked.insert(address, "???".to_string());
	}

	let mut data_octets = 0usize;
	for &address in analyzer.data().keys() {
		data_octets += 1;
		let octet = assembly[usize::from(address.wrapping_sub(origin))];
		raw.insert(address, stream_octets(&[octet]));
		cooked.insert(address, format!(".BYTE ${octet:02X}"));
	}

	let _ = write!(
		out,
		"\nDisassembly Report\n------------------\nAssembly size (bytes) : {}\n  Instruction         : {}\n  Illegal instruction : {}\n  Data                : {}\nInstructions (count)  : {}\n\n",
		assembly.len(),
		instruction_octets,
		illegal_octets,
		data_octets,
		instruction_count
	);
	out.push_str(&stream_origin(analyzer));
	out.push('\n');

	for (address, raw_line) in &raw {
		let cooked_line = &cooked[address];
		let _ = writeln!(
			out,
			"{}  {}  {} {}",
			address_to_string(analyzer, *address, None, false),
			raw_line,
			stream_label(analyzer, *address),
			cooked_line
		);
	}
}

fn report_fingerprints(out: &mut String, analyzer: &Analyzer) {
	let segments = analyzer.segments();
	let _ = write!(
		out,
		"\nFingerprints Report\n-------------------\nAssembly size (bytes) : {}\nSegments (count)      : {}\n\n",
		analyzer.assembly().len(),
		segments.len()
	);

	let mut sorted = std::collections::BTreeSet::new();
	for segment in segments.values() {
		let line = format!(
			"{} #{:<4} {:<13} {} {}\n",
			fingerprint_hex(analyzer, segment),
			segment.ordinal,
			segment_type_to_string(segment.segment_type),
			address_to_string(analyzer, segment.start_address, None, false),
			stream_label(analyzer, segment.start_address)
		);
		sorted.insert(line);
	}
	for line in sorted {
		out.push_str(&line);
	}
}

fn report_overlays(out: &mut String, loader: &Loader) {
	let overlays = loader.overlays();
	let _ = write!(out, "\nOverlays Report\n---------------\nOverlays (count) : {}\n", overlays.len());
	for (architecture, json) in overlays {
		let pretty = serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string());
		let _ = write!(out, "\n# {architecture}:\n{pretty}\n");
	}
}

fn report_segments(out: &mut String, analyzer: &Analyzer) {
	let segments = analyzer.segments();
	let mut code_dark = 0u32;
	let mut code_inferred = 0u32;
	let mut code_known = 0u32;
	let mut data_inferred = 0u32;
	let mut data_known = 0u32;
	for segment in segments.values() {
		match segment.segment_type {
			SegmentType::CodeDark => code_dark += 1,
			SegmentType::CodeInferred => code_inferred += 1,
			SegmentType::CodeKnown => code_known += 1,
			SegmentType::DataInferred => data_inferred += 1,
			SegmentType::DataKnown => data_known += 1,
		}
	}

	let _ = write!(
		out,
		"\nSegments Report\n---------------\nAssembly size (bytes) : {}\nSegments (count)      : {}\n  Known Code          : {}\n  Inferred Code       : {}\n  Dark Code           : {}\n  Known Data          : {}\n  Inferred Data       : {}\n\n",
		analyzer.assembly().len(),
		segments.len(),
		code_known,
		code_inferred,
		code_dark,
		data_known,
		data_inferred
	);
	out.push_str(&stream_origin(analyzer));

	for segment in segments.values() {
		let _ = write!(
			out,
			"\n#{} {}-{} {} {}\n",
			segment.ordinal,
			address_to_string(analyzer, segment.start_address, None, false),
			address_to_string(analyzer, segment.end_address, None, false),
			segment_type_to_string(segment.segment_type),
			fingerprint_hex(analyzer, segment)
		);
		if segment.is_code() {
			stream_code_segment(out, analyzer, segment.start_address, segment.end_address);
		} else {
			stream_data_segment(out, analyzer, segment.start_address, segment.end_address);
		}
	}
}

fn report_header(out: &mut String, loader: &Loader, command_text: &str, time_text: &str) {
	let md5 = loader.object_md5().map(|f| f.to_hex()).unwrap_or_default();
	let _ = write!(out, "{VERSION_TEXT} [run:{time_text}]\n{command_text}[md5:{md5}]\n\nArchitecture Overlays:\n");
	for (architecture, _) in loader.overlays() {
		let _ = writeln!(out, "    {architecture}");
	}
}

/// Render the requested report sections, in the order given, over an
/// analyzed image. A header always precedes the sections.
#[must_use]
pub fn report(loader: &Loader, analyzer: &Analyzer, command_text: &str, time_text: &str, flags: &ReportFlags) -> String {
	let mut out = String::new();
	report_header(&mut out, loader, command_text, time_text);

	for section in flags.sections() {
		match section {
			'd' => report_disassembly(&mut out, analyzer),
			'f' => report_fingerprints(&mut out, analyzer),
			'o' => report_overlays(&mut out, loader),
			's' => report_segments(&mut out, analyzer),
			_ => unreachable!("ReportFlags::parse rejects any character outside sdfo"),
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn analyzer_with_simple_program() -> Analyzer {
		let mut analyzer = Analyzer::new();
		// RESET vector -> $0600; LDA #$05; RTS.
		let mut assembly = vec![0u8; 0x10000];
		assembly[0x0600] = 0xa9; // LDA #
		assembly[0x0601] = 0x05;
		assembly[0x0602] = 0x60; // RTS
		assembly[0xFFFC] = 0x00;
		assembly[0xFFFD] = 0x06;
		analyzer.set_assembly(assembly);
		analyzer.declare_vector_table(crate::analyzer::VectorTableKind::Normal, 0xFFFC, 1);
		analyzer.analyze().unwrap();
		analyzer
	}

	#[test]
	fn report_includes_the_requested_sections_in_order() {
		let analyzer = analyzer_with_simple_program();
		let loader = Loader::new();
		let flags = ReportFlags::parse("ds").unwrap();
		let text = report(&loader, &analyzer, "hac65 game.bin", "a time", &flags);
		let disassembly_pos = text.find("Disassembly Report").unwrap();
		let segments_pos = text.find("Segments Report").unwrap();
		assert!(disassembly_pos < segments_pos);
	}

	#[test]
	fn header_includes_version_and_command_text() {
		let analyzer = analyzer_with_simple_program();
		let loader = Loader::new();
		let flags = ReportFlags::parse("s").unwrap();
		let text = report(&loader, &analyzer, "hac65 game.bin", "a time", &flags);
		assert!(text.starts_with(VERSION_TEXT));
		assert!(text.contains("hac65 game.bin"));
	}

	#[test]
	fn fingerprints_report_sorts_lines_by_hash_not_address() {
		let analyzer = analyzer_with_simple_program();
		let loader = Loader::new();
		let flags = ReportFlags::parse("f").unwrap();
		let text = report(&loader, &analyzer, "hac65 game.bin", "a time", &flags);
		let is_hex_digit = |c: char| c.is_ascii_hexdigit();
		let hash_lines: Vec<&str> =
			text.lines().filter(|l| l.len() > 32 && l.chars().take(32).all(is_hex_digit) && l.as_bytes()[32] == b' ').collect();
		let mut sorted = hash_lines.clone();
		sorted.sort_unstable();
		assert_eq!(hash_lines, sorted);
	}

	#[test]
	fn immediate_operand_annotates_a_registered_equate() {
		let mut analyzer = analyzer_with_simple_program();
		analyzer.declare_equate("FIVE", 5);
		let instruction = *analyzer.instructions().get(&0x0600).unwrap();
		let cooked = stream_instruction(&analyzer, 0x0600, &instruction);
		assert!(cooked.contains("FIVE?"));
	}

	#[test]
	fn small_immediate_values_omit_the_dollar_prefix() {
		let analyzer = analyzer_with_simple_program();
		let instruction = *analyzer.instructions().get(&0x0600).unwrap();
		let cooked = stream_instruction(&analyzer, 0x0600, &instruction);
		assert!(cooked.starts_with("LDA #5"));
	}
}
