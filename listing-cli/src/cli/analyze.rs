//! `analyze`: load a listing and its symbol table from disk, discover
//! function paths, and print a short report.
//!
//! Input format is deliberately minimal — this binary exists to exercise
//! `listing-core`, not to parse any particular disassembler's project
//! file. A listing file is a sequence of `[u32 length][bytes]` records,
//! each `bytes` a `listing_core::instruction::serialize`d instruction. A
//! symbols file is one `<hex-address> <FUNCTION|CODE|DATA> <name>` line
//! per symbol.

use std::path::PathBuf;

use clap::Args;
use listing_core::address::Address;
use listing_core::external::Processor;
use listing_core::instruction::{deserialize, Instruction};
use listing_core::listing::Listing;
use listing_core::paths::calculate_paths;
use listing_core::symbols::{Symbol, SymbolFlags, SymbolMap};
use thiserror::Error;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
	/// Path to a listing file (sequence of length-prefixed serialized instructions).
	#[arg(long)]
	pub listing: PathBuf,

	/// Path to a symbols file (`<hex-address> <flags> <name>` per line).
	#[arg(long)]
	pub symbols: Option<PathBuf>,

	/// Cap on instructions visited per function path.
	#[arg(long)]
	pub max_path_len: Option<usize>,
}

#[derive(Error, Debug)]
pub enum AnalyzeError {
	#[error("failed to read {path}: {source}")]
	Read { path: PathBuf, #[source] source: std::io::Error },

	#[error("malformed listing record in {path}: {source}")]
	Listing { path: PathBuf, #[source] source: listing_core::CoreError },

	#[error("malformed symbols file {path} at line {line}: {message}")]
	Symbols { path: PathBuf, line: usize, message: String },
}

/// No-`Processor` stand-in used when the caller supplies no symbol-aware
/// branch resolver; every indirect/unknown target resolves to `None`,
/// which per the core's contract degenerates `walk` to straight-line
/// fallthrough only.
struct NoProcessor;

impl Processor for NoProcessor {
	fn target(&self, _instr: &Instruction) -> Option<Address> {
		None
	}
}

fn load_listing(path: &std::path::Path, max_path_len: Option<usize>) -> Result<Listing, AnalyzeError> {
	let raw = std::fs::read(path).map_err(|source| AnalyzeError::Read { path: path.to_path_buf(), source })?;

	let mut listing = Listing::new();
	let mut pos = 0usize;
	let mut count = 0usize;
	while pos < raw.len() {
		if pos + 4 > raw.len() {
			break;
		}
		let len = u32::from_le_bytes(raw[pos..pos + 4].try_into().unwrap()) as usize;
		pos += 4;
		let end = pos + len;
		let record = &raw[pos..end];
		pos = end;

		let instr = deserialize(record)
			.map_err(|source| AnalyzeError::Listing { path: path.to_path_buf(), source })?;
		listing.commit(instr.address, instr);

		count += 1;
		if max_path_len.is_some_and(|max| count >= max) {
			warn!("stopped loading {} after {count} records (max_path_len reached)", path.display());
			break;
		}
	}
	Ok(listing)
}

fn load_symbols(path: &std::path::Path) -> Result<SymbolMap, AnalyzeError> {
	let text =
		std::fs::read_to_string(path).map_err(|source| AnalyzeError::Read { path: path.to_path_buf(), source })?;

	let mut symbols = SymbolMap::new();
	for (i, line) in text.lines().enumerate() {
		let line = line.trim();
		if line.is_empty() || line.starts_with('#') {
			continue;
		}
		let mut parts = line.splitn(3, char::is_whitespace);
		let addr_str = parts.next().unwrap_or_default();
		let flags_str = parts.next().unwrap_or_default();
		let name = parts.next().unwrap_or_default().trim();

		let addr = u64::from_str_radix(addr_str.trim_start_matches("0x"), 16).map_err(|e| {
			AnalyzeError::Symbols { path: path.to_path_buf(), line: i + 1, message: e.to_string() }
		})?;
		let flags = match flags_str {
			"FUNCTION" => SymbolFlags::FUNCTION,
			"CODE" => SymbolFlags::CODE,
			"DATA" => SymbolFlags::DATA,
			other => {
				return Err(AnalyzeError::Symbols {
					path: path.to_path_buf(),
					line: i + 1,
					message: format!("unknown symbol flag {other:?}"),
				});
			}
		};
		symbols.insert(Symbol::new(Address::new(addr), name, flags));
	}
	Ok(symbols)
}

pub async fn init(args: AnalyzeArgs) -> Result<(), AnalyzeError> {
	let listing = load_listing(&args.listing, args.max_path_len)?;
	let symbols = match &args.symbols {
		Some(path) => load_symbols(path)?,
		None => SymbolMap::new(),
	};

	info!("loaded {} instructions from {}", listing.len(), args.listing.display());

	let paths = calculate_paths(&listing, &symbols, Some(&NoProcessor));
	println!("discovered {} function path(s)", paths.len());
	for (entry, path) in paths.iter() {
		println!("  {:#010x}: {} instruction(s)", entry.value(), path.len());
	}

	Ok(())
}
