//! Function-path discovery and the listing traversal API (§4.3–§4.5).

use std::collections::{BTreeMap, BTreeSet};

use crate::address::Address;
use crate::external::Processor;
use crate::instruction::{Instruction, TypeFlags};
use crate::listing::{CacheBacking, Listing};
use crate::symbols::{Symbol, SymbolFlags, SymbolTable};

/// The set of addresses belonging to one function, discovered by [`walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionPath {
	entry: Address,
	addresses: BTreeSet<Address>,
}

impl FunctionPath {
	fn empty(entry: Address) -> Self {
		Self { entry, addresses: BTreeSet::new() }
	}

	#[must_use]
	pub fn entry(&self) -> Address {
		self.entry
	}

	#[must_use]
	pub fn contains(&self, addr: Address) -> bool {
		self.addresses.contains(&addr)
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.addresses.is_empty()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.addresses.len()
	}

	/// Ascending iteration over the path's addresses.
	pub fn iter(&self) -> impl Iterator<Item = Address> + '_ {
		self.addresses.iter().copied()
	}

	fn min(&self) -> Option<Address> {
		self.addresses.iter().next().copied()
	}

	fn max(&self) -> Option<Address> {
		self.addresses.iter().next_back().copied()
	}
}

/// `FunctionPaths`: mapping function-entry-address → `FunctionPath`,
/// populated only by [`calculate_paths`].
#[derive(Debug, Clone, Default)]
pub struct FunctionPaths {
	paths: BTreeMap<Address, FunctionPath>,
}

impl FunctionPaths {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	fn insert(&mut self, path: FunctionPath) {
		self.paths.insert(path.entry, path);
	}

	#[must_use]
	pub fn get(&self, entry: Address) -> Option<&FunctionPath> {
		self.paths.get(&entry)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&Address, &FunctionPath)> {
		self.paths.iter()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.paths.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.paths.is_empty()
	}
}

/// Discover the set of instruction addresses reachable from `entry` by
/// following control-flow edges within that function (§4.3).
///
/// A no-op returning an empty path if `processor` is absent — the
/// documented neutral default for the missing-dependency case (§7).
#[must_use]
pub fn walk<B: CacheBacking>(
	listing: &Listing<B>,
	symbols: &dyn SymbolTable,
	processor: Option<&dyn Processor>,
	entry: Address,
) -> FunctionPath {
	let Some(processor) = processor else {
		return FunctionPath::empty(entry);
	};

	let mut addresses = BTreeSet::new();
	walk_from(listing, symbols, processor, entry, &mut addresses);
	FunctionPath { entry, addresses }
}

fn walk_from<B: CacheBacking>(
	listing: &Listing<B>,
	symbols: &dyn SymbolTable,
	processor: &dyn Processor,
	addr: Address,
	path: &mut BTreeSet<Address>,
) {
	if !listing.contains(addr) || path.contains(&addr) {
		return;
	}
	path.insert(addr);

	let Ok(instr) = listing.get(addr) else { return };

	if instr.is(TypeFlags::STOP) {
		return;
	}

	if instr.is(TypeFlags::JUMP) {
		if let Some(target) = processor.target(instr) {
			let sym = symbols.symbol(target);
			let target_is_function = sym.is_some_and(Symbol::is_function);
			if !target_is_function && listing.contains(target) {
				walk_from(listing, symbols, processor, target, path);
			}
		}
		if !instr.is(TypeFlags::CONDITIONAL) {
			return;
		}
	}

	if let Some(next) = successor_of(listing, addr) {
		let next_is_function_start = symbols.symbol(next).is_some_and(Symbol::is_function);
		if !next_is_function_start {
			walk_from(listing, symbols, processor, next, path);
		}
	}
}

fn successor_of<B: CacheBacking>(listing: &Listing<B>, addr: Address) -> Option<Address> {
	listing.find(addr).next().address()
}

/// Run [`walk`] for every symbol matching the function mask.
#[must_use]
pub fn calculate_paths<B: CacheBacking>(
	listing: &Listing<B>,
	symbols: &dyn SymbolTable,
	processor: Option<&dyn Processor>,
) -> FunctionPaths {
	let mut entries = Vec::new();
	symbols.iterate(SymbolFlags::FUNCTION, &mut |sym| {
		entries.push(sym.address);
		true
	});

	let mut paths = FunctionPaths::new();
	for entry in entries {
		let path = walk(listing, symbols, processor, entry);
		if !path.is_empty() {
			paths.insert(path);
		}
	}
	paths
}

/// Resolve `addr` to the function path it belongs to.
///
/// Direct lookup first; otherwise a linear scan using each path's
/// `[min, max]` range as a fast reject before confirming membership
/// (paths are not necessarily contiguous, §4.4).
#[must_use]
pub fn find_function(paths: &FunctionPaths, addr: Address) -> Option<&FunctionPath> {
	if let Some(path) = paths.get(addr) {
		return Some(path);
	}
	paths.iter().map(|(_, path)| path).find(|path| match (path.min(), path.max()) {
		(Some(lo), Some(hi)) => addr >= lo && addr <= hi && path.contains(addr),
		_ => false,
	})
}

/// Walk `path` in ascending order, invoking `cb_instr` for every
/// instruction, with optional start/end/label callbacks (§4.4).
///
/// Returns `false` if `addr` resolves to no function path.
pub fn iterate_function<B: CacheBacking>(
	listing: &Listing<B>,
	symbols: &dyn SymbolTable,
	paths: &FunctionPaths,
	addr: Address,
	cb_instr: &mut dyn FnMut(&Instruction),
	mut cb_start: Option<&mut dyn FnMut(&Symbol)>,
	mut cb_end: Option<&mut dyn FnMut(&Instruction)>,
	mut cb_label: Option<&mut dyn FnMut(&Symbol)>,
) -> bool {
	let Some(path) = find_function(paths, addr) else {
		return false;
	};

	if let Some(sym) = symbols.symbol(path.entry()) {
		if sym.is_function() {
			if let Some(cb) = cb_start.as_deref_mut() {
				cb(sym);
			}
		}
	}

	let mut last: Option<&Instruction> = None;
	for a in path.iter() {
		if let Some(sym) = symbols.symbol(a) {
			if sym.flags.contains(SymbolFlags::CODE) && !sym.is_function() {
				if let Some(cb) = cb_label.as_deref_mut() {
					cb(sym);
				}
			}
		}
		if let Ok(instr) = listing.get(a) {
			cb_instr(instr);
			last = Some(instr);
		}
	}

	if let Some(instr) = last {
		if let Some(cb) = cb_end.as_deref_mut() {
			cb(instr);
		}
	}

	true
}

/// `iterateFunction` with no start/end/label callbacks.
pub fn iterate_function_simple<B: CacheBacking>(
	listing: &Listing<B>,
	symbols: &dyn SymbolTable,
	paths: &FunctionPaths,
	addr: Address,
	cb_instr: &mut dyn FnMut(&Instruction),
) -> bool {
	iterate_function(listing, symbols, paths, addr, cb_instr, None, None, None)
}

/// Enumerate all function symbols and call [`iterate_function`] for each,
/// in the symbol table's iteration order.
pub fn iterate_all<B: CacheBacking>(
	listing: &Listing<B>,
	symbols: &dyn SymbolTable,
	paths: &FunctionPaths,
	mut cb_instr: impl FnMut(&Instruction),
	mut cb_start: impl FnMut(&Symbol),
	mut cb_end: impl FnMut(&Instruction),
	mut cb_label: impl FnMut(&Symbol),
) {
	let mut entries = Vec::new();
	symbols.iterate(SymbolFlags::FUNCTION, &mut |sym| {
		entries.push(sym.address);
		true
	});

	for addr in entries {
		iterate_function(
			listing,
			symbols,
			paths,
			addr,
			&mut cb_instr,
			Some(&mut cb_start),
			Some(&mut cb_end),
			Some(&mut cb_label),
		);
	}
}

/// Concatenation, in ascending address order, of the `signature` field of
/// every instruction in `addr`'s function path; empty if no path exists
/// (§4.5).
#[must_use]
pub fn get_signature<B: CacheBacking>(listing: &Listing<B>, paths: &FunctionPaths, addr: Address) -> String {
	match find_function(paths, addr) {
		Some(path) => path.iter().filter_map(|a| listing.get(a).ok()).map(|i| i.signature.as_str()).collect(),
		None => String::new(),
	}
}
