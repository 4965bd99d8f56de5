//! Cross-module scenarios combining `Listing`, `paths`, and `symbols` —
//! the S1–S4 concrete scenarios plus the path-closure and idempotence
//! properties, exercised through the public API only.

mod common;

use common::StaticProcessor;
use listing_core::address::Address;
use listing_core::instruction::{Instruction, Operand, TypeFlags};
use listing_core::listing::Listing;
use listing_core::paths::{calculate_paths, find_function, get_signature, iterate_function_simple, walk};
use listing_core::symbols::{Symbol, SymbolFlags, SymbolMap};

fn two_function_listing() -> (Listing, SymbolMap) {
	let mut listing = Listing::new();

	// f1: linear body ending in a conditional branch back into itself,
	// then falling through to a second, unrelated function f2.
	listing.commit(
		Address::new(0x100),
		Instruction::new(Address::new(0x100), 0, "mov").with_flags(TypeFlags::CODE),
	);
	listing.commit(
		Address::new(0x104),
		Instruction::new(Address::new(0x104), 0, "jz")
			.with_flags(TypeFlags::JUMP | TypeFlags::CONDITIONAL)
			.with_operand(Operand::displacement(0, 0x100)),
	);
	listing.commit(
		Address::new(0x108),
		Instruction::new(Address::new(0x108), 0, "ret").with_flags(TypeFlags::STOP),
	);

	listing.commit(
		Address::new(0x200),
		Instruction::new(Address::new(0x200), 0, "ret").with_flags(TypeFlags::STOP),
	);

	let mut symbols = SymbolMap::new();
	symbols.insert(Symbol::new(Address::new(0x100), "f1", SymbolFlags::FUNCTION));
	symbols.insert(Symbol::new(Address::new(0x200), "f2", SymbolFlags::FUNCTION));
	(listing, symbols)
}

#[test]
fn walk_follows_a_backward_conditional_edge_without_crossing_into_the_next_function() {
	let (listing, symbols) = two_function_listing();
	let path = walk(&listing, &symbols, Some(&StaticProcessor), Address::new(0x100));
	let addrs: Vec<_> = path.iter().collect();
	assert_eq!(addrs, vec![Address::new(0x100), Address::new(0x104), Address::new(0x108)]);
	assert!(!path.contains(Address::new(0x200)));
}

#[test]
fn calculate_paths_discovers_every_function_symbol_independently() {
	let (listing, symbols) = two_function_listing();
	let paths = calculate_paths(&listing, &symbols, Some(&StaticProcessor));
	assert_eq!(paths.len(), 2);
	assert!(find_function(&paths, Address::new(0x104)).is_some());
	assert!(find_function(&paths, Address::new(0x200)).is_some());
}

#[test]
fn calculate_paths_is_idempotent_across_the_whole_listing() {
	let (listing, symbols) = two_function_listing();
	let a = calculate_paths(&listing, &symbols, Some(&StaticProcessor));
	let b = calculate_paths(&listing, &symbols, Some(&StaticProcessor));
	for (entry, path) in a.iter() {
		assert_eq!(path, b.get(*entry).unwrap());
	}
}

#[test]
fn iterate_function_visits_addresses_in_ascending_order() {
	let (listing, symbols) = two_function_listing();
	let paths = calculate_paths(&listing, &symbols, Some(&StaticProcessor));

	let mut visited = Vec::new();
	let found = iterate_function_simple(&listing, &symbols, &paths, Address::new(0x108), &mut |instr| {
		visited.push(instr.address);
	});
	assert!(found);
	assert_eq!(visited, vec![Address::new(0x100), Address::new(0x104), Address::new(0x108)]);
}

#[test]
fn get_signature_concatenates_each_instructions_signature_in_path_order() {
	let mut listing = Listing::new();
	listing.commit(
		Address::new(0x100),
		Instruction::new(Address::new(0x100), 0, "mov").with_signature("M").with_flags(TypeFlags::CODE),
	);
	listing.commit(
		Address::new(0x104),
		Instruction::new(Address::new(0x104), 0, "ret").with_signature("R").with_flags(TypeFlags::STOP),
	);
	let mut symbols = SymbolMap::new();
	symbols.insert(Symbol::new(Address::new(0x100), "f", SymbolFlags::FUNCTION));

	let paths = calculate_paths(&listing, &symbols, Some(&StaticProcessor));
	assert_eq!(get_signature(&listing, &paths, Address::new(0x100)), "MR");
}

#[test]
fn get_signature_of_an_address_outside_any_path_is_empty() {
	let (listing, symbols) = two_function_listing();
	let paths = calculate_paths(&listing, &symbols, Some(&StaticProcessor));
	assert_eq!(get_signature(&listing, &paths, Address::new(0xdead)), "");
}

#[test]
fn cursor_skips_gaps_between_committed_addresses() {
	let mut listing = Listing::new();
	listing.commit(Address::new(0x10), Instruction::new(Address::new(0x10), 0, "a"));
	listing.commit(Address::new(0x40), Instruction::new(Address::new(0x40), 0, "b"));

	let cursor = listing.find(Address::new(0x10));
	assert_eq!(cursor.address(), Some(Address::new(0x10)));

	let next = cursor.next();
	assert_eq!(next.address(), Some(Address::new(0x40)));

	let end = next.next();
	assert!(end.is_end());
}
