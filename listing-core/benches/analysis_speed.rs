//! Benchmarks the two operations the rest of a disassembler sits on top
//! of: committing a listing and walking every function's control flow.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use listing_core::address::Address;
use listing_core::external::Processor;
use listing_core::instruction::{Instruction, Operand, TypeFlags};
use listing_core::listing::Listing;
use listing_core::paths::calculate_paths;
use listing_core::symbols::{Symbol, SymbolFlags, SymbolMap};

struct LinearProcessor;

impl Processor for LinearProcessor {
	fn target(&self, _instr: &Instruction) -> Option<Address> {
		None
	}
}

/// `count` independent 4-instruction functions, back to back.
fn build_listing(count: u64) -> (Listing, SymbolMap) {
	let mut listing = Listing::new();
	let mut symbols = SymbolMap::new();

	for i in 0..count {
		let base = i * 0x10;
		symbols.insert(Symbol::new(Address::new(base), format!("f{i}"), SymbolFlags::FUNCTION));
		listing.commit(
			Address::new(base),
			Instruction::new(Address::new(base), 0, "mov").with_flags(TypeFlags::CODE),
		);
		listing.commit(
			Address::new(base + 4),
			Instruction::new(Address::new(base + 4), 0, "add")
				.with_flags(TypeFlags::CODE)
				.with_operand(Operand::immediate(0, 1)),
		);
		listing.commit(
			Address::new(base + 8),
			Instruction::new(Address::new(base + 8), 0, "cmp").with_flags(TypeFlags::CODE),
		);
		listing.commit(
			Address::new(base + 12),
			Instruction::new(Address::new(base + 12), 0, "ret").with_flags(TypeFlags::STOP),
		);
	}
	(listing, symbols)
}

fn bench_commit(c: &mut Criterion) {
	let mut group = c.benchmark_group("listing_commit");
	for count in [100u64, 1_000, 10_000] {
		group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
			b.iter(|| build_listing(count));
		});
	}
	group.finish();
}

fn bench_calculate_paths(c: &mut Criterion) {
	let mut group = c.benchmark_group("calculate_paths");
	for count in [100u64, 1_000, 10_000] {
		let (listing, symbols) = build_listing(count);
		group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
			b.iter(|| calculate_paths(&listing, &symbols, Some(&LinearProcessor)));
		});
	}
	group.finish();
}

criterion_group!(benches, bench_commit, bench_calculate_paths);
criterion_main!(benches);
