//! Shared fixtures for integration tests: a tiny `Processor` that reads
//! branch targets straight from an instruction's first operand, the way
//! the in-crate unit tests do.

use listing_core::address::Address;
use listing_core::external::Processor;
use listing_core::instruction::Instruction;

pub struct StaticProcessor;

impl Processor for StaticProcessor {
	fn target(&self, instr: &Instruction) -> Option<Address> {
		instr.operands.first().map(|op| Address::new(op.value))
	}
}
