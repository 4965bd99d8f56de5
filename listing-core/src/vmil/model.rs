//! The fixed VMIL opcode set and instruction shape.

use crate::address::Address;
use crate::instruction::{Instruction, Operand};

/// The broad category an opcode falls into. Informational; the emulator
/// dispatches on `Opcode` directly rather than on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeType {
	DataMovement,
	Arithmetic,
	ControlFlow,
}

/// The fixed VMIL opcode set. A native-to-VMIL lift always produces
/// instructions drawn from this set; there is no extensibility point,
/// which is what lets the emulator dispatch with an exhaustive match
/// instead of a lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
	Nop,
	Undef,
	Unkn,
	Add,
	Sub,
	Mul,
	Div,
	Mod,
	Lsh,
	Rsh,
	And,
	Or,
	Xor,
	Str,
	Ldm,
	Stm,
	Bisz,
	Jcc,
}

impl Opcode {
	pub const ALL: [Self; 18] = [
		Self::Nop,
		Self::Undef,
		Self::Unkn,
		Self::Add,
		Self::Sub,
		Self::Mul,
		Self::Div,
		Self::Mod,
		Self::Lsh,
		Self::Rsh,
		Self::And,
		Self::Or,
		Self::Xor,
		Self::Str,
		Self::Ldm,
		Self::Stm,
		Self::Bisz,
		Self::Jcc,
	];

	#[must_use]
	pub fn id(self) -> u32 {
		self as u32
	}

	#[must_use]
	pub fn from_id(id: u32) -> Option<Self> {
		Self::ALL.into_iter().find(|op| op.id() == id)
	}

	#[must_use]
	pub fn mnemonic(self) -> &'static str {
		match self {
			Self::Nop => "nop",
			Self::Undef => "undef",
			Self::Unkn => "unkn",
			Self::Add => "add",
			Self::Sub => "sub",
			Self::Mul => "mul",
			Self::Div => "div",
			Self::Mod => "mod",
			Self::Lsh => "lsh",
			Self::Rsh => "rsh",
			Self::And => "and",
			Self::Or => "or",
			Self::Xor => "xor",
			Self::Str => "str",
			Self::Ldm => "ldm",
			Self::Stm => "stm",
			Self::Bisz => "bisz",
			Self::Jcc => "jcc",
		}
	}

	#[must_use]
	pub fn kind(self) -> OpcodeType {
		match self {
			Self::Str | Self::Ldm | Self::Stm => OpcodeType::DataMovement,
			Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod | Self::Lsh | Self::Rsh
			| Self::And | Self::Or | Self::Xor | Self::Bisz => OpcodeType::Arithmetic,
			Self::Jcc => OpcodeType::ControlFlow,
			Self::Nop | Self::Undef | Self::Unkn => OpcodeType::DataMovement,
		}
	}
}

/// Build a single VMIL instruction at the synthetic address packing
/// `native`'s address with sub-index `i`.
#[must_use]
pub fn vmil_instruction(native: Address, i: u8, opcode: Opcode, operands: Vec<Operand>) -> Instruction {
	let mut instr = Instruction::new(Address::vmil(native, i), opcode.id(), opcode.mnemonic());
	for operand in operands {
		instr = instr.with_operand(operand);
	}
	instr
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn opcode_ids_round_trip() {
		for op in Opcode::ALL {
			assert_eq!(Opcode::from_id(op.id()), Some(op));
		}
	}

	#[test]
	fn unknown_id_has_no_opcode() {
		assert_eq!(Opcode::from_id(255), None);
	}
}
