//! Per-native-instruction lifters, emitting VMIL sequences (§4.8).

use std::collections::HashMap;

use crate::address::Address;
use crate::instruction::{Instruction, MemoryOperand, Operand, RegisterId};

use super::model::{vmil_instruction, Opcode};

/// The temporary register lifters reach for by convention; configurable
/// per call for lifters that need more than one scratch register.
pub const DEFAULT_TEMP_REGISTER: u32 = 0;

/// A lifter for one native opcode id: appends zero or more VMIL
/// instructions to `out`. Native ids come from an external decoder
/// plugin and are open-ended, unlike the fixed VMIL opcode set, so the
/// table is keyed by a plain map rather than dispatched with a match.
pub type Lifter = fn(native: &Instruction, out: &mut Vec<Instruction>);

/// `native_id → lifter` table. Lifting a native instruction with no
/// registered lifter, or whose lifter emits nothing, yields a single
/// `Unkn` VMIL instruction carrying the native bytes as a diagnostic
/// comment.
#[derive(Default)]
pub struct Translator {
	table: HashMap<u32, Lifter>,
}

impl Translator {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, native_id: u32, lifter: Lifter) {
		self.table.insert(native_id, lifter);
	}

	#[must_use]
	pub fn translate(&self, native: &Instruction) -> Vec<Instruction> {
		let mut out = Vec::new();
		if let Some(lifter) = self.table.get(&native.id) {
			lifter(native, &mut out);
		}
		if out.is_empty() {
			out.push(unknown_lift(native));
		}
		out
	}
}

fn unknown_lift(native: &Instruction) -> Instruction {
	let bytes_hex = native
		.bytes
		.as_deref()
		.map(|bytes| bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
		.unwrap_or_default();
	vmil_instruction(native.address, 0, Opcode::Unkn, Vec::new())
		.with_comment(format!("no lifter for native id {} (bytes {bytes_hex})", native.id))
}

/// Emit `Str T0, b`, then `Add T0, T0, d` (or `Sub T0, T0, |d|` if
/// negative) when `d ≠ 0`; returns `T0`.
pub fn create_mem_disp(
	native: Address,
	sub_index: &mut u8,
	mem: MemoryOperand,
	out: &mut Vec<Instruction>,
	temp: u32,
) -> RegisterId {
	let t0 = RegisterId::Temp(temp);
	let base_operand = match mem.base {
		Some(base) => Operand::register(1, base),
		None => Operand::immediate(1, 0),
	};
	out.push(emit(native, sub_index, Opcode::Str, vec![Operand::register(0, t0), base_operand]));

	match mem.displacement {
		0 => {}
		d if d > 0 => out.push(emit(
			native,
			sub_index,
			Opcode::Add,
			vec![Operand::register(0, t0), Operand::register(1, t0), Operand::immediate(2, d as u64)],
		)),
		d => out.push(emit(
			native,
			sub_index,
			Opcode::Sub,
			vec![
				Operand::register(0, t0),
				Operand::register(1, t0),
				Operand::immediate(2, d.unsigned_abs()),
			],
		)),
	}

	t0
}

/// `Xor T0, a, b`; `Bisz T0, T0`; returns an unappended `branch_op`
/// instruction that reads `T0` as a condition true iff `a == b`.
pub fn create_eq(
	native: Address,
	sub_index: &mut u8,
	a: Operand,
	b: Operand,
	out: &mut Vec<Instruction>,
	branch_op: Opcode,
	temp: u32,
) -> Instruction {
	let t0 = RegisterId::Temp(temp);
	out.push(emit(native, sub_index, Opcode::Xor, vec![Operand::register(0, t0), a, b]));
	out.push(emit(native, sub_index, Opcode::Bisz, vec![Operand::register(0, t0), Operand::register(1, t0)]));
	emit(native, sub_index, branch_op, vec![Operand::register(0, t0)])
}

/// As [`create_eq`] but omits the `Bisz`, so the returned branch reads
/// true iff `a != b`.
pub fn create_neq(
	native: Address,
	sub_index: &mut u8,
	a: Operand,
	b: Operand,
	out: &mut Vec<Instruction>,
	branch_op: Opcode,
	temp: u32,
) -> Instruction {
	let t0 = RegisterId::Temp(temp);
	out.push(emit(native, sub_index, Opcode::Xor, vec![Operand::register(0, t0), a, b]));
	emit(native, sub_index, branch_op, vec![Operand::register(0, t0)])
}

fn emit(native: Address, sub_index: &mut u8, opcode: Opcode, operands: Vec<Operand>) -> Instruction {
	let instr = vmil_instruction(native, *sub_index, opcode, operands);
	*sub_index = sub_index.wrapping_add(1);
	instr
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::instruction::TypeFlags;

	fn add_r0_r1_r2(native: &Instruction, out: &mut Vec<Instruction>) {
		let mut sub_index = 0u8;
		out.push(emit(
			native.address,
			&mut sub_index,
			Opcode::Add,
			vec![
				Operand::register(0, RegisterId::Machine(0)),
				Operand::register(1, RegisterId::Machine(1)),
				Operand::register(2, RegisterId::Machine(2)),
			],
		));
	}

	#[test]
	fn s5_registered_lifter_emits_expected_sequence() {
		let mut translator = Translator::new();
		translator.register(1, add_r0_r1_r2);

		let native = Instruction::new(Address::new(0x10), 1, "add").with_flags(TypeFlags::CODE);
		let vmil = translator.translate(&native);

		assert_eq!(vmil.len(), 1);
		assert_eq!(vmil[0].id, Opcode::Add.id());
		assert_eq!(vmil[0].operands.len(), 3);
	}

	#[test]
	fn missing_lifter_falls_back_to_unkn() {
		let translator = Translator::new();
		let native = Instruction::new(Address::new(0x10), 99, "???").with_bytes(vec![0xde, 0xad]);
		let vmil = translator.translate(&native);
		assert_eq!(vmil.len(), 1);
		assert_eq!(vmil[0].id, Opcode::Unkn.id());
		assert!(vmil[0].comments[0].contains("dead"));
	}

	#[test]
	fn create_mem_disp_emits_str_and_add_for_positive_displacement() {
		let mut out = Vec::new();
		let mut sub_index = 0u8;
		let mem = MemoryOperand { base: Some(RegisterId::Machine(3)), index: None, scale: 1, displacement: 8 };
		let t0 = create_mem_disp(Address::new(0x20), &mut sub_index, mem, &mut out, DEFAULT_TEMP_REGISTER);

		assert_eq!(t0, RegisterId::Temp(DEFAULT_TEMP_REGISTER));
		assert_eq!(out.len(), 2);
		assert_eq!(out[0].id, Opcode::Str.id());
		assert_eq!(out[1].id, Opcode::Add.id());
	}

	#[test]
	fn create_mem_disp_emits_only_str_for_zero_displacement() {
		let mut out = Vec::new();
		let mut sub_index = 0u8;
		let mem = MemoryOperand { base: Some(RegisterId::Machine(3)), index: None, scale: 1, displacement: 0 };
		create_mem_disp(Address::new(0x20), &mut sub_index, mem, &mut out, DEFAULT_TEMP_REGISTER);
		assert_eq!(out.len(), 1);
	}

	#[test]
	fn create_eq_emits_xor_then_bisz_then_branch() {
		let mut out = Vec::new();
		let mut sub_index = 0u8;
		let branch = create_eq(
			Address::new(0x30),
			&mut sub_index,
			Operand::register(0, RegisterId::Machine(0)),
			Operand::register(1, RegisterId::Machine(1)),
			&mut out,
			Opcode::Jcc,
			DEFAULT_TEMP_REGISTER,
		);
		assert_eq!(out.len(), 2);
		assert_eq!(out[0].id, Opcode::Xor.id());
		assert_eq!(out[1].id, Opcode::Bisz.id());
		assert_eq!(branch.id, Opcode::Jcc.id());
	}

	#[test]
	fn create_neq_omits_bisz() {
		let mut out = Vec::new();
		let mut sub_index = 0u8;
		create_neq(
			Address::new(0x30),
			&mut sub_index,
			Operand::register(0, RegisterId::Machine(0)),
			Operand::register(1, RegisterId::Machine(1)),
			&mut out,
			Opcode::Jcc,
			DEFAULT_TEMP_REGISTER,
		);
		assert_eq!(out.len(), 1);
		assert_eq!(out[0].id, Opcode::Xor.id());
	}
}
