//! End-to-end lift-then-emulate scenarios (§4.7–§4.9, S5–S6), exercised
//! only through `Translator`/`Emulator`'s public surface.

use listing_core::address::Address;
use listing_core::instruction::{Instruction, MemoryOperand, Operand, RegisterId};
use listing_core::vmil::{Emulator, Opcode, Translator};

const NATIVE_ADD: u32 = 100;
const NATIVE_BRANCH_IF_ZERO: u32 = 101;

fn lift_add(native: &Instruction, out: &mut Vec<Instruction>) {
	// Fictitious 2-operand accumulate: reg0 += reg1.
	let dst = native.operands[0];
	let src = native.operands[1];
	out.push(
		Instruction::new(Address::vmil(native.address, 0), Opcode::Add.id(), Opcode::Add.mnemonic())
			.with_operand(dst)
			.with_operand(dst)
			.with_operand(src),
	);
}

fn lift_branch_if_zero(native: &Instruction, out: &mut Vec<Instruction>) {
	let cond = native.operands[0];
	let target = native.operands[1];
	out.push(
		Instruction::new(Address::vmil(native.address, 0), Opcode::Jcc.id(), Opcode::Jcc.mnemonic())
			.with_operand(cond)
			.with_operand(target),
	);
}

#[test]
fn lifted_accumulate_executes_through_the_emulator() {
	let mut translator = Translator::new();
	translator.register(NATIVE_ADD, lift_add);
	let mut emulator = Emulator::new(translator);
	emulator.set_register(0, 10);
	emulator.set_register(1, 5);

	let native = Instruction::new(Address::new(0x10), NATIVE_ADD, "addi")
		.with_operand(Operand::register(0, RegisterId::Machine(0)))
		.with_operand(Operand::register(1, RegisterId::Machine(1)));

	let executed = emulator.emulate(&native);

	assert_eq!(executed.len(), 1);
	assert_eq!(emulator.register(0), 15);
}

#[test]
fn unregistered_native_opcode_falls_back_to_an_unkn_instruction() {
	let translator = Translator::new();
	let native = Instruction::new(Address::new(0x20), 0xffff_ffff, "weird").with_bytes(vec![0xde, 0xad]);
	let lifted = translator.translate(&native);
	assert_eq!(lifted.len(), 1);
	assert_eq!(lifted[0].id, Opcode::Unkn.id());
}

#[test]
fn jcc_only_annotates_a_comment_and_never_mutates_register_state() {
	let mut translator = Translator::new();
	translator.register(NATIVE_BRANCH_IF_ZERO, lift_branch_if_zero);
	let mut emulator = Emulator::new(translator);
	emulator.set_register(0, 0);
	emulator.set_register(1, 0x400);

	let native = Instruction::new(Address::new(0x30), NATIVE_BRANCH_IF_ZERO, "bz")
		.with_operand(Operand::register(0, RegisterId::Machine(0)))
		.with_operand(Operand::register(1, RegisterId::Machine(1)));

	let executed = emulator.emulate(&native);

	assert_eq!(executed[0].comments, vec!["jcc target=0x400 cond=false"]);
	assert_eq!(emulator.register(0), 0);
	assert_eq!(emulator.register(1), 0x400);
}

const NATIVE_LOAD: u32 = 102;

fn lift_load(native: &Instruction, out: &mut Vec<Instruction>) {
	let src = native.operands[0];
	let mem = match src.kind {
		listing_core::instruction::OperandKind::Memory(mem) => mem,
		_ => unreachable!("test lifter only handles a memory source operand"),
	};
	// Carry `value` through: a bare-absolute address lives there, not in
	// `mem.displacement` (§4.9's `memory[u_value]`).
	let mut mem_operand = Operand::memory(1, mem);
	mem_operand.value = src.value;
	out.push(
		Instruction::new(Address::vmil(native.address, 0), Opcode::Ldm.id(), Opcode::Ldm.mnemonic())
			.with_operand(Operand::register(0, RegisterId::Temp(0)))
			.with_operand(mem_operand),
	);
}

#[test]
fn memory_operand_reads_through_an_absolute_address() {
	let mut translator = Translator::new();
	translator.register(NATIVE_LOAD, lift_load);
	let mut emulator = Emulator::new(translator);
	emulator.set_memory(Address::new(0x1000), 0xcafe);

	let mem = MemoryOperand { base: None, index: None, scale: 1, displacement: 0 };
	let mut src_operand = Operand::memory(0, mem);
	src_operand.value = 0x1000;
	let load = Instruction::new(Address::new(0x0), NATIVE_LOAD, "ld").with_operand(src_operand);

	emulator.emulate(&load);
	assert_eq!(emulator.temp_register(0), 0xcafe);
}
