//! Register and memory state, opcode dispatch, evaluation semantics
//! (§4.9).

use std::collections::HashMap;

use crate::address::Address;
use crate::external::{Decoder, Logger, TracingLogger};
use crate::instruction::{Instruction, MemoryOperand, Operand, OperandKind, RegisterId};

use super::model::Opcode;
use super::translator::Translator;

/// Register and memory state plus opcode dispatch. Owns its three maps
/// exclusively; no sharing across emulators (§5).
pub struct Emulator {
	registers: HashMap<u32, u64>,
	tempregisters: HashMap<u32, u64>,
	memory: HashMap<Address, u64>,
	translator: Translator,
	decoder: Option<Box<dyn Decoder>>,
	logger: Box<dyn Logger>,
}

impl Emulator {
	#[must_use]
	pub fn new(translator: Translator) -> Self {
		Self {
			registers: HashMap::new(),
			tempregisters: HashMap::new(),
			memory: HashMap::new(),
			translator,
			decoder: None,
			logger: Box::new(TracingLogger),
		}
	}

	#[must_use]
	pub fn with_decoder(mut self, decoder: impl Decoder + 'static) -> Self {
		self.decoder = Some(Box::new(decoder));
		self
	}

	#[must_use]
	pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
		self.logger = Box::new(logger);
		self
	}

	pub fn set_register(&mut self, id: u32, value: u64) {
		self.registers.insert(id, value);
	}

	#[must_use]
	pub fn register(&self, id: u32) -> u64 {
		self.registers.get(&id).copied().unwrap_or(0)
	}

	#[must_use]
	pub fn temp_register(&self, id: u32) -> u64 {
		self.tempregisters.get(&id).copied().unwrap_or(0)
	}

	pub fn set_memory(&mut self, addr: Address, value: u64) {
		self.memory.insert(addr, value);
	}

	#[must_use]
	pub fn memory_cell(&self, addr: Address) -> Option<u64> {
		self.memory.get(&addr).copied()
	}

	/// Clear all three state maps; no implicit initial values remain.
	pub fn reset(&mut self) {
		self.registers.clear();
		self.tempregisters.clear();
		self.memory.clear();
	}

	/// Translate `native`, then dispatch every resulting VMIL instruction
	/// to its opcode handler. Returns the executed sequence, with `Jcc`
	/// instructions carrying their evaluated-condition comment.
	pub fn emulate(&mut self, native: &Instruction) -> Vec<Instruction> {
		let mut sequence = self.translator.translate(native);
		for instr in &mut sequence {
			self.step(instr);
		}
		sequence
	}

	fn step(&mut self, instr: &mut Instruction) {
		let Some(opcode) = Opcode::from_id(instr.id) else {
			self.logger.log(&format!("unknown VMIL opcode id {} skipped", instr.id));
			return;
		};

		match opcode {
			Opcode::Nop | Opcode::Undef | Opcode::Unkn => {}
			Opcode::Add => self.binary_op(instr, u64::wrapping_add),
			Opcode::Sub => self.binary_op(instr, u64::wrapping_sub),
			Opcode::Mul => self.binary_op(instr, u64::wrapping_mul),
			Opcode::And => self.binary_op(instr, |a, b| a & b),
			Opcode::Or => self.binary_op(instr, |a, b| a | b),
			Opcode::Xor => self.binary_op(instr, |a, b| a ^ b),
			Opcode::Lsh => self.binary_op(instr, |a, b| a.wrapping_shl(b as u32 & 63)),
			Opcode::Rsh => self.binary_op(instr, |a, b| a.wrapping_shr(b as u32 & 63)),
			Opcode::Div => self.checked_binary_op(instr, u64::checked_div, "division by zero"),
			Opcode::Mod => self.checked_binary_op(instr, u64::checked_rem, "modulo by zero"),
			Opcode::Str | Opcode::Ldm | Opcode::Stm => self.move_op(instr),
			Opcode::Bisz => self.bisz_op(instr),
			Opcode::Jcc => self.jcc_op(instr),
		}
	}

	fn binary_op(&mut self, instr: &Instruction, f: impl Fn(u64, u64) -> u64) {
		if instr.operands.len() < 3 {
			self.logger.log("vmil binary op missing operands");
			return;
		}
		let a = self.read_operand(&instr.operands[1]);
		let b = self.read_operand(&instr.operands[2]);
		let dst = instr.operands[0];
		let result = f(a, b);
		self.write_operand(&dst, result);
	}

	fn checked_binary_op(&mut self, instr: &Instruction, f: impl Fn(u64, u64) -> Option<u64>, miss: &str) {
		if instr.operands.len() < 3 {
			self.logger.log("vmil binary op missing operands");
			return;
		}
		let a = self.read_operand(&instr.operands[1]);
		let b = self.read_operand(&instr.operands[2]);
		match f(a, b) {
			Some(result) => {
				let dst = instr.operands[0];
				self.write_operand(&dst, result);
			}
			None => self.logger.log(&format!("{miss}; write skipped")),
		}
	}

	/// `Str`, `Ldm`, and `Stm` all execute identically as `op0 ← op1`.
	/// Load/store direction is a lifter-construction convention, not a
	/// runtime distinction: a lifter emitting `Ldm` places the memory
	/// operand at `op1` and the destination register at `op0`, and a
	/// lifter emitting `Stm` places them the other way around. No runtime
	/// inspection of the opcode beyond dispatch is needed or done.
	fn move_op(&mut self, instr: &Instruction) {
		if instr.operands.len() < 2 {
			self.logger.log("vmil move op missing operands");
			return;
		}
		let value = self.read_operand(&instr.operands[1]);
		let dst = instr.operands[0];
		self.write_operand(&dst, value);
	}

	fn bisz_op(&mut self, instr: &Instruction) {
		if instr.operands.len() < 2 {
			self.logger.log("vmil bisz missing operands");
			return;
		}
		let value = self.read_operand(&instr.operands[1]);
		let dst = instr.operands[0];
		self.write_operand(&dst, u64::from(value == 0));
	}

	fn jcc_op(&mut self, instr: &mut Instruction) {
		if instr.operands.is_empty() {
			self.logger.log("vmil jcc missing condition operand");
			return;
		}
		let cond = self.read_operand(&instr.operands[0]);
		let target = instr.operands.get(1).map(|op| self.read_operand(op)).unwrap_or(0);
		instr.comments.push(format!("jcc target={target:#x} cond={}", cond != 0));
	}

	fn read_register(&self, reg: RegisterId) -> u64 {
		match reg {
			RegisterId::Machine(r) => self.register(r),
			RegisterId::Temp(r) => self.temp_register(r),
		}
	}

	fn write_register(&mut self, reg: RegisterId, value: u64) {
		match reg {
			RegisterId::Machine(r) => {
				self.registers.insert(r, value);
			}
			RegisterId::Temp(r) => {
				self.tempregisters.insert(r, value);
			}
		}
	}

	fn effective_address(&self, mem: MemoryOperand) -> Address {
		let base = mem.base.map_or(0, |r| self.read_register(r));
		let index = mem.index.map_or(0, |r| self.read_register(r));
		let addr = base
			.wrapping_add(index.wrapping_mul(u64::from(mem.scale)))
			.wrapping_add(mem.displacement as u64);
		Address::new(addr)
	}

	/// A bare absolute address (no base, no index) reads its address from
	/// the operand's `value` slot, per `memory[u_value]`; anything with a
	/// base or index register is register-indirect and resolved through
	/// `effective_address` instead.
	fn memory_address(&self, op: &Operand, mem: MemoryOperand) -> Address {
		if mem.base.is_none() && mem.index.is_none() {
			Address::new(op.value)
		} else {
			self.effective_address(mem)
		}
	}

	fn read_memory(&mut self, addr: Address) -> u64 {
		if let Some(value) = self.memory.get(&addr) {
			return *value;
		}
		match self.decoder.as_deref().and_then(|d| d.read_address(addr, 4)) {
			Some(value) => value,
			None => {
				self.logger.log(&format!("memory read miss at {addr} with no decoder fallback"));
				0
			}
		}
	}

	fn read_operand(&mut self, op: &Operand) -> u64 {
		match op.kind {
			OperandKind::Register(reg) => self.read_register(reg),
			OperandKind::Memory(mem) => {
				let addr = self.memory_address(op, mem);
				self.read_memory(addr)
			}
			OperandKind::Immediate | OperandKind::Displacement => op.value,
		}
	}

	fn write_operand(&mut self, op: &Operand, value: u64) {
		match op.kind {
			OperandKind::Register(reg) => self.write_register(reg, value),
			OperandKind::Memory(mem) => {
				let addr = self.memory_address(op, mem);
				self.memory.insert(addr, value);
			}
			OperandKind::Immediate | OperandKind::Displacement => {}
		}
	}
}
