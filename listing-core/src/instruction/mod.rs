//! In-memory representation of a decoded instruction: its operands, flags
//! and comments.

mod serialize;

pub use serialize::{deserialize, serialize};

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::address::Address;

/// A register id, tagged by namespace. `Machine` registers come from the
/// decoded architecture; `Temp` registers are VMIL-only, scoped to a single
/// native instruction's lift, and never observed by the native register
/// file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterId {
	Machine(u32),
	Temp(u32),
}

impl RegisterId {
	fn wire_type(self) -> u32 {
		match self {
			Self::Machine(_) => 0,
			Self::Temp(_) => 1,
		}
	}

	fn wire_r(self) -> u32 {
		match self {
			Self::Machine(r) | Self::Temp(r) => r,
		}
	}

	fn from_wire(wire_type: u32, r: u32) -> Self {
		if wire_type == 0 { Self::Machine(r) } else { Self::Temp(r) }
	}
}

impl fmt::Display for RegisterId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Machine(r) => write!(f, "r{r}"),
			Self::Temp(r) => write!(f, "t{r}"),
		}
	}
}

/// Bitset of instruction type flags. Modelled as a plain wrapped integer,
/// like the teacher's processor flag sets, rather than an external
/// bitflags dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeFlags(u32);

impl TypeFlags {
	pub const NONE: Self = Self(0);
	pub const JUMP: Self = Self(1 << 0);
	pub const CONDITIONAL: Self = Self(1 << 1);
	pub const STOP: Self = Self(1 << 2);
	pub const CALL: Self = Self(1 << 3);
	pub const CODE: Self = Self(1 << 4);

	#[must_use]
	pub fn contains(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}

	#[must_use]
	pub fn from_bits(bits: u32) -> Self {
		Self(bits)
	}

	#[must_use]
	pub fn bits(self) -> u32 {
		self.0
	}
}

impl BitOr for TypeFlags {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self(self.0 | rhs.0)
	}
}

impl BitOrAssign for TypeFlags {
	fn bitor_assign(&mut self, rhs: Self) {
		self.0 |= rhs.0;
	}
}

/// Informational classification of the block an instruction belongs to.
/// Carried for serialization fidelity; the core itself only branches on
/// `TypeFlags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockType {
	#[default]
	Unknown,
	Code,
	Data,
}

impl BlockType {
	fn wire(self) -> u32 {
		match self {
			Self::Unknown => 0,
			Self::Code => 1,
			Self::Data => 2,
		}
	}

	fn from_wire(v: u32) -> Self {
		match v {
			1 => Self::Code,
			2 => Self::Data,
			_ => Self::Unknown,
		}
	}
}

/// A memory-addressing operand: `base + index * scale + displacement`,
/// each register read as 0 when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryOperand {
	pub base: Option<RegisterId>,
	pub index: Option<RegisterId>,
	pub scale: u32,
	pub displacement: i64,
}

/// What an operand's discriminated kind is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
	Register(RegisterId),
	Memory(MemoryOperand),
	Immediate,
	Displacement,
}

/// A single instruction operand.
///
/// Every operand carries a generic `value` slot regardless of `kind`: for
/// `Immediate` it is the immediate value; for `Displacement` it is the
/// target address; for `Memory` it is read by the emulator only when the
/// operand has neither a base nor an index register (a bare absolute
/// address); for `Register` it is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
	pub kind: OperandKind,
	/// Stable positional index among the instruction's operands.
	pub index: u32,
	/// Column hint used by renderers; not interpreted by the core.
	pub loc_index: u32,
	pub value: u64,
}

impl Operand {
	#[must_use]
	pub fn register(index: u32, reg: RegisterId) -> Self {
		Self { kind: OperandKind::Register(reg), index, loc_index: index, value: 0 }
	}

	#[must_use]
	pub fn memory(index: u32, mem: MemoryOperand) -> Self {
		Self { kind: OperandKind::Memory(mem), index, loc_index: index, value: 0 }
	}

	#[must_use]
	pub fn immediate(index: u32, value: u64) -> Self {
		Self { kind: OperandKind::Immediate, index, loc_index: index, value }
	}

	#[must_use]
	pub fn displacement(index: u32, target: u64) -> Self {
		Self { kind: OperandKind::Displacement, index, loc_index: index, value: target }
	}

	#[must_use]
	pub fn is_register(&self) -> bool {
		matches!(self.kind, OperandKind::Register(_))
	}

	#[must_use]
	pub fn is_memory(&self) -> bool {
		matches!(self.kind, OperandKind::Memory(_))
	}
}

/// A decoded instruction, native or VMIL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
	pub address: Address,
	pub size: u32,
	pub id: u32,
	pub mnemonic: String,
	/// Short textual fingerprint, concatenated along a function's path to
	/// form the function's content signature (§4.5).
	pub signature: String,
	pub bytes: Option<Vec<u8>>,
	pub flags: TypeFlags,
	pub block_type: BlockType,
	pub operands: Vec<Operand>,
	pub comments: Vec<String>,
}

impl Instruction {
	#[must_use]
	pub fn new(address: Address, id: u32, mnemonic: impl Into<String>) -> Self {
		Self {
			address,
			size: 0,
			id,
			mnemonic: mnemonic.into(),
			signature: String::new(),
			bytes: None,
			flags: TypeFlags::NONE,
			block_type: BlockType::default(),
			operands: Vec::new(),
			comments: Vec::new(),
		}
	}

	#[must_use]
	pub fn with_size(mut self, size: u32) -> Self {
		self.size = size;
		self
	}

	#[must_use]
	pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
		self.signature = signature.into();
		self
	}

	#[must_use]
	pub fn with_bytes(mut self, bytes: Vec<u8>) -> Self {
		self.bytes = Some(bytes);
		self
	}

	#[must_use]
	pub fn with_flags(mut self, flags: TypeFlags) -> Self {
		self.flags |= flags;
		self
	}

	#[must_use]
	pub fn with_operand(mut self, operand: Operand) -> Self {
		self.operands.push(operand);
		self
	}

	#[must_use]
	pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
		self.comments.push(comment.into());
		self
	}

	#[must_use]
	pub fn is(&self, flags: TypeFlags) -> bool {
		self.flags.contains(flags)
	}
}
