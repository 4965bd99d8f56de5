//! Binary encoding of a single [`Instruction`], little-endian throughout.
//!
//! Field layout follows the wire format: address, flags, size, id,
//! length-prefixed mnemonic and signature strings, an operand count
//! followed by each operand's fields, then a comment count followed by
//! each comment string.
//!
//! Two fields are carried beyond the literal layout so that round-trip
//! (`deserialize(serialize(x)) == x`) holds for the whole in-memory model:
//! `block_type` is written directly after the flag bitset, and a register
//! operand's namespace tag is folded into `mem.base`/`mem.index` by
//! reserving their top bit for "temp register" (set) vs "machine register"
//! (clear), with `u32::MAX` reserved to mean "no register".

use crate::address::Address;
use crate::error::CoreError;

use super::{BlockType, Instruction, MemoryOperand, Operand, OperandKind, RegisterId, TypeFlags};

const NO_REGISTER: u32 = u32::MAX;
const TEMP_TAG: u32 = 1 << 31;

fn pack_reg_opt(reg: Option<RegisterId>) -> u32 {
	match reg {
		None => NO_REGISTER,
		Some(RegisterId::Machine(r)) => r,
		Some(RegisterId::Temp(r)) => r | TEMP_TAG,
	}
}

fn unpack_reg_opt(word: u32) -> Option<RegisterId> {
	if word == NO_REGISTER {
		None
	} else if word & TEMP_TAG != 0 {
		Some(RegisterId::Temp(word & !TEMP_TAG))
	} else {
		Some(RegisterId::Machine(word))
	}
}

fn write_string(out: &mut Vec<u8>, s: &str) {
	out.extend_from_slice(&(s.len() as u32).to_le_bytes());
	out.extend_from_slice(s.as_bytes());
}

fn read_string(buf: &[u8], pos: &mut usize) -> Result<String, CoreError> {
	let len = read_u32(buf, pos)? as usize;
	let end = pos.checked_add(len).filter(|&e| e <= buf.len()).ok_or_else(|| {
		CoreError::serialization_format("string length exceeds remaining buffer")
	})?;
	let s = std::str::from_utf8(&buf[*pos..end])
		.map_err(|e| CoreError::serialization_format(format!("invalid utf-8 in string: {e}")))?
		.to_owned();
	*pos = end;
	Ok(s)
}

fn read_u32(buf: &[u8], pos: &mut usize) -> Result<u32, CoreError> {
	let bytes: [u8; 4] = buf
		.get(*pos..*pos + 4)
		.ok_or_else(|| CoreError::serialization_format("truncated u32"))?
		.try_into()
		.unwrap();
	*pos += 4;
	Ok(u32::from_le_bytes(bytes))
}

fn read_u64(buf: &[u8], pos: &mut usize) -> Result<u64, CoreError> {
	let bytes: [u8; 8] = buf
		.get(*pos..*pos + 8)
		.ok_or_else(|| CoreError::serialization_format("truncated u64"))?
		.try_into()
		.unwrap();
	*pos += 8;
	Ok(u64::from_le_bytes(bytes))
}

fn read_i64(buf: &[u8], pos: &mut usize) -> Result<i64, CoreError> {
	Ok(read_u64(buf, pos)? as i64)
}

/// Serialize an instruction to its wire format.
#[must_use]
pub fn serialize(instr: &Instruction) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend_from_slice(&instr.address.value().to_le_bytes());
	out.extend_from_slice(&instr.flags.bits().to_le_bytes());
	out.extend_from_slice(&instr.block_type.wire().to_le_bytes());
	out.extend_from_slice(&instr.size.to_le_bytes());
	out.extend_from_slice(&instr.id.to_le_bytes());
	write_string(&mut out, &instr.mnemonic);
	write_string(&mut out, &instr.signature);

	out.extend_from_slice(&(instr.operands.len() as u32).to_le_bytes());
	for op in &instr.operands {
		out.extend_from_slice(&op.loc_index.to_le_bytes());
		let (type_word, reg_type, reg_r, mem_base, mem_index, mem_scale, mem_disp) = match op.kind {
			OperandKind::Register(r) => (0u32, r.wire_type(), r.wire_r(), NO_REGISTER, NO_REGISTER, 0, 0),
			OperandKind::Memory(mem) => (
				1u32,
				0,
				0,
				pack_reg_opt(mem.base),
				pack_reg_opt(mem.index),
				mem.scale,
				mem.displacement,
			),
			OperandKind::Immediate => (2u32, 0, 0, NO_REGISTER, NO_REGISTER, 0, 0),
			OperandKind::Displacement => (3u32, 0, 0, NO_REGISTER, NO_REGISTER, 0, 0),
		};
		out.extend_from_slice(&type_word.to_le_bytes());
		out.extend_from_slice(&op.index.to_le_bytes());
		out.extend_from_slice(&reg_type.to_le_bytes());
		out.extend_from_slice(&reg_r.to_le_bytes());
		out.extend_from_slice(&mem_base.to_le_bytes());
		out.extend_from_slice(&mem_index.to_le_bytes());
		out.extend_from_slice(&mem_scale.to_le_bytes());
		out.extend_from_slice(&mem_disp.to_le_bytes());
		out.extend_from_slice(&op.value.to_le_bytes());
	}

	out.extend_from_slice(&(instr.comments.len() as u32).to_le_bytes());
	for comment in &instr.comments {
		write_string(&mut out, comment);
	}

	let bytes_len = instr.bytes.as_ref().map_or(0, Vec::len) as u32;
	out.extend_from_slice(&bytes_len.to_le_bytes());
	if let Some(bytes) = &instr.bytes {
		out.extend_from_slice(bytes);
	}

	out
}

/// Deserialize an instruction from its wire format.
///
/// # Errors
/// Returns [`CoreError::SerializationFormat`] if the buffer is truncated,
/// contains an unknown operand type tag, or an invalid mnemonic/signature
/// string.
pub fn deserialize(buf: &[u8]) -> Result<Instruction, CoreError> {
	let mut pos = 0usize;
	let address = Address::new(read_u64(buf, &mut pos)?);
	let flags = TypeFlags::from_bits(read_u32(buf, &mut pos)?);
	let block_type = BlockType::from_wire(read_u32(buf, &mut pos)?);
	let size = read_u32(buf, &mut pos)?;
	let id = read_u32(buf, &mut pos)?;
	let mnemonic = read_string(buf, &mut pos)?;
	let signature = read_string(buf, &mut pos)?;

	let operand_count = read_u32(buf, &mut pos)?;
	let mut operands = Vec::with_capacity(operand_count as usize);
	for _ in 0..operand_count {
		let loc_index = read_u32(buf, &mut pos)?;
		let type_word = read_u32(buf, &mut pos)?;
		let index = read_u32(buf, &mut pos)?;
		let reg_type = read_u32(buf, &mut pos)?;
		let reg_r = read_u32(buf, &mut pos)?;
		let mem_base = read_u32(buf, &mut pos)?;
		let mem_index = read_u32(buf, &mut pos)?;
		let mem_scale = read_u32(buf, &mut pos)?;
		let mem_disp = read_i64(buf, &mut pos)?;
		let value = read_u64(buf, &mut pos)?;

		let kind = match type_word {
			0 => OperandKind::Register(RegisterId::from_wire(reg_type, reg_r)),
			1 => OperandKind::Memory(MemoryOperand {
				base: unpack_reg_opt(mem_base),
				index: unpack_reg_opt(mem_index),
				scale: mem_scale,
				displacement: mem_disp,
			}),
			2 => OperandKind::Immediate,
			3 => OperandKind::Displacement,
			other => {
				return Err(CoreError::serialization_format(format!("unknown operand type tag {other}")));
			}
		};

		operands.push(Operand { kind, index, loc_index, value });
	}

	let comment_count = read_u32(buf, &mut pos)?;
	let mut comments = Vec::with_capacity(comment_count as usize);
	for _ in 0..comment_count {
		comments.push(read_string(buf, &mut pos)?);
	}

	let bytes_len = read_u32(buf, &mut pos)? as usize;
	let bytes = if bytes_len == 0 {
		None
	} else {
		let end = pos.checked_add(bytes_len).filter(|&e| e <= buf.len()).ok_or_else(|| {
			CoreError::serialization_format("instruction byte buffer exceeds remaining input")
		})?;
		let slice = buf[pos..end].to_vec();
		pos = end;
		Some(slice)
	};

	Ok(Instruction {
		address,
		size,
		id,
		mnemonic,
		signature,
		bytes,
		flags,
		block_type,
		operands,
		comments,
	})
}
