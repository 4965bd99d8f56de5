//! Whole-struct round-trip property (§8, property 5) over the public
//! `instruction::{serialize, deserialize}` pair.

use listing_core::address::Address;
use listing_core::instruction::{
	deserialize, serialize, BlockType, Instruction, MemoryOperand, Operand, RegisterId, TypeFlags,
};

#[test]
fn round_trips_an_instruction_with_every_operand_kind() {
	let original = Instruction::new(Address::new(0x400), 7, "jz")
		.with_size(3)
		.with_signature("jz.rel8")
		.with_bytes(vec![0x74, 0x08])
		.with_flags(TypeFlags::JUMP | TypeFlags::CONDITIONAL)
		.with_operand(Operand::displacement(0, 0x408))
		.with_operand(Operand::register(1, RegisterId::Temp(0)))
		.with_operand(Operand::register(2, RegisterId::Machine(3)))
		.with_operand(Operand::memory(
			3,
			MemoryOperand { base: Some(RegisterId::Machine(1)), index: Some(RegisterId::Temp(2)), scale: 4, displacement: -16 },
		))
		.with_operand(Operand::immediate(4, 0x1234_5678_9abc_def0))
		.with_comment("decoded speculatively");

	let bytes = serialize(&original);
	let restored = deserialize(&bytes).unwrap();
	assert_eq!(original, restored);
}

#[test]
fn round_trips_a_data_block_with_no_operands_or_comments() {
	let mut original = Instruction::new(Address::new(0x1000), 0, "db");
	original.block_type = BlockType::Data;
	let bytes = serialize(&original);
	let restored = deserialize(&bytes).unwrap();
	assert_eq!(original, restored);
}

#[test]
fn truncated_buffer_is_a_serialization_format_error() {
	let original = Instruction::new(Address::new(0x10), 1, "nop");
	let mut bytes = serialize(&original);
	bytes.truncate(bytes.len() - 4);
	assert!(deserialize(&bytes).is_err());
}
