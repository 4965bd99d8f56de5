//! The three capabilities the core consumes from its host application but
//! never implements itself (§6).

use crate::address::Address;
use crate::instruction::Instruction;

/// Resolves a static branch target for an instruction, if the instruction
/// has one. Consumed by the path analyzer (§4.3).
pub trait Processor {
	fn target(&self, instr: &Instruction) -> Option<Address>;
}

/// Reads raw program bytes. Consumed by the VMIL emulator's memory
/// fallback (§4.9) when a memory cell has never been written.
pub trait Decoder {
	/// Read up to 8 bytes of the program image at `addr`, zero-extended
	/// into a `u64`. Returns `None` on any decode failure (out of range,
	/// unmapped, etc.).
	fn read_address(&self, addr: Address, size: u8) -> Option<u64>;
}

/// Fire-and-forget diagnostic sink.
pub trait Logger {
	fn log(&self, message: &str);
}

/// A `Logger` that forwards to `tracing`, used when the host application
/// does not supply its own sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
	fn log(&self, message: &str) {
		debug!(target: "listing_core::emulator", "{message}");
	}
}
