//! Virtual Machine Intermediate Language: a small, architecture-neutral IR
//! that native instructions are lifted into, and a deterministic emulator
//! that executes it (§4.7–§4.9).

pub mod emulator;
pub mod model;
pub mod translator;

pub use emulator::Emulator;
pub use model::{Opcode, OpcodeType};
pub use translator::{Lifter, Translator};
