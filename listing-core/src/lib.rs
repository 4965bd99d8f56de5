//! # listing-core
//!
//! The analytical core of a disassembler framework: an address-indexed
//! instruction listing, a function control-flow discoverer, and a small
//! architecture-neutral IR (VMIL) with a deterministic emulator.
//!
//! This crate does not decode bytes into instructions, render text, or
//! persist program images — those are external collaborators, modelled
//! here as the traits in [`external`] and [`symbols`]. What it does do is
//! organize already-decoded instructions into a [`listing::Listing`],
//! discover each function's extent by [`paths::walk`]ing control flow, and
//! lift/emulate native instructions through [`vmil`].
//!
//! ## Quick start
//!
//! ```rust
//! use listing_core::address::Address;
//! use listing_core::instruction::{Instruction, TypeFlags};
//! use listing_core::listing::Listing;
//! use listing_core::paths::calculate_paths;
//! use listing_core::symbols::{Symbol, SymbolFlags, SymbolMap};
//! use listing_core::external::Processor;
//!
//! struct NoProcessor;
//! impl Processor for NoProcessor {
//!     fn target(&self, _: &Instruction) -> Option<Address> { None }
//! }
//!
//! let mut listing = Listing::new();
//! listing.commit(
//!     Address::new(0x100),
//!     Instruction::new(Address::new(0x100), 0, "ret").with_flags(TypeFlags::STOP),
//! );
//!
//! let mut symbols = SymbolMap::new();
//! symbols.insert(Symbol::new(Address::new(0x100), "main", SymbolFlags::FUNCTION));
//!
//! let paths = calculate_paths(&listing, &symbols, Some(&NoProcessor));
//! assert!(paths.get(Address::new(0x100)).is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate tracing;

pub mod address;
pub mod error;
pub mod external;
pub mod instruction;
pub mod listing;
pub mod paths;
pub mod symbols;
pub mod vmil;

pub use crate::address::Address;
pub use crate::error::{CoreError, CoreResult};
pub use crate::instruction::Instruction;
pub use crate::listing::Listing;
pub use crate::paths::{calculate_paths, walk, FunctionPath, FunctionPaths};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
