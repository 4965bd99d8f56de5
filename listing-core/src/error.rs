//! Error handling for the listing and VMIL core.
//!
//! Most failure conditions described by this crate are *not* errors: a
//! missing Processor, a lookup miss during a walk, an emulator memory miss,
//! or an unknown VMIL opcode are documented neutral defaults, logged via
//! `tracing` and handled in place (see each module for the specific
//! behaviour). `CoreError` exists only for the conditions that are
//! genuinely fatal to the caller: a serialization format mismatch, I/O
//! failure from a cache backing, or a direct lookup against an address the
//! listing never committed.

use thiserror::Error;

use crate::address::Address;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Comprehensive error type for listing and VMIL operations.
#[derive(Error, Debug)]
pub enum CoreError {
	/// I/O error from the listing's cache backing.
	#[error("I/O error{}: {source}", addr.map(|a| format!(" at {a}")).unwrap_or_default())]
	Io {
		addr: Option<Address>,
		#[source]
		source: std::io::Error,
	},

	/// The serialized form of an instruction does not match the expected
	/// binary layout. Fatal: the stream is left in an undefined position.
	#[error("serialization format mismatch: {message}")]
	SerializationFormat { message: String },

	/// `get(addr)` was called on an address that is not a key of the
	/// listing store. Callers are expected to only call `get` on
	/// addresses obtained from the store itself (e.g. through a path);
	/// reaching this means that contract was violated.
	#[error("no instruction committed at address {addr}")]
	NotCommitted { addr: Address },

	/// An invariant the core relies on internally was violated.
	#[error("internal error: {message}")]
	Internal { message: String },
}

impl Clone for CoreError {
	fn clone(&self) -> Self {
		match self {
			Self::Io { addr, source } => {
				Self::Io { addr: *addr, source: std::io::Error::new(source.kind(), source.to_string()) }
			}
			Self::SerializationFormat { message } => {
				Self::SerializationFormat { message: message.clone() }
			}
			Self::NotCommitted { addr } => Self::NotCommitted { addr: *addr },
			Self::Internal { message } => Self::Internal { message: message.clone() },
		}
	}
}

impl CoreError {
	/// Create a new I/O error, optionally tagged with the address the
	/// cache operation was servicing.
	pub fn io(addr: Option<Address>, source: std::io::Error) -> Self {
		Self::Io { addr, source }
	}

	/// Create a new serialization format error.
	pub fn serialization_format(message: impl Into<String>) -> Self {
		Self::SerializationFormat { message: message.into() }
	}

	/// Create a new not-committed error.
	pub fn not_committed(addr: Address) -> Self {
		Self::NotCommitted { addr }
	}

	/// Create a new internal error.
	pub fn internal(message: impl Into<String>) -> Self {
		Self::Internal { message: message.into() }
	}

	/// The address this error is associated with, if any.
	pub fn addr(&self) -> Option<Address> {
		match self {
			Self::Io { addr, .. } => *addr,
			Self::NotCommitted { addr } => Some(*addr),
			Self::SerializationFormat { .. } | Self::Internal { .. } => None,
		}
	}

	/// Whether this error is fatal to the caller, per §7's policy: every
	/// recoverable miss yields a documented default and is handled without
	/// ever reaching `CoreError`; everything that does reach here is fatal.
	pub fn is_fatal(&self) -> bool {
		true
	}
}

impl From<std::io::Error> for CoreError {
	fn from(source: std::io::Error) -> Self {
		Self::Io { addr: None, source }
	}
}
