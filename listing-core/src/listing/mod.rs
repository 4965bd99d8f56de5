//! Address-keyed, cache-backed mapping address → instruction (§4.1).

use std::collections::BTreeMap;

use crate::address::Address;
use crate::error::{CoreError, CoreResult};
use crate::instruction::Instruction;

/// Capability a `Listing` delegates cache invalidation to. Tests and small
/// analyses use [`NullCache`]; a disk-paging implementation is an external
/// collaborator the core only calls through this trait.
pub trait CacheBacking {
	/// Called after a `commit` so the backing can drop or refresh any
	/// paged-out copy of the instruction at `addr`.
	fn invalidate(&mut self, addr: Address);
}

/// A `CacheBacking` that does nothing; the listing is fully in-memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl CacheBacking for NullCache {
	fn invalidate(&mut self, _addr: Address) {}
}

/// The address-indexed instruction store.
///
/// Keys are unique; insertion order is irrelevant. Backed by an ordered
/// map so iteration, predecessor/successor lookup and `find` all read off
/// address order directly, per the design note against unordered maps.
#[derive(Debug)]
pub struct Listing<B: CacheBacking = NullCache> {
	instructions: BTreeMap<Address, Instruction>,
	cache: B,
}

impl Listing<NullCache> {
	#[must_use]
	pub fn new() -> Self {
		Self::with_backing(NullCache)
	}
}

impl Default for Listing<NullCache> {
	fn default() -> Self {
		Self::new()
	}
}

impl<B: CacheBacking> Listing<B> {
	#[must_use]
	pub fn with_backing(cache: B) -> Self {
		Self { instructions: BTreeMap::new(), cache }
	}

	/// Insert or replace the instruction at `instr.address`.
	pub fn commit(&mut self, addr: Address, instr: Instruction) {
		self.instructions.insert(addr, instr);
		self.cache.invalidate(addr);
	}

	/// Sugar for `commit(instr.address, instr)`.
	pub fn update(&mut self, instr: Instruction) {
		self.commit(instr.address, instr);
	}

	/// Position a cursor at `addr`, or an end cursor if nothing is
	/// committed there.
	#[must_use]
	pub fn find(&self, addr: Address) -> Cursor<'_, B> {
		let current = self.instructions.contains_key(&addr).then_some(addr);
		Cursor { listing: self, current }
	}

	/// Retrieve the instruction at `addr`.
	///
	/// # Errors
	/// Returns [`CoreError::NotCommitted`] if `addr` is not a key of the
	/// store. Callers are expected to only use this on addresses obtained
	/// from the store itself.
	pub fn get(&self, addr: Address) -> CoreResult<&Instruction> {
		self.instructions.get(&addr).ok_or_else(|| CoreError::not_committed(addr))
	}

	#[must_use]
	pub fn contains(&self, addr: Address) -> bool {
		self.instructions.contains_key(&addr)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&Address, &Instruction)> {
		self.instructions.iter()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.instructions.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.instructions.is_empty()
	}

	/// The smallest committed address strictly greater than `addr`, if any.
	fn successor(&self, addr: Address) -> Option<Address> {
		use std::ops::Bound::Excluded;
		self.instructions.range((Excluded(addr), std::ops::Bound::Unbounded)).next().map(|(a, _)| *a)
	}
}

/// A read-only position into a [`Listing`], ordered by address.
#[derive(Debug)]
pub struct Cursor<'a, B: CacheBacking> {
	listing: &'a Listing<B>,
	current: Option<Address>,
}

impl<'a, B: CacheBacking> Cursor<'a, B> {
	#[must_use]
	pub fn is_end(&self) -> bool {
		self.current.is_none()
	}

	#[must_use]
	pub fn address(&self) -> Option<Address> {
		self.current
	}

	#[must_use]
	pub fn instruction(&self) -> Option<&'a Instruction> {
		self.current.and_then(|a| self.listing.instructions.get(&a))
	}

	/// Advance to the next committed address in ascending order; becomes
	/// an end cursor if there is none.
	#[must_use]
	pub fn next(&self) -> Cursor<'a, B> {
		let current = self.current.and_then(|a| self.listing.successor(a));
		Cursor { listing: self.listing, current }
	}
}

impl<B: CacheBacking> Clone for Cursor<'_, B> {
	fn clone(&self) -> Self {
		Cursor { listing: self.listing, current: self.current }
	}
}
