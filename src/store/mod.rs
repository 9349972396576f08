//! Store Module
//!
//! In-memory, insertion-ordered collection of uniquely keyed entries.
//!
//! ## Responsibilities
//! - Keep the key uniqueness invariant
//! - CRUD by key (linear lookup, small datasets only)
//! - Snapshot and type-filter queries
//! - Carry the compression settings used on save
//!
//! ## Concurrency
//! A Store has no internal locking. Every mutation takes `&mut self`;
//! callers sharing a Store across threads wrap it in their own lock.

mod entry;
mod table;

pub use entry::Entry;
pub use table::Store;
