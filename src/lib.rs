//! # SmolDB
//!
//! A minimal embeddable key-value store with:
//! - Uniquely keyed, insertion-ordered entries of mixed value types
//! - Whole-store persistence to a single file
//! - Optional zlib compression, recorded in the file header
//! - Type-preserving encoding (values load back as the variant they were)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Host Application                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ add / get / set / delete / clear
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Store                                │
//! │        (Vec<Entry>, linear lookup, compression settings)     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ save / load (whole store)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Codec                                │
//! │          header → bincode → [zlib] → file → CRC32            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use smoldb::{Store, Value};
//!
//! let mut store = Store::create("app.db");
//! store.add("answer", 42)?;
//! store.add("name", "smol")?;
//! store.enable_compression(6);
//! store.save()?;
//!
//! let loaded = Store::load("app.db")?;
//! assert_eq!(loaded.get_value("answer"), Some(&Value::Int(42)));
//! # Ok::<(), smoldb::SmolError>(())
//! ```
//!
//! A Store is single-owner: it takes no locks, and concurrent saves or
//! loads of the same file must be serialized by the caller.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod value;
pub mod store;
pub mod codec;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SmolError, Result};
pub use config::{Compression, Config};
pub use store::{Entry, Store};
pub use value::{Value, ValueKind};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SmolDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
