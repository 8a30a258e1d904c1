//! Append-only ledger boundary for record commitments.
//!
//! The ledger is consumed as an opaque key→value oracle: a record id is
//! registered exactly once with its root and content locator, and can be
//! looked up forever after. Transaction construction, signing, and
//! consensus belong to whatever sits behind the [`Ledger`] trait.
//!
//! This crate provides:
//! - the [`Ledger`] trait boundary
//! - [`LedgerEntry`], the audit view of one registration
//! - [`InMemoryLedger`] for tests, demos, and embedding

pub mod entry;
pub mod error;
pub mod memory;
pub mod traits;

pub use entry::LedgerEntry;
pub use error::{LedgerError, LedgerResult};
pub use memory::InMemoryLedger;
pub use traits::Ledger;
