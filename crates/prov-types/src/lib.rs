//! Foundation types for salted product-record commitments.
//!
//! Every other `prov` crate depends on `prov-types`. Nothing in here hashes
//! or talks to a collaborator; the types only fix the shapes and encodings
//! that commit time and verify time must agree on.
//!
//! # Key Types
//!
//! - [`Digest`] — 32-byte hash output (leaves, interior nodes, roots)
//! - [`Salt`] — 16-byte single-use random salt
//! - [`FieldValue`] — one committed field, with a canonical byte encoding
//! - [`RecordSchema`] — declared field names, kinds, and leaf positions
//! - [`RecordId`] / [`ContentRef`] / [`AnchoredRoot`] — ledger-facing identifiers
//! - [`Record`] — a fully committed record

pub mod digest;
pub mod error;
pub mod field;
pub mod record;
pub mod salt;

pub use digest::Digest;
pub use error::TypeError;
pub use field::{FieldKind, FieldSchema, FieldValue, RecordSchema, FIELD_COUNT};
pub use record::{AnchoredRoot, ContentRef, Record, RecordId};
pub use salt::{Salt, SALT_LEN};
