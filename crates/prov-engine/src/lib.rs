//! Salted commitment and verification engine for product records.
//!
//! Commit salts each of the four fields, hashes them into leaves, combines
//! the leaves into one root, stores the payload, anchors the root on the
//! ledger, and persists the salts. Verify resolves the anchored root,
//! re-derives every leaf from the persisted salts and the fetched payload,
//! and compares roots in constant time.
//!
//! # Failure model
//!
//! Every collaborator call runs under a per-operation deadline. Idempotent
//! calls are retried under a bounded [`RetryPolicy`]; ledger registration is
//! not. Errors carry an [`ErrorClass`]:
//!
//! - availability and deadline errors may be retried by the caller
//! - [`EngineError::SaltPersistFailure`] and [`EngineError::SaltMissing`]
//!   mean a root is anchored that can no longer be reproduced; the
//!   [`Reconciler`] finds such records
//! - [`EngineError::RegistrationUnconfirmed`] means registration timed out
//!   and a follow-up lookup could not settle whether the root landed
//! - a tampered record is not an error, see [`Verdict`]
//!
//! # Example
//!
//! ```
//! use prov_engine::{EngineConfig, ProvenanceService, Verdict};
//! use prov_types::{FieldValue, RecordId};
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let (service, _backends) = ProvenanceService::in_memory(EngineConfig::default());
//!     let fields = [
//!         FieldValue::Integer(1),
//!         FieldValue::text("Widget"),
//!         FieldValue::text("2024-01-01"),
//!         FieldValue::text("B7"),
//!     ];
//!     service.commit(RecordId(1), fields).await.unwrap();
//!     let report = service.verify(RecordId(1)).await.unwrap();
//!     assert_eq!(report.verdict, Verdict::Authentic);
//! });
//! ```

pub mod collaborators;
pub mod commit;
pub mod config;
pub mod error;
pub mod reconcile;
mod retry;
pub mod service;
pub mod verify;

pub use collaborators::{Collaborators, InMemoryBackends};
pub use commit::CommitmentEngine;
pub use config::{EngineConfig, RetryPolicy};
pub use error::{EngineError, EngineResult, ErrorClass};
pub use reconcile::{ReconciliationReport, Reconciler, RecordHealth};
pub use service::ProvenanceService;
pub use verify::{RootSource, Verdict, VerificationEngine, VerificationReport};
