//! Collaborator boundaries for the commitment engine.
//!
//! The engine never talks to a concrete blob store, database, or cache. It
//! talks to three capability traits defined here:
//!
//! - [`ContentStore`] -- content-addressed payload upload and fetch
//! - [`SaltStore`] -- durable `record id -> salts[4]` mapping
//! - [`RootCache`] -- read-through TTL cache of anchored roots
//!
//! # Backends
//!
//! - [`InMemoryContentStore`], [`InMemorySaltStore`] -- `HashMap`-based, for
//!   tests and embedding
//! - [`InMemoryRootCache`] -- TTL cache keyed by record id
//!
//! Every in-memory backend carries [`FaultInjector`]s so tests can make a
//! specific call fail a fixed number of times, or forever.
//!
//! # Design Rules
//!
//! 1. Stored content is never interpreted by the store.
//! 2. Salts are written once per record; rewriting identical salts is a no-op.
//! 3. Cache entries are immutable for their TTL. There is no invalidation.
//! 4. All failures are propagated, never silently ignored.

pub mod cache;
pub mod error;
pub mod fault;
pub mod memory;
pub mod traits;

pub use cache::InMemoryRootCache;
pub use error::{StoreError, StoreResult};
pub use fault::FaultInjector;
pub use memory::{InMemoryContentStore, InMemorySaltStore};
pub use traits::{ContentStore, RootCache, SaltStore};
