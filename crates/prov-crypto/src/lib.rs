//! Commitment primitives for salted product records.
//!
//! Provides the salted leaf builder, the sorted-pair tree combiner, and
//! constant-time digest comparison. Hashing is plain BLAKE3 with no domain
//! prefix: `leaf = H(salt ++ value)` and `node = H(min ++ max)`.
//!
//! Salts come from `rand`'s OS-backed generator; root comparison goes through `subtle`.

pub mod compare;
pub mod leaf;
pub mod tree;

pub use compare::digests_match;
pub use leaf::SaltedLeafBuilder;
pub use tree::{combine_pair, FixedTreeCombiner, OddLeafPolicy, TreeError};
