use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::field::{FieldValue, FIELD_COUNT};
use crate::salt::Salt;

/// Caller-assigned, globally unique record ordinal.
///
/// The engine never generates these. In the product use case the record id
/// is the product id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Opaque locator returned by the content store.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRef(String);

impl ContentRef {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentRef({})", self.0)
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the ledger holds for a record: the root and where the content lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchoredRoot {
    pub root: Digest,
    pub content_ref: ContentRef,
}

impl AnchoredRoot {
    pub fn new(root: Digest, content_ref: ContentRef) -> Self {
        Self { root, content_ref }
    }
}

/// A fully committed record.
///
/// Produced once by a successful commit and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub record_id: RecordId,
    pub fields: [FieldValue; FIELD_COUNT],
    pub salts: [Salt; FIELD_COUNT],
    pub content_ref: ContentRef,
    pub root: Digest,
}

impl Record {
    /// The ledger-facing view of this record.
    pub fn anchored(&self) -> AnchoredRoot {
        AnchoredRoot::new(self.root, self.content_ref.clone())
    }
}
