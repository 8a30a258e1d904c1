use prov_types::{Digest, FIELD_COUNT};

/// How a level with an odd number of nodes is reduced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OddLeafPolicy {
    /// Odd levels are a construction error. Only power-of-two arities are
    /// accepted under this policy.
    Reject,
    /// The last node is paired with itself: `H(x ++ x)`.
    DuplicateLast,
    /// The last node moves up to the next level unchanged.
    CarryUp,
}

/// Errors from tree construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("expected exactly {expected} leaves, got {actual}")]
    LeafCount { expected: usize, actual: usize },

    #[error("arity must be at least 1")]
    ZeroArity,

    #[error("arity {0} is not a power of two and odd levels are rejected")]
    UnbalancedArity(usize),
}

/// Combines a declared number of leaves into one root.
///
/// Leaves are paired left to right. Each pair is sorted by raw byte value
/// before concatenation, so `combine(a, b) == combine(b, a)`. That makes a
/// pair order-free but not the whole tree: swapping leaves across pairs
/// changes the root, so leaf positions stay bound to field positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedTreeCombiner {
    arity: usize,
    odd: OddLeafPolicy,
}

impl FixedTreeCombiner {
    /// Combiner for product records: four leaves, depth two.
    pub const fn product() -> Self {
        Self {
            arity: FIELD_COUNT,
            odd: OddLeafPolicy::Reject,
        }
    }

    pub fn new(arity: usize, odd: OddLeafPolicy) -> Result<Self, TreeError> {
        if arity == 0 {
            return Err(TreeError::ZeroArity);
        }
        if odd == OddLeafPolicy::Reject && !arity.is_power_of_two() {
            return Err(TreeError::UnbalancedArity(arity));
        }
        Ok(Self { arity, odd })
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn odd_leaf_policy(&self) -> OddLeafPolicy {
        self.odd
    }

    /// Reduce `leaves` to a single root.
    ///
    /// A wrong leaf count fails loudly; leaves are never padded or truncated.
    pub fn root(&self, leaves: &[Digest]) -> Result<Digest, TreeError> {
        if leaves.len() != self.arity {
            return Err(TreeError::LeafCount {
                expected: self.arity,
                actual: leaves.len(),
            });
        }

        let mut current = leaves.to_vec();
        while current.len() > 1 {
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                match pair {
                    [left, right] => next.push(combine_pair(left, right)),
                    [last] => match self.odd {
                        OddLeafPolicy::DuplicateLast => next.push(combine_pair(last, last)),
                        OddLeafPolicy::CarryUp => next.push(*last),
                        OddLeafPolicy::Reject => {
                            return Err(TreeError::UnbalancedArity(self.arity));
                        }
                    },
                    _ => unreachable!("chunks(2) yields one or two items"),
                }
            }
            current = next;
        }

        Ok(current[0])
    }
}

impl Default for FixedTreeCombiner {
    fn default() -> Self {
        Self::product()
    }
}

/// Sorted-pair combination: `H(min(a, b) ++ max(a, b))`.
pub fn combine_pair(a: &Digest, b: &Digest) -> Digest {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = blake3::Hasher::new();
    hasher.update(low.as_bytes());
    hasher.update(high.as_bytes());
    Digest::from_hash(*hasher.finalize().as_bytes())
}
