use prov_types::{Digest, FieldValue, Salt};

/// Builds commitment leaves from field values.
///
/// `leaf = BLAKE3(salt ++ canonical_bytes(value))`. The commit path draws a
/// fresh salt per call; the verify path replays a persisted one. Persisting
/// the returned salt is the caller's job: a lost salt makes its field
/// permanently unverifiable.
#[derive(Clone, Copy, Debug, Default)]
pub struct SaltedLeafBuilder;

impl SaltedLeafBuilder {
    pub const fn new() -> Self {
        Self
    }

    /// Salt `value` with fresh randomness and hash it.
    pub fn leaf(&self, value: &FieldValue) -> (Salt, Digest) {
        let salt = Salt::random();
        let leaf = self.leaf_with_salt(&salt, value);
        (salt, leaf)
    }

    /// Recompute a leaf from a known salt.
    pub fn leaf_with_salt(&self, salt: &Salt, value: &FieldValue) -> Digest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(salt.as_bytes());
        hasher.update(&value.canonical_bytes());
        Digest::from_hash(*hasher.finalize().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_is_hash_of_salt_then_value() {
        let salt = Salt::from_bytes([9; 16]);
        let value = FieldValue::text("Widget");
        let mut concat = salt.as_bytes().to_vec();
        concat.extend_from_slice(b"Widget");
        let expected = Digest::from_hash(*blake3::hash(&concat).as_bytes());
        assert_eq!(SaltedLeafBuilder::new().leaf_with_salt(&salt, &value), expected);
    }

    #[test]
    fn replay_with_returned_salt_matches() {
        let builder = SaltedLeafBuilder::new();
        let value = FieldValue::text("2024-01-01");
        let (salt, leaf) = builder.leaf(&value);
        assert_eq!(builder.leaf_with_salt(&salt, &value), leaf);
    }

    #[test]
    fn same_value_gets_different_leaves() {
        let builder = SaltedLeafBuilder::new();
        let value = FieldValue::text("B7");
        let (salt_a, leaf_a) = builder.leaf(&value);
        let (salt_b, leaf_b) = builder.leaf(&value);
        assert_ne!(salt_a, salt_b);
        assert_ne!(leaf_a, leaf_b);
    }

    #[test]
    fn integer_and_text_with_same_digits_agree() {
        let builder = SaltedLeafBuilder::new();
        let salt = Salt::from_bytes([1; 16]);
        assert_eq!(
            builder.leaf_with_salt(&salt, &FieldValue::Integer(1)),
            builder.leaf_with_salt(&salt, &FieldValue::text("1"))
        );
    }

    #[test]
    fn salt_changes_leaf() {
        let builder = SaltedLeafBuilder::new();
        let value = FieldValue::text("B7");
        assert_ne!(
            builder.leaf_with_salt(&Salt::from_bytes([1; 16]), &value),
            builder.leaf_with_salt(&Salt::from_bytes([2; 16]), &value)
        );
    }
}
