use prov_types::Digest;
use subtle::ConstantTimeEq;

/// Compare two digests over all 32 bytes without an early exit.
pub fn digests_match(anchored: &Digest, recomputed: &Digest) -> bool {
    bool::from(anchored.as_bytes().ct_eq(recomputed.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_digests_match() {
        let d = Digest::from_hash([0x42; 32]);
        assert!(digests_match(&d, &d));
    }

    #[test]
    fn last_byte_difference_is_detected() {
        let a = Digest::from_hash([0x42; 32]);
        let mut bytes = [0x42; 32];
        bytes[31] ^= 1;
        assert!(!digests_match(&a, &Digest::from_hash(bytes)));
    }
}
