use subtle::ConstantTimeEq;

/// Timing-safe equality over byte strings. Used for comparing bearer
/// values against derived digests; the length of a well-formed
/// credential is public, so a length mismatch may return early.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    bool::from(a.ct_eq(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_slices_match() {
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
    }

    #[test]
    fn different_content_rejected() {
        assert!(!constant_time_eq(b"abcdef", b"abcdeg"));
    }

    #[test]
    fn different_length_rejected() {
        assert!(!constant_time_eq(b"abc", b"abcdef"));
    }
}
