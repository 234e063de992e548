/// Smallest secret this crate will mint: 128 bits.
pub const MIN_SECRET_BYTES: usize = 16;

/// Length used for every credential and session identifier: 256 bits.
pub const SECRET_BYTES: usize = 32;

/// Source of unpredictable fixed-length opaque strings.
///
/// Must fail when the secure source does; never degrades to a
/// non-cryptographic generator.
pub trait SecretSource: Send + Sync {
    /// Draw `byte_len` bytes from a CSPRNG and hex-encode them.
    fn generate(&self, byte_len: usize) -> Result<String, SecretSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SecretSourceError {
    #[error("secure random source unavailable: {0}")]
    Unavailable(String),
    #[error("requested {requested} bytes, minimum is {MIN_SECRET_BYTES}")]
    BelowMinimum { requested: usize },
}
