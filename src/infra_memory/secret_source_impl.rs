use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain_port::{MIN_SECRET_BYTES, SecretSource, SecretSourceError};

/// Secret source backed by the operating system CSPRNG. An exhausted or
/// unavailable source is an error, never a fallback to a weaker
/// generator.
pub struct OsRngSecretSource;

impl SecretSource for OsRngSecretSource {
    fn generate(&self, byte_len: usize) -> Result<String, SecretSourceError> {
        if byte_len < MIN_SECRET_BYTES {
            return Err(SecretSourceError::BelowMinimum {
                requested: byte_len,
            });
        }

        let mut buf = vec![0u8; byte_len];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| SecretSourceError::Unavailable(e.to_string()))?;

        Ok(hex::encode(buf))
    }
}
