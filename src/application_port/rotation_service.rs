use chrono::{DateTime, Utc};

use crate::domain_model::OwnerId;
use crate::domain_port::{CredentialStoreError, SecretSourceError};

/// Short-lived bearer credential. Opaque, never stored by this crate;
/// validity is carried purely by its TTL.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AccessToken(pub String);

/// Long-lived single-use bearer credential, exchanged exactly once for a
/// successor pair.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: RefreshToken,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("token reuse detected")]
    ReuseDetected,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl RotationError {
    /// The one string every rejected presenter sees. Which of the
    /// rejection kinds fired is for policy and audit logs only; leaking
    /// it would hand an attacker a validity oracle.
    pub fn public_message(&self) -> &'static str {
        match self {
            RotationError::TokenInvalid
            | RotationError::TokenExpired
            | RotationError::ReuseDetected => "invalid or expired credential",
            RotationError::Store(_) | RotationError::InternalError(_) => "internal error",
        }
    }

    /// True for outcomes that should raise a security audit event rather
    /// than a plain rejection.
    pub fn is_security_event(&self) -> bool {
        matches!(self, RotationError::ReuseDetected)
    }
}

impl From<CredentialStoreError> for RotationError {
    fn from(error: CredentialStoreError) -> Self {
        match error {
            CredentialStoreError::NotFound => RotationError::TokenInvalid,
            CredentialStoreError::Expired => RotationError::TokenExpired,
            CredentialStoreError::AlreadyConsumed => RotationError::ReuseDetected,
            // A colliding 256-bit id is an entropy bug, not a caller error.
            CredentialStoreError::DuplicateId => {
                RotationError::InternalError("credential id collision".to_owned())
            }
            CredentialStoreError::Store(e) => RotationError::Store(e),
        }
    }
}

impl From<SecretSourceError> for RotationError {
    fn from(error: SecretSourceError) -> Self {
        RotationError::InternalError(error.to_string())
    }
}

/// Issues access/refresh pairs and rotates refresh tokens, treating any
/// second presentation of a consumed token as evidence of theft.
#[async_trait::async_trait]
pub trait RotationService: Send + Sync {
    /// Mint a fresh pair for an owner. The refresh credential is
    /// recorded; the access token is not.
    async fn issue_pair(&self, owner_id: OwnerId) -> Result<TokenPair, RotationError>;

    /// Trade a refresh token for a successor pair. Valid exactly once;
    /// a replay returns `ReuseDetected` after the owner's entire
    /// lineage has been revoked.
    async fn exchange(&self, refresh_token: &RefreshToken) -> Result<TokenPair, RotationError>;

    /// Explicitly invalidate one refresh token (sign-out).
    async fn revoke(&self, refresh_token: &RefreshToken) -> Result<(), RotationError>;

    /// Invalidate every live credential of an owner ("log out
    /// everywhere"). Returns how many were revoked.
    async fn revoke_all_for_owner(&self, owner_id: OwnerId) -> Result<usize, RotationError>;
}
