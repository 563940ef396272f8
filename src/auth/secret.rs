/// Token Secret Derivation
///
/// Combines the configured base secret with a per-identity salt into
/// the concrete signing secret. Verification re-derives from the
/// current salt on every call, so rotating the salt invalidates every
/// previously issued token for that identity without a blacklist.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Secret derivation strategy
///
/// Must be deterministic (verification depends on it) and sensitive to
/// both inputs: changing either the base secret or the salt must
/// change the output.
pub trait SecretDerivation: Send + Sync {
    fn generate_secret(&self, secret_base: &str, salt: &str) -> Result<String, AppError>;
}

/// HMAC-SHA256 derivation: the base secret keys a MAC over the salt,
/// hex-encoded.
pub struct HmacSecretDerivation;

impl SecretDerivation for HmacSecretDerivation {
    fn generate_secret(&self, secret_base: &str, salt: &str) -> Result<String, AppError> {
        let mut mac = HmacSha256::new_from_slice(secret_base.as_bytes())
            .map_err(|e| AppError::Internal(format!("Secret derivation failed: {}", e)))?;
        mac.update(salt.as_bytes());
        Ok(format!("{:x}", mac.finalize().into_bytes()))
    }
}
