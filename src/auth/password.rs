/// Password Hashing and Verification
///
/// Key derivation service: turns a plaintext password into a
/// storage-safe `HashValue` and compares plaintexts against stored
/// hashes. Derivation is deliberately slow (iterated PBKDF2) and runs
/// on the blocking thread pool so it never stalls the async runtime.

use std::sync::Arc;

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Sha256, Sha384, Sha512};

use crate::auth::hash_value::HashValue;
use crate::configuration::{DigestAlgorithm, HashingSettings};
use crate::error::{AppError, ValidationError};

/// Separator between the pepper and the plaintext before derivation.
const PEPPER_SEPARATOR: &str = "::";

/// Key derivation strategy
///
/// Implementations must be deterministic for a given (plaintext, salt)
/// pair and must produce exactly `output_length()` bytes. Swapping the
/// strategy must not require changes in callers of `PasswordHasher`.
pub trait KeyDerivation: Send + Sync {
    /// Derive `output_length()` bytes from the plaintext and salt.
    fn derive(&self, plaintext: &str, salt: &[u8]) -> Vec<u8>;

    /// Fixed derived-key length in bytes.
    fn output_length(&self) -> usize;

    /// Fixed salt length in bytes.
    fn salt_length(&self) -> usize;
}

/// PBKDF2-HMAC key derivation over a configured digest.
pub struct Pbkdf2Derivation {
    settings: HashingSettings,
}

impl Pbkdf2Derivation {
    /// Build a derivation from validated hashing settings.
    ///
    /// # Errors
    /// Returns `ConfigurationError` if any parameter is below its
    /// safety floor. Parameters are never clamped.
    pub fn new(settings: HashingSettings) -> Result<Self, AppError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// Prefix the plaintext with the configured pepper, when present.
    fn peppered(&self, plaintext: &str) -> String {
        match &self.settings.pepper {
            Some(pepper) => format!("{}{}{}", pepper, PEPPER_SEPARATOR, plaintext),
            None => plaintext.to_string(),
        }
    }
}

impl KeyDerivation for Pbkdf2Derivation {
    fn derive(&self, plaintext: &str, salt: &[u8]) -> Vec<u8> {
        let input = self.peppered(plaintext);
        let mut output = vec![0u8; self.settings.output_length];
        match self.settings.algorithm {
            DigestAlgorithm::Sha256 => pbkdf2::pbkdf2_hmac::<Sha256>(
                input.as_bytes(),
                salt,
                self.settings.iterations,
                &mut output,
            ),
            DigestAlgorithm::Sha384 => pbkdf2::pbkdf2_hmac::<Sha384>(
                input.as_bytes(),
                salt,
                self.settings.iterations,
                &mut output,
            ),
            DigestAlgorithm::Sha512 => pbkdf2::pbkdf2_hmac::<Sha512>(
                input.as_bytes(),
                salt,
                self.settings.iterations,
                &mut output,
            ),
        }
        output
    }

    fn output_length(&self) -> usize {
        self.settings.output_length
    }

    fn salt_length(&self) -> usize {
        self.settings.salt_length
    }
}

/// Key derivation service
///
/// Stateless per call; safe for concurrent use across identities
/// without locking.
#[derive(Clone)]
pub struct PasswordHasher {
    derivation: Arc<dyn KeyDerivation>,
}

impl PasswordHasher {
    pub fn new(derivation: Arc<dyn KeyDerivation>) -> Self {
        Self { derivation }
    }

    /// Hash a plaintext password.
    ///
    /// Generates a cryptographically random salt of the configured
    /// length when none is supplied. The derivation is CPU-bound and
    /// executes on the blocking pool; the call either completes with a
    /// full `HashValue` or fails entirely.
    ///
    /// # Errors
    /// Returns `ValidationError` if a supplied salt has the wrong
    /// length, `Internal` if the blocking task is cancelled.
    pub async fn hash(
        &self,
        plaintext: &str,
        salt: Option<Vec<u8>>,
    ) -> Result<HashValue, AppError> {
        let salt = match salt {
            Some(salt) => {
                if salt.len() != self.derivation.salt_length() {
                    return Err(AppError::Validation(ValidationError::LengthMismatch {
                        field: "salt".to_string(),
                        expected: self.derivation.salt_length(),
                        actual: salt.len(),
                    }));
                }
                salt
            }
            None => generate_salt(self.derivation.salt_length()),
        };

        let derivation = Arc::clone(&self.derivation);
        let plaintext = plaintext.to_string();
        let derived = tokio::task::spawn_blocking(move || {
            let value = derivation.derive(&plaintext, &salt);
            (value, salt)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?;

        let (value, salt) = derived;
        HashValue::new(value, salt).map_err(AppError::from)
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// Re-derives using the stored salt and compares in constant time.
    /// A derived key of a different length than the stored one is an
    /// immediate non-match; no bytes are compared.
    pub async fn compare(
        &self,
        plaintext: &str,
        stored: &HashValue,
    ) -> Result<bool, AppError> {
        let derivation = Arc::clone(&self.derivation);
        let plaintext = plaintext.to_string();
        let salt = stored.salt().to_vec();

        let derived = tokio::task::spawn_blocking(move || derivation.derive(&plaintext, &salt))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?;

        Ok(constant_time_eq(&derived, stored.value()))
    }
}

/// Generate `length` random salt bytes from the OS entropy source.
fn generate_salt(length: usize) -> Vec<u8> {
    let mut salt = vec![0u8; length];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Fixed-time equality over equal-length byte sequences.
///
/// A length mismatch returns immediately without touching contents.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
