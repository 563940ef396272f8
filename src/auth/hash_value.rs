/// Derived password hash representation
///
/// An immutable pair of derived-key bytes and the salt that produced
/// them. A credential record embeds this wholesale and replaces it
/// wholesale on password change; it is never partially updated.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashValue {
    value: Vec<u8>,
    salt: Vec<u8>,
}

impl HashValue {
    /// Construct a hash value from derived bytes and their salt.
    ///
    /// # Errors
    /// Returns `ValidationError::EmptyField` if either part is empty;
    /// a hash value never exists with one field missing.
    pub fn new(value: Vec<u8>, salt: Vec<u8>) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyField("value".to_string()));
        }
        if salt.is_empty() {
            return Err(ValidationError::EmptyField("salt".to_string()));
        }
        Ok(Self { value, salt })
    }

    /// The derived key bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The salt used to derive `value`.
    pub fn salt(&self) -> &[u8] {
        &self.salt
    }
}
