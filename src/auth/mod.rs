/// Credential subsystem
///
/// Password key derivation, hash comparison, and signed-token
/// issuance/verification with revocation by salt rotation.

mod claims;
mod hash_value;
mod jwt;
mod password;
mod secret;

pub use claims::Claims;
pub use hash_value::HashValue;
pub use jwt::TokenSigner;
pub use password::KeyDerivation;
pub use password::PasswordHasher;
pub use password::Pbkdf2Derivation;
pub use secret::HmacSecretDerivation;
pub use secret::SecretDerivation;
