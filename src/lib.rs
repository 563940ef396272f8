pub mod auth;
pub mod configuration;
pub mod error;
pub mod telemetry;

pub use auth::{
    Claims, HashValue, HmacSecretDerivation, KeyDerivation, PasswordHasher, Pbkdf2Derivation,
    SecretDerivation, TokenSigner,
};
pub use configuration::{get_configuration, HashingSettings, Settings, SigningSettings};
pub use error::{AppError, ConfigurationError, ValidationError, VerificationError};
