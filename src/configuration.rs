use serde::Deserialize;

use crate::error::ConfigurationError;

/// Safety floors for key derivation parameters.
///
/// Values below these are rejected at load time, never silently clamped.
pub const MIN_ITERATIONS: u32 = 10_000;
pub const MIN_OUTPUT_LENGTH: usize = 64;
pub const MIN_SALT_LENGTH: usize = 16;

/// Minimum constraints for token signing parameters.
pub const MIN_VALIDITY_PERIOD: i64 = 60; // exclusive: validity must be > 60s
pub const MIN_SECRET_BASE_LENGTH: usize = 8;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub hashing: HashingSettings,
    pub signing: SigningSettings,
}

impl Settings {
    /// Validate every section eagerly.
    ///
    /// Called once at load; the subsystem never re-checks these values
    /// at call time.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.hashing.validate()?;
        self.signing.validate()?;
        Ok(())
    }
}

/// Digest algorithm used for PBKDF2 key derivation
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

/// Key derivation parameters
///
/// Loaded once at process start; effectively immutable process-wide
/// state. The pepper, when set, binds every hash to a server-held
/// secret in addition to the per-record salt, so a database leak alone
/// is insufficient to brute-force offline.
#[derive(Deserialize, Clone)]
pub struct HashingSettings {
    pub pepper: Option<String>,
    pub iterations: u32,
    pub output_length: usize,
    pub salt_length: usize,
    pub algorithm: DigestAlgorithm,
}

impl HashingSettings {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.iterations < MIN_ITERATIONS {
            return Err(ConfigurationError::ValueTooLow {
                field: "hashing.iterations".to_string(),
                floor: u64::from(MIN_ITERATIONS),
            });
        }
        if self.output_length < MIN_OUTPUT_LENGTH {
            return Err(ConfigurationError::ValueTooLow {
                field: "hashing.output_length".to_string(),
                floor: MIN_OUTPUT_LENGTH as u64,
            });
        }
        if self.salt_length < MIN_SALT_LENGTH {
            return Err(ConfigurationError::ValueTooLow {
                field: "hashing.salt_length".to_string(),
                floor: MIN_SALT_LENGTH as u64,
            });
        }
        Ok(())
    }
}

/// Token signing settings
///
/// Fields are private; a value of this type only exists in a validated
/// state, whether built through `new` or deserialized and then passed
/// through `validate`.
#[derive(Deserialize, Clone)]
pub struct SigningSettings {
    validity_period: i64, // seconds
    secret_base: String,
    issuer: String,
    subject: Option<String>,
}

impl SigningSettings {
    /// Construct validated signing settings.
    ///
    /// Constraints are checked in order: validity period, secret base,
    /// issuer. The first violation fails construction; no half-valid
    /// value exists.
    pub fn new(
        validity_period: i64,
        secret_base: String,
        issuer: String,
        subject: Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let settings = Self {
            validity_period,
            secret_base,
            issuer,
            subject,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.validity_period <= MIN_VALIDITY_PERIOD {
            return Err(ConfigurationError::ValueTooLow {
                field: "signing.validity_period".to_string(),
                floor: MIN_VALIDITY_PERIOD as u64 + 1,
            });
        }
        if self.secret_base.len() < MIN_SECRET_BASE_LENGTH {
            return Err(ConfigurationError::TooShort {
                field: "signing.secret_base".to_string(),
                min: MIN_SECRET_BASE_LENGTH,
            });
        }
        if self.issuer.is_empty() {
            return Err(ConfigurationError::Empty("signing.issuer".to_string()));
        }
        Ok(())
    }

    pub fn validity_period(&self) -> i64 {
        self.validity_period
    }

    pub fn secret_base(&self) -> &str {
        &self.secret_base
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}

/// Load settings from the optional `configuration` file plus
/// `APP__`-prefixed environment variables, then validate eagerly so an
/// invalid security configuration aborts startup before any hashing or
/// signing occurs.
pub fn get_configuration() -> Result<Settings, ConfigurationError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()
        .map_err(|e| ConfigurationError::Load(e.to_string()))?;

    let settings = settings
        .try_deserialize::<Settings>()
        .map_err(|e| ConfigurationError::Load(e.to_string()))?;

    settings.validate()?;
    Ok(settings)
}
