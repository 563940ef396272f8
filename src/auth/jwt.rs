/// Token Issuance and Verification
///
/// Issues and validates signed, expiring tokens under a secret derived
/// per call from (configured base secret, per-identity salt). There is
/// no token store: a token is valid exactly when it verifies against
/// the secret re-derived from the salt the caller presents, so rotating
/// an identity's salt revokes everything signed before the rotation.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};

use crate::auth::claims::Claims;
use crate::auth::secret::SecretDerivation;
use crate::configuration::SigningSettings;
use crate::error::{AppError, VerificationError};

pub struct TokenSigner {
    settings: SigningSettings,
    secrets: Arc<dyn SecretDerivation>,
}

impl TokenSigner {
    pub fn new(settings: SigningSettings, secrets: Arc<dyn SecretDerivation>) -> Self {
        Self { settings, secrets }
    }

    /// Sign a payload into an expiring token.
    ///
    /// The claim set is the payload merged with the configured issuer,
    /// the configured subject (when set), the supplied audience (when
    /// given), and an expiry of issue-time plus the validity period.
    ///
    /// # Errors
    /// Returns error if secret derivation or encoding fails.
    pub fn sign(
        &self,
        payload: Map<String, Value>,
        salt: &str,
        audience: Option<&str>,
    ) -> Result<String, AppError> {
        let secret = self
            .secrets
            .generate_secret(self.settings.secret_base(), salt)?;

        let claims = Claims::new(
            payload,
            self.settings.issuer().to_string(),
            self.settings.subject().map(str::to_string),
            audience.map(str::to_string),
            self.settings.validity_period(),
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Check whether a token is valid for the given salt.
    ///
    /// Re-derives the signing secret exactly as `sign` does, then
    /// verifies signature, issuer, subject (when configured), audience
    /// (when supplied), and expiry with zero leeway.
    ///
    /// Returns `Ok(false)` for the recognized token-invalid outcomes:
    /// bad signature (including a salt rotated since signing), expiry,
    /// or an issuer/audience/subject mismatch. A token the mechanism
    /// cannot even parse is not an invalid credential but a systemic
    /// problem, and propagates as a `Verification` error.
    pub fn is_token_valid(
        &self,
        token: &str,
        salt: &str,
        audience: Option<&str>,
    ) -> Result<bool, AppError> {
        let secret = self
            .secrets
            .generate_secret(self.settings.secret_base(), salt)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.settings.issuer()]);
        if let Some(subject) = self.settings.subject() {
            // A constrained claim must be present, not merely match
            // when present
            validation.sub = Some(subject.to_string());
            validation.required_spec_claims.insert("sub".to_string());
        }
        match audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        ) {
            Ok(_) => Ok(true),
            Err(e) => match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::ExpiredSignature
                | ErrorKind::ImmatureSignature
                | ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::InvalidSubject => {
                    tracing::debug!(error = %e, "Token rejected");
                    Ok(false)
                }
                // A token lacking a constrained claim is an invalid
                // credential, not a broken verification
                ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "sub" => {
                    tracing::debug!(error = %e, "Token rejected");
                    Ok(false)
                }
                _ => {
                    let err = AppError::Verification(VerificationError(e.to_string()));
                    err.log("is_token_valid");
                    Err(err)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::secret::HmacSecretDerivation;
    use serde_json::json;

    fn test_signer() -> TokenSigner {
        let settings = SigningSettings::new(
            500,
            "this-is-secret-base".to_string(),
            "testIssuer".to_string(),
            Some("testSubject".to_string()),
        )
        .expect("Invalid test settings");
        TokenSigner::new(settings, Arc::new(HmacSecretDerivation))
    }

    fn payload() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("testKey".to_string(), json!("testValue"));
        map
    }

    #[test]
    fn test_sign_and_validate() {
        let signer = test_signer();
        let token = signer
            .sign(payload(), "saltA", Some("aud1"))
            .expect("Failed to sign");

        let valid = signer
            .is_token_valid(&token, "saltA", Some("aud1"))
            .expect("Verification errored");
        assert!(valid);
    }

    #[test]
    fn test_salt_rotation_revokes() {
        let signer = test_signer();
        let token = signer.sign(payload(), "saltA", Some("aud1")).unwrap();

        let valid = signer.is_token_valid(&token, "saltB", Some("aud1")).unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let signer = test_signer();
        let token = signer.sign(payload(), "saltA", Some("aud1")).unwrap();

        let valid = signer.is_token_valid(&token, "saltA", Some("aud2")).unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_missing_audience_rejected_when_audience_required() {
        let signer = test_signer();
        // Signed without an audience claim at all
        let token = signer.sign(payload(), "saltA", None).unwrap();

        let valid = signer.is_token_valid(&token, "saltA", Some("aud1")).unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_missing_subject_rejected_when_subject_configured() {
        let signer = test_signer();
        let secret = HmacSecretDerivation
            .generate_secret("this-is-secret-base", "saltA")
            .unwrap();

        // Correct signature, issuer, and expiry, but no sub claim
        let mut claims = Claims::new(
            payload(),
            "testIssuer".to_string(),
            Some("testSubject".to_string()),
            None,
            500,
        );
        claims.sub = None;
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let valid = signer.is_token_valid(&token, "saltA", None).unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_token_without_audience() {
        let signer = test_signer();
        let token = signer.sign(payload(), "saltA", None).unwrap();

        let valid = signer.is_token_valid(&token, "saltA", None).unwrap();
        assert!(valid);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let signer = test_signer();
        let token = signer.sign(payload(), "saltA", None).unwrap();

        // Flip the last signature character
        let mut tampered = token.clone();
        let last = if tampered.ends_with('A') { 'B' } else { 'A' };
        tampered.pop();
        tampered.push(last);

        let valid = signer.is_token_valid(&tampered, "saltA", None).unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_malformed_token_propagates_error() {
        let signer = test_signer();
        let result = signer.is_token_valid("not-a-token", "saltA", None);
        match result {
            Err(AppError::Verification(_)) => (),
            other => panic!("Expected Verification error, got {:?}", other),
        }
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = test_signer();
        let secret = HmacSecretDerivation
            .generate_secret("this-is-secret-base", "saltA")
            .unwrap();

        // Encode claims whose expiry is already in the past
        let mut claims = Claims::new(
            payload(),
            "testIssuer".to_string(),
            Some("testSubject".to_string()),
            None,
            500,
        );
        claims.exp = claims.iat - 120;
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let valid = signer.is_token_valid(&token, "saltA", None).unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let signer = test_signer();

        let other_settings = SigningSettings::new(
            500,
            "this-is-secret-base".to_string(),
            "otherIssuer".to_string(),
            Some("testSubject".to_string()),
        )
        .unwrap();
        let other_signer = TokenSigner::new(other_settings, Arc::new(HmacSecretDerivation));

        let token = other_signer.sign(payload(), "saltA", None).unwrap();
        let valid = signer.is_token_valid(&token, "saltA", None).unwrap();
        assert!(!valid);
    }

    #[test]
    fn test_claims_carry_expected_fields() {
        let signer = test_signer();
        let token = signer.sign(payload(), "saltA", Some("aud1")).unwrap();

        let secret = HmacSecretDerivation
            .generate_secret("this-is-secret-base", "saltA")
            .unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["aud1"]);
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims;

        let now = chrono::Utc::now().timestamp();
        assert_eq!(decoded.iss, "testIssuer");
        assert_eq!(decoded.sub.as_deref(), Some("testSubject"));
        assert_eq!(decoded.aud.as_deref(), Some("aud1"));
        assert_eq!(decoded.payload["testKey"], json!("testValue"));
        assert!((decoded.exp - now - 500).abs() <= 2);
    }
}
