use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::config::JwtConfig;

use super::{AuthError, Claims, IdentityVerifier, VerifiedIdentity};

/// Verifies identity provider access tokens locally.
///
/// HS256 with a shared secret, or RS256 with the provider's public key.
pub struct JwtIdentityVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    pub fn new(config: &JwtConfig) -> Result<Self, AuthError> {
        let (decoding_key, algorithm) = match (&config.public_key_pem, &config.secret) {
            (Some(pem), _) => {
                let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| AuthError::Misconfigured(format!("Invalid public key: {}", e)))?;
                (key, Algorithm::RS256)
            }
            (None, Some(secret)) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            (None, None) => {
                return Err(AuthError::Misconfigured(
                    "either jwt.secret or jwt.public_key_pem must be set".to_string(),
                ))
            }
        };

        let mut validation = Validation::new(algorithm);
        // A configured claim must be present, not only match when sent
        let mut required = vec!["exp"];

        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }

        match config.audience {
            Some(ref audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }

        validation.set_required_spec_claims(&required);

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        let claims = self.validate(token)?;

        Ok(VerifiedIdentity {
            id: claims.subject().map(str::to_string),
            username: claims.preferred_username,
        })
    }
}
