//! HS256 bearer tokens carrying a user identity.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::config::AuthConfig;
use crate::types::User;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Wrong secret, or a signing algorithm other than HS256.
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Longest accepted token lifetime (one year).
pub const MAX_TTL_SECS: i64 = 365 * 24 * 3600;

/// Claims embedded in every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Accepted as an integer, an integral float, or a numeric string.
    #[serde(deserialize_with = "user_id_claim")]
    pub user_id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "iss", default)]
    pub issuer: String,
    /// Unix seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUserId {
    Int(i64),
    Float(f64),
    Text(String),
}

fn user_id_claim<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawUserId::deserialize(deserializer)? {
        RawUserId::Int(v) => Ok(v),
        RawUserId::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Ok(v as i64),
        RawUserId::Float(v) => Err(de::Error::custom(format!("user_id is not an integer: {}", v))),
        RawUserId::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("user_id is not numeric: {:?}", s))),
    }
}

/// Issues and verifies tokens. Cheap to clone; keys are shared.
#[derive(Clone)]
pub struct AuthTokenService {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
    issuer: String,
    ttl: Duration,
}

impl Debug for AuthTokenService {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokenService").field("issuer", &self.issuer).field("ttl", &self.ttl).finish()
    }
}

impl AuthTokenService {
    pub fn new(cfg: &AuthConfig) -> Self {
        let secret = cfg.signature_key.as_bytes();
        let ttl_secs = i64::try_from(cfg.token_ttl_secs).unwrap_or(MAX_TTL_SECS).min(MAX_TTL_SECS);
        Self {
            encoding_key: Arc::new(EncodingKey::from_secret(secret)),
            decoding_key: Arc::new(DecodingKey::from_secret(secret)),
            validation: Arc::new({
                let mut validation = Validation::new(Algorithm::HS256);
                validation.validate_exp = true;
                validation.leeway = 0;
                validation
            }),
            issuer: cfg.service_name.clone(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn generate_token(&self, user: &User) -> Result<String, TokenError> {
        self.generate_token_at(user, Utc::now())
    }

    /// Issues a token as if it had been signed at `issued_at`.
    pub fn generate_token_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = TokenClaims {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            issuer: self.issuer.clone(),
            expires_at: (issued_at + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify_claims(&self, token: &str) -> Result<TokenClaims, TokenError> {
        check_header_alg(token)?;
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })
    }

    /// Verifies the token and returns the user id it was issued for.
    pub fn verify_token(&self, token: &str) -> Result<i64, TokenError> {
        self.verify_claims(token).map(|claims| claims.user_id)
    }
}

/// Rejects any header that names a signing method other than HS256,
/// including ones `jsonwebtoken` cannot represent such as `none`.
/// Headers that do not parse are left for `decode` to report.
fn check_header_alg(token: &str) -> Result<(), TokenError> {
    let Some(segment) = token.split('.').next() else {
        return Ok(());
    };
    let Ok(bytes) = general_purpose::URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')) else {
        return Ok(());
    };
    let Ok(header) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
        return Ok(());
    };
    match header.get("alg").and_then(serde_json::Value::as_str) {
        Some("HS256") => Ok(()),
        _ => Err(TokenError::InvalidSignature),
    }
}
