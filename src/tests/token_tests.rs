#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose, Engine as _};
    use chrono::{Duration, Utc};
    use jsonwebtoken::{Algorithm, EncodingKey, Header};
    use serde_json::json;

    use crate::auth::{AuthTokenService, TokenError};
    use crate::config::AuthConfig;
    use crate::error::AppError;
    use crate::types::User;

    const SECRET: &str = "token-test-secret";

    fn service(secret: &str) -> AuthTokenService {
        AuthTokenService::new(&AuthConfig {
            service_name: "inventorysvc".to_string(),
            signature_key: secret.to_string(),
            token_ttl_secs: 3600,
        })
    }

    fn user() -> User {
        User { id: 42, username: "reader".to_string(), email: "reader@x.com".to_string(), password_hash: String::new() }
    }

    fn sign(claims: serde_json::Value, alg: Algorithm) -> String {
        jsonwebtoken::encode(&Header::new(alg), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    fn future_exp() -> i64 {
        (Utc::now() + Duration::hours(1)).timestamp()
    }

    #[test]
    fn test_round_trip() {
        let tokens = service(SECRET);
        let token = tokens.generate_token(&user()).unwrap();

        assert_eq!(tokens.verify_token(&token).unwrap(), 42);
        let claims = tokens.verify_claims(&token).unwrap();
        assert_eq!(claims.username, "reader");
        assert_eq!(claims.email, "reader@x.com");
        assert_eq!(claims.issuer, "inventorysvc");
        let ttl = claims.expires_at - Utc::now().timestamp();
        assert!((3590..=3600).contains(&ttl), "ttl was {}", ttl);
    }

    #[test]
    fn test_token_past_expiry_is_rejected() {
        let tokens = service(SECRET);
        let issued = Utc::now() - Duration::seconds(3601);
        let token = tokens.generate_token_at(&user(), issued).unwrap();

        assert_eq!(tokens.verify_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let token = service("another-secret").generate_token(&user()).unwrap();
        assert_eq!(service(SECRET).verify_token(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_other_algorithm_is_invalid_signature() {
        let token = sign(json!({ "user_id": 42, "exp": future_exp() }), Algorithm::HS512);
        assert_eq!(service(SECRET).verify_token(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = service(SECRET);
        for token in ["", "not-a-token", "a.b.c"] {
            assert!(matches!(tokens.verify_token(token), Err(TokenError::Malformed(_))), "token {:?}", token);
        }
    }

    #[test]
    fn test_alg_none_is_invalid_signature() {
        let tokens = service(SECRET);
        let encode = |v: serde_json::Value| general_purpose::URL_SAFE_NO_PAD.encode(v.to_string());
        let payload = encode(json!({ "user_id": 1, "exp": future_exp() }));
        for alg in ["none", "None", "HS999"] {
            let token = format!("{}.{}.", encode(json!({ "alg": alg, "typ": "JWT" })), payload);
            assert_eq!(tokens.verify_token(&token), Err(TokenError::InvalidSignature), "alg {}", alg);
        }
    }

    #[test]
    fn test_user_id_claim_accepts_numeric_forms() {
        let tokens = service(SECRET);
        let as_float = sign(json!({ "user_id": 42.0, "exp": future_exp() }), Algorithm::HS256);
        let as_string = sign(json!({ "user_id": "42", "exp": future_exp() }), Algorithm::HS256);

        assert_eq!(tokens.verify_token(&as_float).unwrap(), 42);
        assert_eq!(tokens.verify_token(&as_string).unwrap(), 42);
    }

    #[test]
    fn test_bad_or_missing_claims_are_malformed() {
        let tokens = service(SECRET);
        let cases = [
            json!({ "user_id": "forty-two", "exp": future_exp() }),
            json!({ "user_id": 42.5, "exp": future_exp() }),
            json!({ "exp": future_exp() }),
            json!({ "user_id": 42 }),
        ];
        for claims in cases {
            let token = sign(claims.clone(), Algorithm::HS256);
            assert!(matches!(tokens.verify_token(&token), Err(TokenError::Malformed(_))), "claims {}", claims);
        }
    }

    #[test]
    fn test_token_errors_map_to_unauthorized() {
        assert!(matches!(AppError::from(TokenError::Expired), AppError::Unauthorized(_)));
        assert!(matches!(AppError::from(TokenError::InvalidSignature), AppError::Unauthorized(_)));
        assert!(matches!(AppError::from(TokenError::Signing("x".into())), AppError::Internal(_)));
    }
}
