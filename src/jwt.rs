//! HS256 bearer token helpers.

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};

use crate::domain::auth::AuthenticatedUser;

/// Unix timestamp `ttl_seconds` from now.
pub fn expiration(ttl_seconds: u64) -> usize {
    let now = Utc::now().timestamp().max(0) as u64;
    now.saturating_add(ttl_seconds) as usize
}

pub fn encode_token(claims: &AuthenticatedUser, secret: &str) -> Result<String, Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies the signature and expiry of `token`.
pub fn decode_token(token: &str, secret: &str) -> Result<AuthenticatedUser, Error> {
    decode::<AuthenticatedUser>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::HeaderValue;

    use super::*;

    fn claims(exp: usize) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".to_string(),
            email: "owner@example.com".to_string(),
            name: "Owner".to_string(),
            is_superuser: false,
            is_staff: false,
            organization_id: Some(3),
            profile_type: None,
            permissions: vec!["lead:view".to_string()],
            exp,
        }
    }

    #[test]
    fn tokens_verify_with_the_same_secret_only() {
        let token = encode_token(&claims(expiration(60)), "secret").expect("token encodes");

        let decoded = decode_token(&token, "secret").expect("token decodes");
        assert_eq!(decoded.organization_id, Some(3));
        assert_eq!(decoded.permissions, vec!["lead:view".to_string()]);

        assert!(decode_token(&token, "other").is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = encode_token(&claims(1_000), "secret").expect("token encodes");
        assert!(decode_token(&token, "secret").is_err());
    }

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);
    }
}
