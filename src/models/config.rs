//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_token_ttl_seconds() -> u64 {
    3600
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// HS256 secret shared with the identity provider.
    pub secret: String,
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

impl ServerConfig {
    pub fn auth(&self) -> AuthConfig {
        AuthConfig {
            secret: self.secret.clone(),
            token_ttl_seconds: self.token_ttl_seconds,
        }
    }
}

/// Token settings registered as application data for the middleware and
/// the token endpoint.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub secret: String,
    pub token_ttl_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_ttl_has_a_default() {
        let config: ServerConfig = serde_json::from_value(serde_json::json!({
            "address": "127.0.0.1",
            "port": 8080,
            "database_url": "app.db",
            "secret": "s3cret",
        }))
        .expect("config without optional keys");

        let auth = config.auth();
        assert_eq!(auth.token_ttl_seconds, 3600);
        assert_eq!(auth.secret, "s3cret");
    }
}
