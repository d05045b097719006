// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Autosave cadence the test-taking client is expected to use.
pub const AUTOSAVE_INTERVAL_SECONDS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Shared secret of the identity provider that signs bearer tokens.
    pub jwt_secret: String,
    /// Expected `aud` claim. Not checked when unset.
    pub jwt_audience: Option<String>,
    pub rust_log: String,
    pub bind_addr: String,
    pub log_dir: String,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_audience = env::var("JWT_AUDIENCE").ok().filter(|v| !v.is_empty());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string()),
        );

        Self {
            database_url,
            jwt_secret,
            jwt_audience,
            rust_log,
            bind_addr,
            log_dir,
            cors_origins,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_skips_blanks() {
        let origins = parse_origins(" http://a.test , ,http://b.test");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(parse_origins("").is_empty());
    }
}
