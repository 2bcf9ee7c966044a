use std::env;
use thiserror::Error;

/// Development-only HS256 secret used when no identity provider domain is configured.
pub const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";
const LOCAL_AUDIENCE: &str = "drinks";
const LOCAL_ISSUER: &str = "https://drinks.local/";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup
/// and consumed by `main`; only `auth` is kept, inside the `JwtVerifier`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls logging format and auth fallbacks.
    pub env: Env,
    // SQLite connection string.
    pub db_url: String,
    pub db_max_connections: u32,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    pub auth: AuthConfig,
}

/// AuthConfig
///
/// How bearer tokens are verified. Exactly one key source is used: the JWKS
/// published by the identity provider, or (local only) a shared HS256 secret.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub audience: String,
    pub issuer: String,
    pub jwks_url: Option<String>,
    pub hs256_secret: Option<String>,
    pub jwks_cache_ttl_seconds: u64,
    pub leeway_seconds: u64,
}

/// Env
///
/// Runtime context. `Local` allows development fallbacks; `Production` demands
/// every identity-provider setting explicitly.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// ConfigError
///
/// A required variable is missing, or a numeric variable does not parse.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("{name} is not a valid number: {value}")]
    Invalid { name: &'static str, value: String },
}

impl AuthConfig {
    /// Builds the provider settings for an Auth0-style tenant domain such as
    /// `example.eu.auth0.com`.
    pub fn for_domain(domain: &str, audience: &str) -> Self {
        let domain = domain.trim_end_matches('/');
        Self {
            audience: audience.to_string(),
            issuer: format!("https://{domain}/"),
            jwks_url: Some(format!("https://{domain}/.well-known/jwks.json")),
            hs256_secret: None,
            jwks_cache_ttl_seconds: 600,
            leeway_seconds: 0,
        }
    }

    /// Shared-secret settings for local development and tests.
    pub fn local(secret: &str) -> Self {
        Self {
            audience: LOCAL_AUDIENCE.to_string(),
            issuer: LOCAL_ISSUER.to_string(),
            jwks_url: None,
            hs256_secret: Some(secret.to_string()),
            jwks_cache_ttl_seconds: 600,
            leeway_seconds: 0,
        }
    }
}

impl Default for AppConfig {
    /// A non-panicking configuration for test setup: in-memory database and
    /// HS256 tokens signed with the local development secret.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            bind_addr: "127.0.0.1:0".to_string(),
            auth: AuthConfig::local(LOCAL_JWT_SECRET),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables. In production the
    /// database URL and identity-provider settings are mandatory and their absence
    /// is an error, so the process never starts half-configured.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let required = |name: &'static str| env::var(name).map_err(|_| ConfigError::Missing(name));

        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", 5)?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        let (db_url, mut auth) = match env {
            Env::Production => {
                let domain = required("AUTH0_DOMAIN")?;
                let audience = required("API_AUDIENCE")?;
                (required("DATABASE_URL")?, AuthConfig::for_domain(&domain, &audience))
            }
            Env::Local => {
                let db_url = env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://database.db?mode=rwc".to_string());
                // A local setup can still point at a real tenant; otherwise fall back
                // to HS256 with the development secret.
                let auth = match env::var("AUTH0_DOMAIN") {
                    Ok(domain) => {
                        let audience = env::var("API_AUDIENCE")
                            .unwrap_or_else(|_| LOCAL_AUDIENCE.to_string());
                        AuthConfig::for_domain(&domain, &audience)
                    }
                    Err(_) => {
                        let secret = env::var("JWT_SECRET")
                            .unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string());
                        let mut auth = AuthConfig::local(&secret);
                        if let Ok(audience) = env::var("API_AUDIENCE") {
                            auth.audience = audience;
                        }
                        auth
                    }
                };
                (db_url, auth)
            }
        };

        auth.jwks_cache_ttl_seconds = parse_var("JWKS_CACHE_TTL_SECONDS", auth.jwks_cache_ttl_seconds)?;
        auth.leeway_seconds = parse_var("JWT_LEEWAY_SECONDS", auth.leeway_seconds)?;

        Ok(Self {
            env,
            db_url,
            db_max_connections,
            bind_addr,
            auth,
        })
    }
}
