use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, decode_header,
    errors::ErrorKind,
    jwk::{Jwk, JwkSet},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::{AppState, config::AuthConfig, error::ApiError};

/// Claims
///
/// The decoded payload of a bearer token. Signature, `exp`, `aud` and `iss` are
/// validated by `jsonwebtoken` before this struct is produced; `permissions`
/// is checked separately so its absence can be classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// AuthError
///
/// Classified authorization failure. Each variant maps to a fixed status and
/// machine-readable code; the `Display` text is the client-facing description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    HeaderMissing,
    #[error("Authorization header must start with \"Bearer\".")]
    NotBearer,
    #[error("Token not found.")]
    TokenMissing,
    #[error("Authorization header must be bearer token.")]
    TooManyParts,
    #[error("Authorization malformed.")]
    KeyIdMissing,
    #[error("Unable to find the appropriate key.")]
    UnknownKey,
    #[error("Unable to fetch signing keys.")]
    KeysUnavailable,
    #[error("Token expired.")]
    TokenExpired,
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    IncorrectClaims,
    #[error("Unable to parse authentication token.")]
    MalformedToken,
    #[error("Permissions not included in JWT.")]
    PermissionsMissing,
    #[error("Permission not found.")]
    PermissionDenied,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::PermissionsMissing => StatusCode::BAD_REQUEST,
            AuthError::PermissionDenied => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::HeaderMissing => "authorization_header_missing",
            AuthError::KeysUnavailable => "jwks_unavailable",
            AuthError::TokenExpired => "token_expired",
            AuthError::IncorrectClaims | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::PermissionDenied => "unauthorized",
            AuthError::NotBearer
            | AuthError::TokenMissing
            | AuthError::TooManyParts
            | AuthError::KeyIdMissing
            | AuthError::UnknownKey
            | AuthError::MalformedToken => "invalid_header",
        }
    }
}

/// bearer_token
///
/// Splits an `Authorization` header value into its two whitespace-separated
/// parts and returns the token. The scheme is matched case-insensitively.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header
        .filter(|h| !h.trim().is_empty())
        .ok_or(AuthError::HeaderMissing)?;

    let parts: Vec<&str> = header.split_whitespace().collect();
    match parts.as_slice() {
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::NotBearer),
        [_] => Err(AuthError::TokenMissing),
        [_, token] => Ok(token),
        _ => Err(AuthError::TooManyParts),
    }
}

/// check_permissions
///
/// A token without a `permissions` claim is a malformed grant (400); a token
/// whose permissions do not include `permission` is a refusal (403).
pub fn check_permissions(claims: &Claims, permission: &str) -> Result<(), AuthError> {
    let permissions = claims
        .permissions
        .as_ref()
        .ok_or(AuthError::PermissionsMissing)?;

    if permissions.iter().any(|p| p == permission) {
        Ok(())
    } else {
        Err(AuthError::PermissionDenied)
    }
}

fn classify(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::IncorrectClaims,
        _ => AuthError::MalformedToken,
    }
}

/// Floor between two JWKS fetches triggered by unknown `kid`s.
const JWKS_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CachedJwks {
    set: Arc<JwkSet>,
    fetched_at: Instant,
}

impl CachedJwks {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }

    fn is_recent(&self, ttl: Duration) -> bool {
        self.is_fresh(ttl) && self.fetched_at.elapsed() < JWKS_MIN_REFRESH_INTERVAL
    }
}

/// JwtVerifier
///
/// Verifies bearer tokens against the identity provider's signing keys. The
/// only state is the cached JWKS, refreshed after its TTL or on an unknown `kid`
/// (at most once per `JWKS_MIN_REFRESH_INTERVAL`).
#[derive(Debug)]
pub struct JwtVerifier {
    config: AuthConfig,
    jwks_cache: RwLock<Option<CachedJwks>>,
    http: reqwest::Client,
}

impl JwtVerifier {
    pub fn new(config: AuthConfig) -> Self {
        let http = match reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
        {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to configure reqwest client; using defaults");
                reqwest::Client::new()
            }
        };

        Self {
            config,
            jwks_cache: RwLock::new(None),
            http,
        }
    }

    /// authorize
    ///
    /// The full guard: header shape, token verification, then the permission
    /// check. Each stage short-circuits with its own classification.
    pub async fn authorize(
        &self,
        header: Option<&str>,
        permission: &str,
    ) -> Result<Claims, AuthError> {
        let token = bearer_token(header)?;
        let claims = self.verify(token).await?;
        check_permissions(&claims, permission)?;
        Ok(claims)
    }

    /// Verifies signature, expiry, audience and issuer, returning the claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        if let Some(secret) = self.config.hs256_secret.as_deref() {
            self.decode_hs256(token, secret)
        } else if self.config.jwks_url.is_some() {
            self.decode_with_jwks(token).await
        } else {
            tracing::error!("no signing key source is configured");
            Err(AuthError::KeysUnavailable)
        }
    }

    fn decode_hs256(&self, token: &str, secret: &str) -> Result<Claims, AuthError> {
        let validation = self.validation_for(Algorithm::HS256);

        decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            .map(|data| data.claims)
            .map_err(classify)
    }

    async fn decode_with_jwks(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        let kid = header.kid.ok_or(AuthError::KeyIdMissing)?;

        let jwk = self.get_jwk(&kid).await?.ok_or(AuthError::UnknownKey)?;
        let decoding_key = DecodingKey::from_jwk(&jwk).map_err(|_| AuthError::UnknownKey)?;

        let validation = self.validation_for(Algorithm::RS256);

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(classify)
    }

    fn validation_for(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.leeway = self.config.leeway_seconds;
        validation.set_audience(&[self.config.audience.as_str()]);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation
    }

    async fn get_jwk(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        let ttl = Duration::from_secs(self.config.jwks_cache_ttl_seconds);

        if let Some(jwk) = self.cached_jwk(kid, ttl).await {
            return Ok(Some(jwk));
        }

        if self
            .jwks_cache
            .read()
            .await
            .as_ref()
            .is_some_and(|cached| cached.is_recent(ttl))
        {
            tracing::debug!(kid, "unknown kid; JWKS refreshed too recently to refetch");
            return Ok(None);
        }

        // Unknown kid or stale set: refresh once, then look again.
        self.refresh_jwks().await?;
        Ok(self.cached_jwk(kid, ttl).await)
    }

    async fn cached_jwk(&self, kid: &str, ttl: Duration) -> Option<Jwk> {
        let cache = self.jwks_cache.read().await;
        let set = match cache.as_ref() {
            Some(cached) if cached.is_fresh(ttl) => Arc::clone(&cached.set),
            _ => return None,
        };
        drop(cache);

        set.keys
            .iter()
            .find(|k| k.common.key_id.as_deref() == Some(kid))
            .cloned()
    }

    async fn refresh_jwks(&self) -> Result<(), AuthError> {
        let Some(url) = self.config.jwks_url.as_deref() else {
            return Ok(());
        };

        let set = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::error!(error = %e, url, "JWKS fetch failed");
                AuthError::KeysUnavailable
            })?
            .json::<JwkSet>()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, url, "JWKS response did not parse");
                AuthError::KeysUnavailable
            })?;

        tracing::debug!(keys = set.keys.len(), "JWKS refreshed");
        *self.jwks_cache.write().await = Some(CachedJwks {
            set: Arc::new(set),
            fetched_at: Instant::now(),
        });
        Ok(())
    }
}

/// RequiredPermission
///
/// State for the guard layer wrapped around one protected route.
#[derive(Clone)]
pub struct RequiredPermission {
    verifier: Arc<JwtVerifier>,
    permission: &'static str,
}

impl RequiredPermission {
    pub fn new(state: &AppState, permission: &'static str) -> Self {
        Self {
            verifier: state.auth.clone(),
            permission,
        }
    }
}

/// require_permission
///
/// Route-layer middleware run before a protected handler. On success the
/// decoded `Claims` are inserted into the request extensions for the handler to
/// take as `Extension<Claims>`; otherwise the request is rejected with the
/// guard's classification.
pub async fn require_permission(
    State(required): State<RequiredPermission>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().map(str::to_owned).map_err(|_| AuthError::NotBearer))
        .transpose()?;

    let claims = required
        .verifier
        .authorize(authorization.as_deref(), required.permission)
        .await
        .inspect_err(|e| {
            tracing::warn!(
                permission = required.permission,
                code = e.code(),
                "request rejected: {e}"
            );
        })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
