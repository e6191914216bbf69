use crate::error::AuthError;
use crate::jwt::{Claims, ClaimsVerifier};

use http::HeaderMap;
use http::header::AUTHORIZATION;
use tracing::debug;

const BEARER_PREFIX: &str = "Bearer ";

/// Guards request handlers with bearer token authentication.
#[derive(Clone, Debug)]
pub struct AuthInterceptor<V>
where
    V: ClaimsVerifier,
{
    verifier: V,
    no_auth_methods: Vec<String>,
}

impl<V> AuthInterceptor<V>
where
    V: ClaimsVerifier,
{
    /// Creates an interceptor. Any method whose full name contains one of
    /// `no_auth_methods` is let through without a token.
    pub fn new<I, S>(verifier: V, no_auth_methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            verifier,
            no_auth_methods: no_auth_methods.into_iter().map(Into::into).collect(),
        }
    }

    /// Decides whether a call to `method` carrying `headers` may proceed.
    ///
    /// Returns `None` for allow-listed methods and the verified claims otherwise.
    ///
    /// # Errors
    /// Returns an [`AuthError`] when the request must be refused as unauthenticated.
    pub fn authorize(
        &self,
        method: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<Option<Claims>, AuthError> {
        if self
            .no_auth_methods
            .iter()
            .any(|allowed| method.contains(allowed.as_str()))
        {
            return Ok(None);
        }

        let headers = headers.ok_or(AuthError::MissingMetadata)?;
        let token = token_from_headers(headers).ok_or(AuthError::MissingAuthorization)?;

        match self.verifier.verify(token) {
            Ok(claims) => Ok(Some(claims)),
            Err(e) => {
                debug!(method, error = %e, "rejected bearer token");
                Err(AuthError::InvalidToken(e))
            }
        }
    }
}

/// Extracts the token from the first `authorization` header, minus any `Bearer ` prefix.
///
/// Returns `None` if there is no such header or its value is not visible ASCII.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    Some(value.strip_prefix(BEARER_PREFIX).unwrap_or(value))
}
