use http::StatusCode;
use thiserror::Error;

/// Errors issuing or verifying a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Header or payload could not be encoded or decoded as JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A claim is present with the wrong type.
    #[error("claim '{0}' has an invalid type")]
    InvalidClaim(&'static str),

    /// The signing secret was rejected by the MAC.
    #[error("invalid signing key")]
    InvalidKey,

    /// The signature does not match the token contents.
    #[error("signature mismatch")]
    InvalidSignature,

    /// The token is not three base64url segments.
    #[error("malformed token: {0}")]
    Malformed(&'static str),

    /// The token's `exp` has passed.
    #[error("token has expired")]
    Expired,

    /// The token's `nbf` is still in the future.
    #[error("token is not valid yet")]
    NotYetValid,

    /// The configured lifetime cannot be represented.
    #[error("token lifetime out of range")]
    TtlOutOfRange,

    /// The header names an algorithm other than HS256.
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Reasons a request is refused. All of them mean the caller is unauthenticated.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request carried no metadata at all.
    #[error("missing metadata")]
    MissingMetadata,

    /// The request carried no `authorization` header.
    #[error("missing authorization header")]
    MissingAuthorization,

    /// The bearer token was rejected.
    #[error("invalid token")]
    InvalidToken(#[source] TokenError),
}

impl AuthError {
    /// HTTP status for the refusal.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingMetadata | Self::MissingAuthorization | Self::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
        }
    }
}
