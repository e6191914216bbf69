use crate::error::TokenError;

use std::fmt;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

/// Identity carried by a verified token. Absent or non-string claims are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The `user_id` claim.
    pub user_id: Option<String>,

    /// The `role` claim. Refresh tokens carry none.
    pub role: Option<String>,
}

/// Verifies a bearer token and extracts its claims.
pub trait ClaimsVerifier
where
    Self: Send + Sync + 'static,
{
    /// Checks `token` and returns the claims it carries.
    ///
    /// # Errors
    /// Returns an error if the token is malformed, forged or expired.
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: Option<String>,
}

#[derive(Serialize)]
struct Payload<'a> {
    user_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    exp: i64,
}

/// Issues and verifies HS256 JSON web tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtProvider {
    secret: Vec<u8>,

    /// Lifetime of tokens from [`generate_access_token`](Self::generate_access_token).
    pub access_token_ttl: Duration,

    /// Lifetime of tokens from [`generate_refresh_token`](Self::generate_refresh_token).
    pub refresh_token_ttl: Duration,
}

impl fmt::Debug for JwtProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtProvider")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtProvider {
    /// Creates a provider signing with `secret`.
    pub fn new(
        secret: impl Into<Vec<u8>>,
        access_token_ttl: Duration,
        refresh_token_ttl: Duration,
    ) -> Self {
        Self {
            secret: secret.into(),
            access_token_ttl,
            refresh_token_ttl,
        }
    }

    /// Issues a token carrying `user_id` and `role`.
    ///
    /// # Errors
    /// Returns an error if the lifetime overflows or signing fails.
    pub fn generate_access_token(&self, user_id: &str, role: &str) -> Result<String, TokenError> {
        self.sign(&Payload {
            user_id,
            role: Some(role),
            exp: expires_at(self.access_token_ttl)?,
        })
    }

    /// Issues a longer lived token carrying only `user_id`.
    ///
    /// # Errors
    /// Returns an error if the lifetime overflows or signing fails.
    pub fn generate_refresh_token(&self, user_id: &str) -> Result<String, TokenError> {
        self.sign(&Payload {
            user_id,
            role: None,
            exp: expires_at(self.refresh_token_ttl)?,
        })
    }

    /// Checks the signature, `exp` and `nbf` of `token`, then extracts its claims.
    ///
    /// # Errors
    /// Returns an error if the token is malformed, signed with another algorithm or key,
    /// expired, or not valid yet.
    pub fn verify_and_parse_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::Malformed("expected three segments"));
        };

        let header: Header = serde_json::from_slice(&decode(header)?)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        let signing_input = &token[..token.len() - signature.len() - 1];
        self.mac(signing_input)?
            .verify_slice(&decode(signature)?)
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: Map<String, Value> = serde_json::from_slice(&decode(payload)?)?;
        let now = Utc::now().timestamp();

        if let Some(exp) = numeric_claim(&claims, "exp")? {
            if now >= exp {
                return Err(TokenError::Expired);
            }
        }

        if let Some(nbf) = numeric_claim(&claims, "nbf")? {
            if now < nbf {
                return Err(TokenError::NotYetValid);
            }
        }

        Ok(Claims {
            user_id: string_claim(&claims, "user_id"),
            role: string_claim(&claims, "role"),
        })
    }

    fn sign<T>(&self, payload: &T) -> Result<String, TokenError>
    where
        T: Serialize,
    {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload)?)
        );

        let signature = self.mac(&signing_input)?.finalize().into_bytes();

        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn mac(&self, signing_input: &str) -> Result<HmacSha256, TokenError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::InvalidKey)?;
        mac.update(signing_input.as_bytes());
        Ok(mac)
    }
}

impl ClaimsVerifier for JwtProvider {
    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_and_parse_claims(token)
    }
}

fn expires_at(ttl: Duration) -> Result<i64, TokenError> {
    let ttl = chrono::Duration::from_std(ttl).map_err(|_| TokenError::TtlOutOfRange)?;

    Utc::now()
        .checked_add_signed(ttl)
        .map(|expiry| expiry.timestamp())
        .ok_or(TokenError::TtlOutOfRange)
}

fn decode(segment: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed("segment is not base64url"))
}

fn string_claim(claims: &Map<String, Value>, name: &str) -> Option<String> {
    claims.get(name).and_then(Value::as_str).map(str::to_string)
}

#[allow(clippy::cast_possible_truncation)]
fn numeric_claim(claims: &Map<String, Value>, name: &'static str) -> Result<Option<i64>, TokenError> {
    match claims.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|value| value as i64))
            .map(Some)
            .ok_or(TokenError::InvalidClaim(name)),
        Some(_) => Err(TokenError::InvalidClaim(name)),
    }
}
