//! Bearer token issuing and request authorization.
//!
//! [`JwtProvider`] issues and verifies HS256-signed tokens carrying a user id and role.
//! [`AuthInterceptor`] guards request handlers: methods on its allow-list pass through,
//! everything else must carry `authorization: Bearer <token>` accepted by a
//! [`ClaimsVerifier`].
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod interceptor;
mod jwt;

pub use error::{AuthError, TokenError};
pub use interceptor::{AuthInterceptor, token_from_headers};
pub use jwt::{Claims, ClaimsVerifier, JwtProvider};
