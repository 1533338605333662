//! Caller authentication.
//!
//! - `verifier`: the identity provider boundary (`IdentityVerifier`)
//! - `jwt`: local verification of identity provider access tokens
//! - `guard`: turns a bearer token into a `CallerIdentity` or `Forbidden`

mod claims;
mod guard;
mod jwt;
mod verifier;

pub use claims::Claims;
pub use guard::{AuthorizationGuard, CallerIdentity};
pub use jwt::JwtIdentityVerifier;
pub use verifier::{AuthError, IdentityVerifier, VerifiedIdentity};
