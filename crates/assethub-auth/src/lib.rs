//! # assethub-auth
//!
//! Identity at the HTTP boundary and project access checks.
//!
//! - `jwt`: HS256 access tokens carrying the caller id and principal kind
//! - `principal`: the resolved caller identity threaded into every operation
//! - `access`: membership and role-tier checks backed by a `MembershipOracle`

pub mod access;
pub mod jwt;
pub mod principal;

pub use access::AccessGuard;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use principal::{Principal, PrincipalKind};
