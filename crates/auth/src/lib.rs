//! `shopfront-auth` — bearer-token authentication and resource access rules.
//!
//! This crate is decoupled from HTTP and storage: callers hand in tokens,
//! resource names and records, and get decisions back.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod rules;

pub use authorize::{Authorization, AuthzError, authorize, owner_field};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::{AccessDecision, AccessMode, Grant, Operation};
pub use principal::PrincipalId;
pub use roles::Audience;
pub use rules::{AccessRuleError, AccessRules};
