//! Authentication middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//!
//! Fund-level authorization (member / admin / owner) is resolved per fund
//! via the [`crate::membership`] registry, not here: there are no global
//! roles in this system.

pub mod auth;
