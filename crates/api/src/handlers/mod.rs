//! HTTP handlers, one module per resource.

pub mod auth;
pub mod categories;
pub mod funds;
pub mod join_requests;
pub mod members;
pub mod messages;
pub mod statistics;
pub mod transactions;
