//! Domain types, constants, and validation for the fundmate backend.
//!
//! This crate is pure logic with zero I/O so it can be used by the DB,
//! ingest, API, and worker layers alike.

pub mod category;
pub mod error;
pub mod fund;
pub mod join_request;
pub mod message;
pub mod pagination;
pub mod roles;
pub mod statistics;
pub mod types;
