//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Create/update DTOs where the table has a direct write path

pub mod category;
pub mod classifier_log;
pub mod fund;
pub mod fund_category;
pub mod fund_member;
pub mod join_request;
pub mod message;
pub mod parse_job;
pub mod session;
pub mod transaction;
pub mod user;
