//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod category_repo;
pub mod classifier_log_repo;
pub mod fund_category_repo;
pub mod fund_member_repo;
pub mod fund_repo;
pub mod join_request_repo;
pub mod message_repo;
pub mod parse_job_repo;
pub mod session_repo;
pub mod transaction_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use classifier_log_repo::ClassifierLogRepo;
pub use fund_category_repo::FundCategoryRepo;
pub use fund_member_repo::FundMemberRepo;
pub use fund_repo::FundRepo;
pub use join_request_repo::JoinRequestRepo;
pub use message_repo::MessageRepo;
pub use parse_job_repo::ParseJobRepo;
pub use session_repo::SessionRepo;
pub use transaction_repo::TransactionRepo;
pub use user_repo::UserRepo;
