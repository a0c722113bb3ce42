pub mod difficulty;
pub mod query;
pub mod question;
pub mod tag;
