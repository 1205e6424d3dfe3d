//! Data models for Shelfdesk

pub mod book;
pub mod enums;
pub mod issue;
pub mod library;
pub mod request;
pub mod user;

pub use enums::Role;
pub use user::UserClaims;
