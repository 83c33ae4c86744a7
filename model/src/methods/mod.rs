pub mod list;
pub mod user;
