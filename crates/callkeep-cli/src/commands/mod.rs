pub mod config;
pub mod delete;
pub mod list;
pub mod login;
pub mod save;
pub mod upload;
