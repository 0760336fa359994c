//! Application services layer.

pub mod articles;
pub mod auth;
pub mod error;
pub mod repos;
