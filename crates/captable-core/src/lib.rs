//! # captable-core
//!
//! Core crate for captable. Contains configuration schemas and the
//! unified error system shared by the host and the CLI.
//!
//! This crate has **no** internal dependencies on other captable crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
