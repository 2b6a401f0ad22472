//! Shared types and error taxonomy for PawMe Connect

pub mod errors;

pub use errors::{AppError, AppResult};
