//! HTTP route handlers

pub mod auth;
pub mod error;
pub mod proxy;
