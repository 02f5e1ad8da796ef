//! Test utilities for Foodgram services.
//!
//! Import from `[dev-dependencies]` only; never in production code.

pub mod auth;
pub mod request;
