//! Caller identity shared across Foodgram services.
//!
//! Tokens are verified upstream; services only read the identity headers the gateway injects.

pub mod identity;
