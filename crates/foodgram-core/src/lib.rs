//! Service plumbing shared by Foodgram binaries.

pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
