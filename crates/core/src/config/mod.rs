//! Configuration loading and schema definitions
//!
//! Shared configuration types used by the client, ranker and binaries.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
