//! Terminal output for the nutritrack command line
//!
//! - Status messages
//! - Result tables for ranked and looked-up food records
//! - Spinners while waiting on the network

#![warn(missing_docs)]

pub mod output;
pub mod progress;
