//! Subcommand implementations

pub mod barcode;
pub mod config;
pub mod search;

/// A barcode lookup found nothing
#[derive(Debug, thiserror::Error)]
#[error("No product found for barcode {0}")]
pub struct ProductNotFound(pub String);
