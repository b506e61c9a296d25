//! Shared types, errors, and configuration for Keel.
//!
//! This crate provides common types used across all other crates:
//! - Monetary amounts with decimal precision and named rounding presets
//! - Currency codes and locale-aware display formatting
//! - Typed string IDs for source records
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, LoggingConfig, ReconciliationSettings};
pub use error::{AppError, AppResult};
