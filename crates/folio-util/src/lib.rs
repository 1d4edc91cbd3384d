//! Shared utilities for folio.
//!
//! This crate provides common utilities used across the folio workspace:
//! - ULID-based identifier generation
//! - Logging setup with tracing

pub mod id;
pub mod log;

pub use id::{IdPrefix, Identifier};
