//! Command handlers for the folio CLI.

pub mod document;
pub mod version;

pub use document::*;
pub use version::*;
