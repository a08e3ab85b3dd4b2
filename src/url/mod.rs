//! URL handling module for webget
//!
//! This module provides the small pure helpers the crawler is built on:
//! extension matching, relative-to-absolute resolution, and link label
//! normalization.

mod extension;
mod label;
mod resolve;

// Re-export main functions
pub use extension::{ends_with_any, extension_of, file_name_of, has_no_extension};
pub use label::normalize_label;
pub use resolve::to_absolute;
