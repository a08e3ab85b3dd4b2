//! Configuration module for webget
//!
//! Configuration is immutable for the lifetime of a run. It can be built
//! from command-line flags or loaded from a TOML file; both paths go
//! through the same validation.

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, ProxyConfig};
pub use validation::validate;
