//! Configuration management for statil sites
//!
//! This module contains the configuration system components:
//! - `types`: Named post-processors
//! - `loader`: Options file loading and parsing
//! - `rename`: Rename hooks built from patterns

pub mod loader;
pub mod rename;
pub mod types;

// Re-export commonly used types for convenience
pub use loader::SiteOptions;
pub use rename::rename_pattern;
pub use types::PostProcess;
