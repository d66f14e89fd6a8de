//! Hierarchical static-site template compiler.
//!
//! Templates are registered by relative path, metadata files configure the
//! templates of their directory, and every page is rendered through the
//! `index` templates of its ancestor directories.

/// Handles argument parsing and the render workflow of the binary.
pub mod cli;

/// Defines custom error types.
pub mod error;

/// Constants shared across modules.
pub mod constants;

/// Delimiter scanning, expression parsing and template interpretation.
pub mod compiler;

/// Options files and rename patterns.
pub mod config;

/// The template registry and hierarchical rendering.
pub mod engine;

/// Extension traits for standard library types.
pub mod ext;

/// Default helpers callable from templates.
pub mod helpers;

/// A set of helpers for working with the file system.
pub mod ioutils;

/// An abstraction that allows implementing a source for site files.
pub mod loader;

/// The render context.
pub mod locals;

/// Directory metadata, legends and echo expansion.
pub mod meta;

/// Helpers for logical `/`-separated paths.
pub mod paths;

/// Ancestor chains and template lookup.
pub mod resolver;

pub use compiler::{Compiler, CompilerSettings, Imports, Template, TemplateCompiler};
pub use engine::{EngineConfig, Statil, StatilBuilder};
pub use error::{Error, Result};
pub use locals::Locals;
pub use meta::{Legend, Meta, MetadataStore};
pub use resolver::{HierarchicalResolver, PathResolver};
