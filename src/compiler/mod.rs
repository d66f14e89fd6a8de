//! Delimiter-based template compiler.
//!
//! Sources are scanned once into instructions, parsed into a node tree and
//! interpreted at render time against a [`Locals`] context.

use crate::error::{Error, Result};
use crate::locals::Locals;
use log::trace;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

pub mod expr;
pub mod program;
pub mod scanner;
pub mod settings;
pub mod value;

pub use program::Program;
pub use settings::CompilerSettings;

/// A compiled template.
pub trait Template: Debug {
    /// Renders against `locals`, which the template may read and mutate.
    /// Calls inside the template are dispatched to `imports`.
    fn render(&self, locals: &mut Locals, imports: &dyn Imports) -> Result<String>;
}

/// Functions reachable from inside templates.
pub trait Imports {
    /// Calls the import `name` with evaluated `args`.
    ///
    /// Unknown names must fail with [`Error::Evaluation`].
    fn call(&self, name: &str, args: &[Value], locals: &mut Locals) -> Result<Value>;
}

/// Imports with nothing in them; every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImports;

impl Imports for NoImports {
    fn call(&self, name: &str, _args: &[Value], _locals: &mut Locals) -> Result<Value> {
        Err(Error::Evaluation(format!("'{name}' is not a function")))
    }
}

/// Turns template sources into renderable templates.
pub trait TemplateCompiler {
    fn compile(&self, source: &str) -> Result<Arc<dyn Template>>;
}

/// The default compiler: scan, parse, interpret.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    settings: CompilerSettings,
}

impl Compiler {
    pub fn new(settings: CompilerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }
}

impl TemplateCompiler for Compiler {
    fn compile(&self, source: &str) -> Result<Arc<dyn Template>> {
        let instructions = scanner::scan(source, &self.settings);
        trace!("Scanned {} instruction(s)", instructions.len());
        let program = Program::build(instructions, self.settings.context_name())?;
        Ok(Arc::new(program))
    }
}

/// Built-in template that outputs `$content` unchanged. Stands in for
/// ancestor `index` templates that were never registered.
#[derive(Debug, Default, Clone, Copy)]
pub struct Transclude;

impl Template for Transclude {
    fn render(&self, locals: &mut Locals, _imports: &dyn Imports) -> Result<String> {
        Ok(locals.content().to_string())
    }
}
