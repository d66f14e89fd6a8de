//! The registry that owns compiled templates and directory metadata.

use crate::compiler::{Compiler, CompilerSettings, Template, TemplateCompiler};
use crate::constants::META_EXTENSIONS;
use crate::error::{Error, Result};
use crate::meta::{DirectoryMetaStore, Legend, Meta, MetadataStore};
use crate::paths;
use crate::resolver::{HierarchicalResolver, PathResolver};
use globset::GlobSet;
use indexmap::IndexMap;
use log::debug;
use serde_json::Value;
use std::sync::Arc;

pub mod config;
pub mod imports;
pub mod render;

pub use config::{EngineConfig, Helper, PostProcessor, RenameFn};
pub use imports::EngineImports;

/// Registry of templates and metas, and the entry point for rendering.
///
/// Register every file first, then render; legend lookups assume all metas
/// are already in place.
pub struct Statil {
    config: EngineConfig,
    compiler: Box<dyn TemplateCompiler>,
    resolver: Box<dyn PathResolver>,
    metas: Box<dyn MetadataStore>,
    templates: IndexMap<String, Arc<dyn Template>>,
}

impl Statil {
    /// An engine with default delimiters, helpers and collaborators.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> StatilBuilder {
        StatilBuilder::default()
    }

    /// Registers one file under its relative path.
    ///
    /// `.yaml` and `.json` files are parsed as the meta of their directory;
    /// anything else is compiled as a template keyed by its path without
    /// the extension. Registering a template path again replaces it.
    pub fn register(&mut self, source: &str, path: &str) -> Result<()> {
        let path = paths::normalize(path);
        if path.is_empty() {
            return Err(Error::InputValidation("path must not be empty".to_string()));
        }

        if paths::extension(&path).is_some_and(|ext| META_EXTENSIONS.contains(&ext)) {
            let meta = Meta::parse(source, &path)?;
            return self.metas.register(meta, paths::dirname(&path));
        }

        let key = self.resolver.strip_extension(&path);
        let template = self.compiler.compile(source).map_err(|err| Error::TemplateCompile {
            path: key.clone(),
            source: Box::new(err),
        })?;
        debug!("Registered template '{key}'");
        self.templates.insert(key, template);
        Ok(())
    }

    /// Registers a file whose `path` includes the source directory `src_dir`,
    /// which is stripped first.
    pub fn register_relative(&mut self, source: &str, path: &str, src_dir: &str) -> Result<()> {
        let relative = paths::relative(src_dir, path);
        if relative.split('/').next() == Some("..") {
            return Err(Error::InputValidation(format!(
                "'{path}' is outside of the source directory '{src_dir}'"
            )));
        }
        self.register(source, &relative)
    }

    /// Registers every `(path, source)` pair in order.
    pub fn register_all(&mut self, files: &IndexMap<String, String>) -> Result<()> {
        for (path, source) in files {
            self.register(source, path)?;
        }
        Ok(())
    }

    /// The key `path` is registered under: `path` itself when a template
    /// exists there, otherwise `path` without its extension.
    ///
    /// Keys are stored without extensions, so a key such as
    /// `assets/jquery.min` is found as is and never stripped twice.
    pub fn template_key(&self, path: &str) -> String {
        let path = paths::normalize(path);
        if self.templates.contains_key(&path) {
            path
        } else {
            self.resolver.strip_extension(&path)
        }
    }

    pub fn template(&self, path: &str) -> Option<&Arc<dyn Template>> {
        self.templates.get(path)
    }

    /// Logical paths of every registered template, in registration order.
    pub fn template_paths(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn meta_for(&self, path: &str) -> Option<&Meta> {
        self.metas.meta_for(path)
    }

    /// The live meta entry for `path`'s directory. Changes made here are
    /// visible to every render that follows.
    pub fn meta_for_mut(&mut self, path: &str) -> Option<&mut Meta> {
        self.metas.meta_for_mut(path)
    }

    pub fn legend_for(&self, path: &str) -> Option<&Legend> {
        self.metas.legend_for(path)
    }

    pub fn is_ignored(&self, path: &str) -> Result<bool> {
        self.metas.is_ignored(path)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn resolver(&self) -> &dyn PathResolver {
        self.resolver.as_ref()
    }

    pub(crate) fn templates(&self) -> &IndexMap<String, Arc<dyn Template>> {
        &self.templates
    }
}

impl Default for Statil {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembles a [`Statil`] with its configuration and collaborators.
#[derive(Default)]
pub struct StatilBuilder {
    config: EngineConfig,
    compiler: Option<Box<dyn TemplateCompiler>>,
    resolver: Option<Box<dyn PathResolver>>,
    meta_store: Option<Box<dyn MetadataStore>>,
}

impl StatilBuilder {
    /// Delimiters and context name used by the default compiler.
    pub fn settings(mut self, settings: CompilerSettings) -> Self {
        self.config.settings = settings;
        self
    }

    /// Adds or replaces a helper callable from templates.
    pub fn helper<F>(mut self, name: impl Into<String>, helper: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.config.helpers.insert(name.into(), Box::new(helper));
        self
    }

    pub fn rename<F>(mut self, rename: F) -> Self
    where
        F: Fn(&str) -> Option<String> + 'static,
    {
        self.config.rename = Some(Box::new(rename));
        self
    }

    pub fn rename_except<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.rename_except.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Appends a post-processor; processors run in the order they were added.
    pub fn post_process<F>(mut self, processor: F) -> Self
    where
        F: Fn(&str, &str) -> Option<String> + 'static,
    {
        self.config.post_process.push(Box::new(processor));
        self
    }

    pub fn ignore_paths(mut self, ignore_paths: GlobSet) -> Self {
        self.config.ignore_paths = ignore_paths;
        self
    }

    pub fn compiler(mut self, compiler: impl TemplateCompiler + 'static) -> Self {
        self.compiler = Some(Box::new(compiler));
        self
    }

    pub fn resolver(mut self, resolver: impl PathResolver + 'static) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    pub fn meta_store(mut self, meta_store: impl MetadataStore + 'static) -> Self {
        self.meta_store = Some(Box::new(meta_store));
        self
    }

    pub fn build(self) -> Statil {
        let compiler = self
            .compiler
            .unwrap_or_else(|| Box::new(Compiler::new(self.config.settings.clone())));
        Statil {
            compiler,
            resolver: self.resolver.unwrap_or_else(|| Box::new(HierarchicalResolver)),
            metas: self.meta_store.unwrap_or_else(|| Box::new(DirectoryMetaStore::new())),
            templates: IndexMap::new(),
            config: self.config,
        }
    }
}
