//! Hierarchical rendering: one page through its ancestor chain, and batches.

use super::{EngineImports, Statil};
use crate::compiler::value::to_display;
use crate::constants::locals::{CONTENT, META, NAME, PATH, TITLE};
use crate::error::{Error, Result};
use crate::locals::Locals;
use crate::meta::resolve_echo;
use crate::paths;
use indexmap::IndexMap;
use log::{debug, info, trace};
use serde_json::Value;

impl Statil {
    /// Renders the template at `path` into one or more output files.
    ///
    /// The base locals are cloned and overlaid with the file's legend. A
    /// legend with an `echo` fans out into one render per echoed legend.
    /// Each render gets `$path = dirname(path)/name`, goes through the
    /// ancestor chain, then through the rename hook and the post-processors.
    pub fn render(&self, path: &str, base: &Locals) -> Result<IndexMap<String, String>> {
        let path = self.template_key(path);
        let legend = self.legend_for(&path);

        let mut data = base.clone();
        if let Some(legend) = legend {
            data.assign(legend.fields());
        }
        data.insert(NAME, paths::basename(&path));

        let branches = match legend {
            Some(legend) if legend.has_echo() => resolve_echo(self.meta_for(&path), legend)?
                .into_iter()
                .map(|echoed| {
                    let mut branch = data.clone();
                    branch.assign(echoed.fields());
                    branch
                })
                .collect(),
            _ => vec![data],
        };

        let mut output = IndexMap::with_capacity(branches.len());
        for mut locals in branches {
            let name = locals.get(NAME).map(to_display).unwrap_or_default();
            let virtual_path = paths::join(paths::dirname(&path), &name);
            locals.insert(PATH, virtual_path.as_str());

            let content = self.render_through(&path, &mut locals)?;
            let output_path = self.config().rename(virtual_path);
            let content = self.config().post_process(content, &output_path);
            trace!("Rendered '{path}' to '{output_path}'");
            output.insert(output_path, content);
        }
        Ok(output)
    }

    /// Renders `path` and then every ancestor `index` up to the root, each
    /// step seeing the previous output as `$content`. Returns the last
    /// output.
    pub fn render_through(&self, path: &str, locals: &mut Locals) -> Result<String> {
        let chain = self.resolver().split(path)?;
        debug!("Rendering '{path}' through {}", chain.join(" -> "));
        for step in &chain {
            let content = self.render_one(step, locals)?;
            locals.insert(CONTENT, content);
        }
        Ok(locals.content().to_string())
    }

    /// Renders the single template at `path` against `locals`.
    ///
    /// `$content` and `$title` default to `""`, `$meta` is set to the
    /// directory's meta when there is one, and the file's legend fills in
    /// any keys not yet present. Failures are reported with the path.
    pub fn render_one(&self, path: &str, locals: &mut Locals) -> Result<String> {
        if path.is_empty() {
            return Err(Error::InputValidation("path must not be empty".to_string()));
        }
        let template = self.resolver().resolve(path, self.templates())?;

        for key in [CONTENT, TITLE] {
            if !matches!(locals.get(key), Some(Value::String(_))) {
                locals.insert(key, "");
            }
        }
        if let Some(meta) = self.meta_for(path) {
            locals.insert(META, meta.to_value()?);
        }
        if let Some(legend) = self.legend_for(path) {
            locals.defaults(legend.fields());
        }

        trace!("Rendering step '{path}'");
        template
            .render(locals, &EngineImports::new(self))
            .map_err(|err| Error::TemplateExecution {
                path: path.to_string(),
                source: Box::new(err),
            })
    }

    /// Renders every registered template, skipping ignored ones, and merges
    /// the results. A later output under the same path replaces an earlier
    /// one. Any failure aborts the whole batch.
    pub fn render_all(&self, base: &Locals) -> Result<IndexMap<String, String>> {
        let mut output = IndexMap::new();
        for path in self.template_paths() {
            if self.is_ignored(path)? {
                debug!("Skipping '{path}': matched its directory's ignore pattern");
                continue;
            }
            if self.config().is_path_ignored(path) {
                debug!("Skipping '{path}': matched an ignored path glob");
                continue;
            }
            output.extend(self.render(path, base)?);
        }
        info!("Rendered {} file(s)", output.len());
        Ok(output)
    }
}
