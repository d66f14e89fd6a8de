//! Rename hooks built from MiniJinja patterns.

use crate::constants::INDEX;
use crate::engine::RenameFn;
use crate::error::Result;
use crate::helpers::regex_filter;
use crate::paths;
use cruet::case::{
    camel::to_camel_case, kebab::to_kebab_case, pascal::to_pascal_case, snake::to_snake_case,
};
use log::warn;
use minijinja::{context, Environment};

const RENAME_TEMPLATE: &str = "rename";

/// Builds a rename hook from a MiniJinja pattern.
///
/// The pattern sees `path` (the virtual output path), `dir` and `name`, and
/// the case filters. An empty result keeps the original path.
///
/// The pattern is rendered once against the root `index` while building the
/// hook, so syntax errors and runtime errors such as unknown filters fail
/// here. A hook can only keep or replace a path, so an error that still
/// shows up for a particular path later is logged and that path is kept.
///
/// ```
/// let rename = statil::config::rename_pattern("{{ path }}.html").unwrap();
/// assert_eq!(rename("docs/intro"), Some("docs/intro.html".to_string()));
/// ```
pub fn rename_pattern(pattern: &str) -> Result<RenameFn> {
    let mut env = Environment::new();
    env.add_filter("camel_case", to_camel_case);
    env.add_filter("kebab_case", to_kebab_case);
    env.add_filter("pascal_case", to_pascal_case);
    env.add_filter("snake_case", to_snake_case);
    env.add_filter("regex", regex_filter);
    env.add_template_owned(RENAME_TEMPLATE, pattern.to_string())?;
    env.get_template(RENAME_TEMPLATE)?.render(path_context(INDEX))?;

    Ok(Box::new(move |path: &str| {
        let template = env.get_template(RENAME_TEMPLATE).ok()?;
        match template.render(path_context(path)) {
            Ok(rendered) => {
                let rendered = paths::normalize(rendered.trim());
                (!rendered.is_empty()).then_some(rendered)
            }
            Err(err) => {
                warn!("Failed to rename '{path}': {err}");
                None
            }
        }
    }))
}

fn path_context(path: &str) -> minijinja::Value {
    context! {
        path => path,
        dir => paths::dirname(path),
        name => paths::basename(path),
    }
}
