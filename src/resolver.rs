//! Ancestor chains and template lookup.

use crate::compiler::{Template, Transclude};
use crate::constants::INDEX;
use crate::error::{Error, Result};
use crate::paths;
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

/// Maps logical paths to the templates that render them.
pub trait PathResolver {
    /// Removes the file extension, keeping directory and base name.
    fn strip_extension(&self, path: &str) -> String {
        paths::strip_extension(path)
    }

    /// Returns the chain of template paths for `path`, deepest first:
    /// the path itself, then every ancestor directory's `index`, then the
    /// root `index`.
    fn split(&self, path: &str) -> Result<Vec<String>>;

    /// Looks up the template for one chain step.
    fn resolve(
        &self,
        path: &str,
        templates: &IndexMap<String, Arc<dyn Template>>,
    ) -> Result<Arc<dyn Template>>;
}

/// Resolves chains through every enclosing directory's `index` template.
#[derive(Debug, Default, Clone, Copy)]
pub struct HierarchicalResolver;

impl PathResolver for HierarchicalResolver {
    fn split(&self, path: &str) -> Result<Vec<String>> {
        let path = paths::normalize(path);
        if path.is_empty() {
            return Err(Error::InvalidPath { path });
        }

        let segments: Vec<&str> = path.split('/').collect();
        let (_, ancestors) = segments.split_last().ok_or_else(|| Error::InvalidPath {
            path: path.clone(),
        })?;
        if ancestors.contains(&INDEX) {
            return Err(Error::ReservedName { path });
        }

        let mut chain = IndexSet::with_capacity(segments.len() + 1);
        chain.insert(path.clone());
        for depth in (1..=ancestors.len()).rev() {
            chain.insert(format!("{}/{INDEX}", ancestors[..depth].join("/")));
        }
        chain.insert(INDEX.to_string());

        Ok(chain.into_iter().collect())
    }

    fn resolve(
        &self,
        path: &str,
        templates: &IndexMap<String, Arc<dyn Template>>,
    ) -> Result<Arc<dyn Template>> {
        if let Some(template) = templates.get(path) {
            return Ok(Arc::clone(template));
        }
        if paths::basename(path) == INDEX {
            return Ok(Arc::new(Transclude));
        }
        Err(Error::TemplateNotFound { path: path.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, NoImports, TemplateCompiler};
    use crate::locals::Locals;

    #[test]
    fn splits_deepest_first() {
        let chain = HierarchicalResolver.split("a/b/c").unwrap();
        assert_eq!(chain, vec!["a/b/c", "a/b/index", "a/index", "index"]);
    }

    #[test]
    fn deduplicates_index_paths() {
        assert_eq!(HierarchicalResolver.split("index").unwrap(), vec!["index"]);
        assert_eq!(HierarchicalResolver.split("a/index").unwrap(), vec!["a/index", "index"]);
        assert_eq!(HierarchicalResolver.split("page").unwrap(), vec!["page", "index"]);
    }

    #[test]
    fn chain_shape_holds_for_many_paths() {
        for path in ["x", "x/y", "x/y/z", "x/index", "deep/er/still/page"] {
            let chain = HierarchicalResolver.split(path).unwrap();
            assert_eq!(chain.first().map(String::as_str), Some(path));
            assert_eq!(chain.last().map(String::as_str), Some("index"));
            let unique: IndexSet<&String> = chain.iter().collect();
            assert_eq!(unique.len(), chain.len());
            for step in &chain[1..] {
                assert!(step == "index" || step.ends_with("/index"), "{step}");
            }
        }
    }

    #[test]
    fn rejects_empty_and_reserved_paths() {
        assert!(matches!(HierarchicalResolver.split(""), Err(Error::InvalidPath { .. })));
        assert!(matches!(
            HierarchicalResolver.split("index/page"),
            Err(Error::ReservedName { .. })
        ));
        assert!(matches!(
            HierarchicalResolver.split("a/index/b"),
            Err(Error::ReservedName { .. })
        ));
    }

    #[test]
    fn missing_index_falls_back_to_transclude() {
        let templates = IndexMap::new();
        let template = HierarchicalResolver.resolve("a/index", &templates).unwrap();
        let mut locals = Locals::new();
        locals.insert("$content", "inner");
        assert_eq!(template.render(&mut locals, &NoImports).unwrap(), "inner");

        assert!(matches!(
            HierarchicalResolver.resolve("a/page", &templates),
            Err(Error::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn registered_templates_win() {
        let mut templates: IndexMap<String, Arc<dyn Template>> = IndexMap::new();
        templates.insert("index".into(), Compiler::default().compile("root").unwrap());
        let template = HierarchicalResolver.resolve("index", &templates).unwrap();
        assert_eq!(template.render(&mut Locals::new(), &NoImports).unwrap(), "root");
    }
}
