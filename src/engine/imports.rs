use super::Statil;
use crate::compiler::value::to_display;
use crate::compiler::Imports;
use crate::constants::locals::{PATH, TITLE};
use crate::constants::TITLE_SEPARATOR;
use crate::error::{Error, Result};
use crate::locals::Locals;
use crate::paths;
use serde_json::Value;

const ACTIVE: &str = "active";
const ACTIVE_ATTRIBUTE: &str = r#"class="active""#;

/// Built-in functions bound to one engine, followed by the configured helpers.
pub struct EngineImports<'a> {
    engine: &'a Statil,
}

impl<'a> EngineImports<'a> {
    pub fn new(engine: &'a Statil) -> Self {
        Self { engine }
    }
}

impl Imports for EngineImports<'_> {
    fn call(&self, name: &str, args: &[Value], locals: &mut Locals) -> Result<Value> {
        match name {
            "include" => include(self.engine, args, locals),
            "entitle" => {
                entitle(args.first(), locals);
                Ok(Value::Null)
            }
            "active" => Ok(Value::from(active(args.first(), locals))),
            "act" => {
                let matched = !active(args.first(), locals).is_empty();
                Ok(Value::from(if matched { ACTIVE_ATTRIBUTE } else { "" }))
            }
            _ => match self.engine.config().helpers.get(name) {
                Some(helper) => helper(args),
                None => Err(Error::Evaluation(format!("'{name}' is not a function"))),
            },
        }
    }
}

/// Renders a single template (no ancestor chain) against a clone of `data`,
/// or of the current locals when `data` is omitted.
fn include(engine: &Statil, args: &[Value], locals: &Locals) -> Result<Value> {
    let path = match args.first() {
        Some(Value::String(path)) if !path.is_empty() => path,
        other => {
            return Err(Error::Evaluation(format!(
                "include expects a template path, got: {}",
                other.map(to_display).unwrap_or_default()
            )))
        }
    };
    let mut data = match args.get(1) {
        Some(Value::Null) | None => locals.clone(),
        Some(data) => Locals::from_value(data.clone())?,
    };
    let path = engine.template_key(path);
    engine.render_one(&path, &mut data).map(Value::String)
}

/// Prepends a non-empty string title to `$title`; anything else is ignored.
fn entitle(title: Option<&Value>, locals: &mut Locals) {
    let Some(Value::String(title)) = title else { return };
    if title.is_empty() {
        return;
    }
    let current = locals.title();
    let next = if current.is_empty() {
        title.clone()
    } else {
        format!("{title}{TITLE_SEPARATOR}{current}")
    };
    locals.insert(TITLE, next);
}

/// `"active"` when `path` is `$path` or one of its ancestors, segment-wise.
fn active(path: Option<&Value>, locals: &Locals) -> &'static str {
    let (Some(Value::String(path)), Some(current)) = (path, locals.get_str(PATH)) else {
        return "";
    };
    if paths::is_within(&paths::strip_extension(path), &paths::strip_extension(current)) {
        ACTIVE
    } else {
        ""
    }
}
