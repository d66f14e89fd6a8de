//! Default helpers available to every template.

use crate::compiler::value::to_display;
use crate::engine::config::Helper;
use crate::error::{Error, Result};
use cruet::{
    case::{
        camel::to_camel_case, kebab::to_kebab_case, pascal::to_pascal_case,
        screaming_snake::to_screaming_snake_case, snake::to_snake_case, title::to_title_case,
    },
    string::{pluralize::to_plural, singularize::to_singular},
};
use indexmap::IndexMap;
use log::warn;
use regex::Regex;
use serde_json::Value;

/// Tests if a string matches a given regular expression pattern.
///
/// An invalid pattern is logged and treated as a non-match.
pub fn regex_filter(val: &str, re: &str) -> bool {
    match Regex::new(re) {
        Ok(re) => re.is_match(val),
        Err(err) => {
            warn!("Invalid regex '{re}': {err}");
            false
        }
    }
}

fn first_arg<'a>(name: &str, args: &'a [Value]) -> Result<&'a Value> {
    args.first()
        .ok_or_else(|| Error::Evaluation(format!("'{name}' expects at least one argument")))
}

fn string_helper(name: &'static str, convert: fn(&str) -> String) -> Helper {
    Box::new(move |args| Ok(Value::String(convert(&to_display(first_arg(name, args)?)))))
}

/// Case conversion, `matches(value, pattern)` and `json(value)`.
pub fn default_helpers() -> IndexMap<String, Helper> {
    let mut helpers: IndexMap<String, Helper> = IndexMap::new();

    let conversions: [(&'static str, fn(&str) -> String); 8] = [
        ("camel_case", to_camel_case),
        ("kebab_case", to_kebab_case),
        ("snake_case", to_snake_case),
        ("pascal_case", to_pascal_case),
        ("title_case", to_title_case),
        ("screaming_snake_case", to_screaming_snake_case),
        ("plural", to_plural),
        ("singular", to_singular),
    ];
    for (name, convert) in conversions {
        helpers.insert(name.to_string(), string_helper(name, convert));
    }

    helpers.insert(
        "matches".to_string(),
        Box::new(|args| {
            let value = to_display(first_arg("matches", args)?);
            let pattern = args.get(1).map(to_display).unwrap_or_default();
            Ok(Value::Bool(regex_filter(&value, &pattern)))
        }),
    );
    helpers.insert(
        "json".to_string(),
        Box::new(|args| Ok(Value::String(serde_json::to_string(first_arg("json", args)?)?))),
    );

    helpers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, args: &[Value]) -> Result<Value> {
        let helpers = default_helpers();
        helpers[name](args)
    }

    #[test]
    fn test_regex_filter_matches() {
        assert!(regex_filter("hello123", r"hello\d+"));
    }

    #[test]
    fn test_regex_filter_no_match() {
        assert!(!regex_filter("hello", r"\d+"));
    }

    #[test]
    fn test_regex_filter_invalid_regex() {
        assert!(!regex_filter("anything", r"([unclosed"));
    }

    #[test]
    fn converts_case() {
        assert_eq!(call("kebab_case", &[json!("Solar System")]).unwrap(), json!("solar-system"));
        assert_eq!(call("snake_case", &[json!("SolarSystem")]).unwrap(), json!("solar_system"));
        assert_eq!(call("pascal_case", &[json!("solar system")]).unwrap(), json!("SolarSystem"));
        assert_eq!(call("camel_case", &[json!("solar system")]).unwrap(), json!("solarSystem"));
    }

    #[test]
    fn serializes_json() {
        assert_eq!(call("json", &[json!({"a": [1]})]).unwrap(), json!(r#"{"a":[1]}"#));
    }

    #[test]
    fn missing_arguments_fail() {
        assert!(matches!(call("snake_case", &[]), Err(Error::Evaluation(_))));
    }
}
