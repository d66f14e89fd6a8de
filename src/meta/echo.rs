use super::{Legend, Meta};
use crate::constants::MAX_ECHO_DEPTH;
use crate::error::{Error, Result};
use log::debug;
use serde_json::Value;

/// Expands `legend` into the legends it echoes.
///
/// Without `echo`/`repeat` the legend stands for itself. Otherwise the echo
/// source (a string key looked up in the legend, then in `meta`, or an
/// inline array) must resolve to an array of legends; each element becomes
/// a child inheriting the parent's fields, and children are expanded again
/// so nested echoes flatten in order.
pub fn resolve_echo(meta: Option<&Meta>, legend: &Legend) -> Result<Vec<Legend>> {
    let mut legends = Vec::new();
    expand(meta, legend, 0, &mut legends)?;
    debug!(
        "Echoed legend '{}' into {} legend(s)",
        legend.name().unwrap_or_default(),
        legends.len()
    );
    Ok(legends)
}

fn expand(meta: Option<&Meta>, legend: &Legend, depth: usize, out: &mut Vec<Legend>) -> Result<()> {
    let Some(echo) = legend.echo() else {
        out.push(legend.clone());
        return Ok(());
    };

    if depth >= MAX_ECHO_DEPTH {
        return Err(Error::EchoCycle {
            name: legend.name().unwrap_or_default().to_string(),
            depth: MAX_ECHO_DEPTH,
        });
    }

    for element in resolve_source(meta, legend, echo)? {
        let child = legend.inherit(&Legend::from_value(element)?);
        expand(meta, &child, depth + 1, out)?;
    }
    Ok(())
}

fn resolve_source(meta: Option<&Meta>, legend: &Legend, echo: &Value) -> Result<Vec<Value>> {
    let resolved = match echo {
        Value::String(key) => legend
            .get(key)
            .cloned()
            .or_else(|| meta.and_then(|meta| meta.get(key)))
            .ok_or_else(|| {
                Error::EchoResolution(format!("echo key '{key}' not found in legend or meta"))
            })?,
        other => other.clone(),
    };

    match resolved {
        Value::Array(items) => Ok(items),
        other => Err(Error::EchoResolution(format!(
            "expected echo to resolve to an array, got: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legend(value: Value) -> Legend {
        serde_json::from_value(value).unwrap()
    }

    fn names(legends: &[Legend]) -> Vec<&str> {
        legends.iter().filter_map(Legend::name).collect()
    }

    #[test]
    fn identity_without_echo() {
        let base = legend(json!({"name": "page", "title": "T"}));
        assert_eq!(resolve_echo(None, &base).unwrap(), vec![base]);
    }

    #[test]
    fn echoes_inline_arrays() {
        let base = legend(json!({"name": "page", "title": "T", "echo": [{"name": "a"}, "b"]}));
        let echoed = resolve_echo(None, &base).unwrap();
        assert_eq!(names(&echoed), vec!["a", "b"]);
        assert!(echoed.iter().all(|l| l.get("title") == Some(&json!("T"))));
    }

    #[test]
    fn string_keys_prefer_legend_over_meta() {
        let meta = Meta::parse("planets:\n  - name: mars\n  - name: venus\n", "meta.yaml").unwrap();
        let from_meta = legend(json!({"name": "planet", "echo": "planets"}));
        assert_eq!(names(&resolve_echo(Some(&meta), &from_meta).unwrap()), vec!["mars", "venus"]);

        let own = legend(json!({"name": "planet", "repeat": "planets", "planets": [{"name": "earth"}]}));
        assert_eq!(names(&resolve_echo(Some(&meta), &own).unwrap()), vec!["earth"]);
    }

    #[test]
    fn nested_echoes_flatten() {
        let base = legend(json!({
            "name": "page",
            "echo": [
                {"name": "x", "echo": [{"name": "x1"}, {"name": "x2"}]},
                {"name": "y"}
            ]
        }));
        assert_eq!(names(&resolve_echo(None, &base).unwrap()), vec!["x1", "x2", "y"]);
    }

    #[test]
    fn non_arrays_and_bad_elements_fail() {
        let meta = Meta::parse("planets: mars\n", "meta.yaml").unwrap();
        let base = legend(json!({"name": "p", "echo": "planets"}));
        assert!(matches!(resolve_echo(Some(&meta), &base), Err(Error::EchoResolution(_))));

        let missing = legend(json!({"name": "p", "echo": "nowhere"}));
        assert!(matches!(resolve_echo(None, &missing), Err(Error::EchoResolution(_))));

        let bad = legend(json!({"name": "p", "echo": [{"title": "no name"}]}));
        assert!(matches!(resolve_echo(None, &bad), Err(Error::InvalidLegend(_))));
    }

    #[test]
    fn self_referencing_echo_is_a_cycle() {
        let meta = Meta::parse("loop:\n  - name: again\n    echo: loop\n", "meta.yaml").unwrap();
        let base = legend(json!({"name": "p", "echo": "loop"}));
        assert!(matches!(resolve_echo(Some(&meta), &base), Err(Error::EchoCycle { .. })));
    }
}
