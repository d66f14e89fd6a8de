use crate::compiler::value::is_truthy;
use crate::constants::legend::{ECHO, NAME, REPEAT};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Per-file descriptor found in a directory's `files` list.
///
/// Holds arbitrary fields; `name` ties it to a template base name, `echo`
/// (or its older spelling `repeat`) asks for one render per echoed element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Legend(Map<String, Value>);

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a legend from an echoed element. Strings are shorthand for
    /// `{ name: <string> }`; anything else must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        let legend = match value {
            Value::Object(map) => Self(map),
            Value::String(name) => {
                let mut legend = Self::new();
                legend.insert(NAME, name);
                legend
            }
            other => {
                return Err(Error::InvalidLegend(format!(
                    "expected an object with a name, got: {other}"
                )))
            }
        };
        legend.validate()?;
        Ok(legend)
    }

    /// Fails unless the legend has a non-empty string `name`.
    pub fn validate(&self) -> Result<()> {
        match self.name() {
            Some(name) if !name.is_empty() => Ok(()),
            _ => Err(Error::InvalidLegend(format!(
                "expected a non-empty string name, got: {}",
                Value::Object(self.0.clone())
            ))),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get(NAME).and_then(Value::as_str)
    }

    /// The echo source, preferring `echo` over the legacy `repeat`. Falsy
    /// values (`null`, `false`, `0`, `""`) count as no echo.
    pub fn echo(&self) -> Option<&Value> {
        [ECHO, REPEAT]
            .into_iter()
            .filter_map(|key| self.0.get(key))
            .find(|value| is_truthy(value))
    }

    pub fn has_echo(&self) -> bool {
        self.echo().is_some()
    }

    /// Child legend for one echoed element: every parent field except the
    /// echo keys, overridden by the element's own fields.
    pub fn inherit(&self, own: &Legend) -> Legend {
        let mut child: Map<String, Value> = self
            .0
            .iter()
            .filter(|(key, _)| key.as_str() != ECHO && key.as_str() != REPEAT)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        for (key, value) in &own.0 {
            child.insert(key.clone(), value.clone());
        }
        Legend(child)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Legend {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One directory's metadata document.
///
/// Stored entries are live: edits made through
/// [`MetadataStore::meta_for_mut`](super::MetadataStore::meta_for_mut) are
/// seen by every later render.
///
/// `files` is normalized to a list whichever form the document used, so
/// templates reading `$meta.files` always get an array of legends; look a
/// legend up by its `name` rather than as `$meta.files.<name>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Legends, written either as a list or as a `name -> legend` mapping.
    #[serde(default, deserialize_with = "deserialize_files")]
    pub files: Vec<Legend>,

    /// Regular expression over base names; matches are not rendered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore: Option<String>,

    /// Any other top-level keys, such as arrays referenced by `echo`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Meta {
    /// Parses a YAML or JSON document; YAML covers both.
    ///
    /// An empty document yields an empty meta.
    pub fn parse(source: &str, path: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).map_err(|source| Error::MetaParse {
            path: path.to_string(),
            source,
        })
    }

    /// Finds the legend whose `name` equals `name`.
    pub fn legend(&self, name: &str) -> Option<&Legend> {
        self.files.iter().find(|legend| legend.name() == Some(name))
    }

    /// Looks up a top-level key, the way string echo sources are resolved.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "files" => serde_json::to_value(&self.files).ok(),
            "ignore" => self.ignore.clone().map(Value::String),
            _ => self.extra.get(key).cloned(),
        }
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FilesRepr {
    List(Vec<Legend>),
    Map(IndexMap<String, Option<Legend>>),
}

fn deserialize_files<'de, D>(deserializer: D) -> std::result::Result<Vec<Legend>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<FilesRepr>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(FilesRepr::List(files)) => files,
        Some(FilesRepr::Map(files)) => files
            .into_iter()
            .map(|(name, legend)| {
                let mut legend = legend.unwrap_or_default();
                if legend.name().is_none() {
                    legend.insert(NAME, name);
                }
                legend
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_list_form() {
        let meta = Meta::parse(
            "files:\n  - name: about\n    title: About\nignore: ^draft\nplanets: [a, b]\n",
            "meta.yaml",
        )
        .unwrap();
        assert_eq!(meta.files.len(), 1);
        assert_eq!(meta.legend("about").unwrap().get("title"), Some(&json!("About")));
        assert_eq!(meta.ignore.as_deref(), Some("^draft"));
        assert_eq!(meta.get("planets"), Some(json!(["a", "b"])));
    }

    #[test]
    fn parses_map_form_and_json() {
        let meta = Meta::parse(r#"{"files": {"about": {"title": "About"}, "blank": null}}"#, "m.json")
            .unwrap();
        assert_eq!(meta.legend("about").unwrap().name(), Some("about"));
        assert!(meta.legend("blank").is_some());
    }

    #[test]
    fn empty_documents_are_empty_meta() {
        assert_eq!(Meta::parse("", "meta.yaml").unwrap(), Meta::default());
    }

    #[test]
    fn invalid_documents_report_path() {
        let err = Meta::parse("files: [", "docs/meta.yaml").unwrap_err();
        assert!(err.to_string().contains("docs/meta.yaml"));
    }

    #[test]
    fn falsy_echo_is_no_echo() {
        for echo in [json!(null), json!(false), json!(""), json!(0)] {
            let legend = Legend::from_value(json!({"name": "p", "echo": echo})).unwrap();
            assert!(!legend.has_echo());
            assert_eq!(legend.echo(), None);
        }
        let legacy = Legend::from_value(json!({"name": "p", "echo": null, "repeat": "xs"})).unwrap();
        assert_eq!(legacy.echo(), Some(&json!("xs")));
    }

    #[test]
    fn map_form_files_serialize_as_list() {
        let meta = Meta::parse("files:\n  index:\n    title: Home\n", "meta.yaml").unwrap();
        assert_eq!(
            meta.to_value().unwrap()["files"],
            json!([{"title": "Home", "name": "index"}])
        );
    }

    #[test]
    fn children_inherit_without_echo_keys() {
        let parent = Legend::from_value(json!({"name": "p", "echo": "xs", "layout": "wide"})).unwrap();
        let own = Legend::from_value(json!({"name": "c", "layout": "narrow"})).unwrap();
        let child = parent.inherit(&own);
        assert_eq!(child.name(), Some("c"));
        assert_eq!(child.get("layout"), Some(&json!("narrow")));
        assert!(!child.has_echo());
    }

    #[test]
    fn legends_need_a_name() {
        assert!(Legend::from_value(json!("earth")).is_ok());
        assert!(matches!(Legend::from_value(json!({"title": "x"})), Err(Error::InvalidLegend(_))));
        assert!(matches!(Legend::from_value(json!("")), Err(Error::InvalidLegend(_))));
        assert!(matches!(Legend::from_value(json!(3)), Err(Error::InvalidLegend(_))));
    }
}
