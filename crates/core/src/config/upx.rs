use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::{Mapping, Value};

/// Flags passed to the executable packer ahead of the binary path.
///
/// Accepted shapes in YAML:
/// - a single string: `upxOption: "--best"`
/// - a list of flags: `upxOption: ["--best", "--lzma"]`
/// - a mapping of option name to value: `upxOption: { best: true, "9": true }`
///
/// Mapping keys already starting with `-` are used verbatim, single-character
/// keys become short flags (`-9`), longer keys become kebab-cased long flags
/// (`ultraBrute` -> `--ultra-brute`). `true` enables a flag, `false`/`null`
/// drop it, any other scalar is attached as `--key=value`.
///
/// Options read from YAML serialize back in the shape they were written in.
#[derive(Debug, Clone, Default)]
pub struct UpxOptions {
    flags: Vec<String>,
    /// Report label when it differs from the first flag (mapping key name).
    label: Option<String>,
    source: Option<Value>,
}

impl UpxOptions {
    pub fn new<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { flags: flags.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Label used when reporting compression results: the first mapping key,
    /// else the first flag, else `standard`.
    pub fn label(&self) -> &str {
        self.label
            .as_deref()
            .or_else(|| self.flags.first().map(String::as_str))
            .unwrap_or("standard")
    }

    fn from_mapping(table: &Mapping) -> Self {
        let mut flags = Vec::new();
        let mut label = None;
        for (key, value) in table {
            let name = match key {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            let flag = flag_for(&name);
            let flag = match value {
                Value::Bool(true) => flag,
                Value::String(s) => format!("{flag}={s}"),
                Value::Number(n) => format!("{flag}={n}"),
                _ => continue,
            };
            label.get_or_insert(name);
            flags.push(flag);
        }
        Self { flags, label, source: None }
    }
}

impl PartialEq for UpxOptions {
    fn eq(&self, other: &Self) -> bool {
        self.flags == other.flags && self.label() == other.label()
    }
}

impl Eq for UpxOptions {}

fn flag_for(name: &str) -> String {
    if name.starts_with('-') {
        return name.to_string();
    }
    if name.chars().count() == 1 {
        return format!("-{name}");
    }
    let mut kebab = String::with_capacity(name.len() + 2);
    kebab.push_str("--");
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            kebab.push('-');
            kebab.push(ch.to_ascii_lowercase());
        } else {
            kebab.push(ch);
        }
    }
    kebab
}

impl Serialize for UpxOptions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.source {
            Some(source) => source.serialize(serializer),
            None => self.flags.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for UpxOptions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let source = Value::deserialize(deserializer)?;
        let mut options = match &source {
            Value::String(flag) if flag.trim().is_empty() => UpxOptions::default(),
            Value::String(flag) => UpxOptions::new([flag.as_str()]),
            Value::Sequence(_) => UpxOptions::new(
                Vec::<String>::deserialize(source.clone()).map_err(serde::de::Error::custom)?,
            ),
            Value::Mapping(table) => UpxOptions::from_mapping(table),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected a flag, a list of flags or a mapping, found {other:?}"
                )))
            }
        };
        options.source = Some(source);
        Ok(options)
    }
}
