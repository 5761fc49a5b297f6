use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde_yaml::{Mapping, Value};

use crate::config::GoBuildConfig;
use crate::model::FunctionSpec;

/// File names probed, in order, when no explicit service file is given.
pub const SERVICE_FILE_NAMES: [&str; 2] = ["serverless.yml", "serverless.yaml"];

/// Parsed service description plus the raw document it came from.
///
/// `service_path` is the working-directory root every relative artifact path
/// is resolved against.
#[derive(Debug, Clone)]
pub struct ServiceDescription {
    pub service_path: PathBuf,
    /// Project-wide default runtime (`provider.runtime`).
    pub provider_runtime: Option<String>,
    /// Declared functions in declaration order.
    pub functions: Vec<FunctionSpec>,
    /// The `custom` section, if any.
    pub custom: Option<Value>,
    document: Value,
}

impl ServiceDescription {
    /// Build a description from parts (no backing YAML document).
    pub fn new(
        service_path: impl Into<PathBuf>,
        provider_runtime: Option<String>,
        functions: Vec<FunctionSpec>,
    ) -> Result<Self> {
        let mut document = Mapping::new();
        if let Some(runtime) = &provider_runtime {
            let mut provider = Mapping::new();
            provider.insert("runtime".into(), Value::String(runtime.clone()));
            document.insert("provider".into(), Value::Mapping(provider));
        }
        let mut declared = Mapping::new();
        for function in &functions {
            declared.insert(Value::String(function.name.clone()), function_value(function)?);
        }
        document.insert("functions".into(), Value::Mapping(declared));

        Ok(Self {
            service_path: service_path.into(),
            provider_runtime,
            functions,
            custom: None,
            document: Value::Mapping(document),
        })
    }

    /// Attach a `custom` section (user overrides live under `custom.go-build`).
    pub fn with_custom(mut self, custom: Value) -> Self {
        if let Value::Mapping(doc) = &mut self.document {
            doc.insert("custom".into(), custom.clone());
        }
        self.custom = Some(custom);
        self
    }

    /// Parse a service description from YAML text.
    pub fn from_yaml_str(body: &str, service_path: impl Into<PathBuf>) -> Result<Self> {
        let document: Value =
            serde_yaml::from_str(body).context("Failed to parse service YAML")?;
        if !document.is_mapping() {
            return Err(anyhow!("Service YAML must be a mapping at the top level"));
        }

        let provider_runtime = document
            .get("provider")
            .and_then(|p| p.get("runtime"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut functions = Vec::new();
        if let Some(declared) = document.get("functions").and_then(Value::as_mapping) {
            for (key, body) in declared {
                let name = key
                    .as_str()
                    .ok_or_else(|| anyhow!("Function names must be strings, found {key:?}"))?;
                let mut function: FunctionSpec = if body.is_null() {
                    FunctionSpec::default()
                } else {
                    serde_yaml::from_value(body.clone())
                        .with_context(|| format!("Failed to parse function '{name}'"))?
                };
                function.name = name.to_string();
                functions.push(function);
            }
        }

        let custom = document.get("custom").cloned();

        Ok(Self { service_path: service_path.into(), provider_runtime, functions, custom, document })
    }

    /// Load a service file from disk; its parent directory becomes the service root.
    pub fn load(path: &Path) -> Result<Self> {
        let body = fs::read_to_string(path)
            .with_context(|| format!("Failed to read service file at {}", path.display()))?;
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_yaml_str(&body, root)
            .with_context(|| format!("Invalid service file {}", path.display()))
    }

    /// Resolve the plugin configuration for this service.
    pub fn go_build_config(&self) -> GoBuildConfig {
        GoBuildConfig::from_custom(self.custom.as_ref())
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name.as_str()).collect()
    }

    /// Replace functions by name with rewritten records, in both the typed list
    /// and the backing document. Functions not yet declared are appended.
    pub fn substitute_functions(&mut self, rewritten: Vec<FunctionSpec>) -> Result<()> {
        for function in rewritten {
            let value = function_value(&function)?;
            self.functions_mapping_mut()?.insert(Value::String(function.name.clone()), value);

            match self.functions.iter_mut().find(|f| f.name == function.name) {
                Some(slot) => *slot = function,
                None => self.functions.push(function),
            }
        }
        Ok(())
    }

    /// Serialize the (possibly rewritten) document back to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(&self.document).context("Failed to serialize service YAML")
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    fn functions_mapping_mut(&mut self) -> Result<&mut Mapping> {
        let doc = self
            .document
            .as_mapping_mut()
            .ok_or_else(|| anyhow!("Service document is not a mapping"))?;
        let entry = doc.entry(Value::String("functions".into())).or_insert(Value::Null);
        if entry.is_null() {
            *entry = Value::Mapping(Mapping::new());
        }
        entry.as_mapping_mut().ok_or_else(|| anyhow!("Service 'functions' is not a mapping"))
    }
}

fn function_value(function: &FunctionSpec) -> Result<Value> {
    serde_yaml::to_value(function)
        .with_context(|| format!("Failed to serialize function '{}'", function.name))
}

/// Locate the service file under `root`, trying each of [`SERVICE_FILE_NAMES`].
pub fn find_service_file(root: &Path) -> Option<PathBuf> {
    SERVICE_FILE_NAMES.iter().map(|name| root.join(name)).find(|p| p.is_file())
}
