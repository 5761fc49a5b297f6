//! Host service description: the functions declared by a service and the
//! project-wide settings the plugin reads.
//!
//! These records mirror what the host framework owns. Only the fields the
//! plugin reads or rewrites are typed; every other key is preserved verbatim
//! in `extra` so a rewritten service serializes back without losing data.

mod service;

pub use service::*;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

use crate::config::{decode_or_default, UpxOptions};

/// Packaging include/exclude rules of a single function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageRules {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl PackageRules {
    /// Rules shipping nothing but the given artifact.
    pub fn only(artifact: &str) -> Self {
        Self {
            include: vec![format!("./{artifact}")],
            exclude: vec!["./**".to_string()],
            extra: Mapping::new(),
        }
    }
}

/// One function declared by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSpec {
    /// Key of the function in the service's `functions` mapping.
    #[serde(skip)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageRules>,
    /// Per-function override of the global packer switch.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub upx_enabled: Option<bool>,
    /// Per-function replacement of the global packer flags.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub upx_option: Option<UpxOptions>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>, handler: impl Into<String>) -> Self {
        Self { name: name.into(), handler: Some(handler.into()), ..Self::default() }
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }
}

/// Per-function overrides fall back to the global setting when malformed.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decode_or_default("function override", value))
}
