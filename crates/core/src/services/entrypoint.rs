use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::GoBuildConfig;
use crate::model::FunctionSpec;
use crate::services::paths::{join_paths, last_segment};
use crate::services::GoBuildError;

/// File name of every generated entry point.
pub const GENERATED_MAIN_FILE: &str = "main.go";

/// Where and how to synthesize a `main` package for a library-style handler.
///
/// Handlers of the form `path/to/module.Symbol` name an exported function of
/// a library package rather than a buildable program; the plan describes the
/// wrapper that adapts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPointPlan {
    /// Name of the function the plan belongs to.
    pub function: String,
    /// Exported symbol invoked by the generated program.
    pub public_function_name: String,
    /// Module source path, relative to the service root.
    pub module_path: String,
    /// Last segment of `module_path`, used as the package qualifier.
    pub module_name: String,
    /// Output path of the generated file, relative to the service root.
    pub main_path: String,
}

impl EntryPointPlan {
    /// Plan an entry point for `function`, or `None` when it needs none.
    ///
    /// No plan is produced when the handler is missing, has no `.` suffix, or
    /// its suffix is `go` (already a buildable source file or package).
    /// A suffix that is empty or still contains a path separator cannot be an
    /// exported symbol and yields no plan either.
    pub fn for_function(function: &FunctionSpec, config: &GoBuildConfig) -> Option<Self> {
        let handler = function.handler.as_deref()?;
        let (module_path, symbol) = handler.rsplit_once('.')?;
        if symbol == "go" || symbol.is_empty() || symbol.contains(['/', '\\']) {
            return None;
        }

        let main_path = join_paths([
            config.generated_main_path.as_str(),
            module_path,
            symbol,
            GENERATED_MAIN_FILE,
        ]);

        Some(Self {
            function: function.name.clone(),
            public_function_name: symbol.to_string(),
            module_path: module_path.to_string(),
            module_name: last_segment(module_path).to_string(),
            main_path,
        })
    }

    /// Import path of the module: its full path relative to the toolchain root.
    ///
    /// Both paths are normalized lexically first, so `..` segments cannot
    /// escape the root. Fails with [`GoBuildError::PathOutsideToolchainRoot`]
    /// when the module does not live under `toolchain_root`.
    pub fn module_import_path(
        &self,
        service_path: &Path,
        toolchain_root: &Path,
    ) -> Result<String, GoBuildError> {
        let full_module_path = normalize_path(&service_path.join(&self.module_path));
        let root = normalize_path(toolchain_root);
        let outside = || GoBuildError::PathOutsideToolchainRoot {
            module_path: full_module_path.clone(),
            toolchain_root: toolchain_root.to_path_buf(),
        };

        let relative = full_module_path.strip_prefix(&root).map_err(|_| outside())?;
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
                _ => return Err(outside()),
            }
        }
        Ok(segments.join("/"))
    }
}

/// Lexically resolve `.` and `..` components without touching the filesystem.
///
/// A `..` that cannot be resolved is kept.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop =
                    matches!(normalized.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    normalized.pop();
                } else if !matches!(
                    normalized.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_))
                ) {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Plan an entry point for an optional function.
pub fn plan_entry_point(
    function: Option<&FunctionSpec>,
    config: &GoBuildConfig,
) -> Option<EntryPointPlan> {
    function.and_then(|f| EntryPointPlan::for_function(f, config))
}

/// Render the generated program.
///
/// `runtime_import` is the platform runtime package exposing `Start`; its last
/// path segment is the qualifier used in the call. A module whose name
/// collides with that qualifier is imported under the alias `handler`.
pub fn render_entry_point(runtime_import: &str, module_import: &str, plan: &EntryPointPlan) -> String {
    let runtime_name = last_segment(runtime_import);
    let (module_line, qualifier) = if plan.module_name == runtime_name {
        (format!("handler \"{module_import}\""), "handler")
    } else {
        (format!("\"{module_import}\""), plan.module_name.as_str())
    };

    format!(
        "// Code generated by sls-go-build. DO NOT EDIT.\n\
         \n\
         package main\n\
         \n\
         import (\n\
         \t\"{runtime_import}\"\n\
         \n\
         \t{module_line}\n\
         )\n\
         \n\
         func main() {{\n\
         \t{runtime_name}.Start({qualifier}.{symbol})\n\
         }}\n",
        symbol = plan.public_function_name,
    )
}

/// Write the rendered entry point to `out_path`, creating parent directories.
///
/// Any existing file is overwritten.
pub fn generate_entry_point(
    plan: &EntryPointPlan,
    out_path: &Path,
    module_import: &str,
    runtime_import: &str,
) -> Result<(), GoBuildError> {
    info!("Creating main for module: {}/{}", plan.module_path, plan.public_function_name);

    if let Some(directory) = out_path.parent() {
        fs::create_dir_all(directory)
            .map_err(|source| GoBuildError::Io { path: directory.to_path_buf(), source })?;
    }
    let contents = render_entry_point(runtime_import, module_import, plan);
    fs::write(out_path, contents)
        .map_err(|source| GoBuildError::Io { path: out_path.to_path_buf(), source })
}
