use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info};

use crate::config::GoBuildConfig;
use crate::model::FunctionSpec;
use crate::services::entrypoint::{generate_entry_point, EntryPointPlan};
use crate::services::paths::output_binary_path;
use crate::services::process::{CommandRunner, CommandSpec};
use crate::services::GoBuildError;

/// Everything needed to compile one selected function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTarget {
    pub function: String,
    pub handler: String,
    /// Path handed to the compiler, relative to the service root.
    pub source: String,
    /// Destination binary, relative to the service root.
    pub binary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<EntryPointPlan>,
}

impl BuildTarget {
    /// Derive the build target of a function; `None` when it has no handler.
    pub fn for_function(function: &FunctionSpec, config: &GoBuildConfig) -> Option<Self> {
        let handler = function.handler.clone()?;
        let binary = output_binary_path(function, config)?;
        let entry_point = EntryPointPlan::for_function(function, config);
        let source = match &entry_point {
            Some(plan) => plan.main_path.clone(),
            None => compile_source(&handler),
        };
        Some(Self { function: function.name.clone(), handler, source, binary, entry_point })
    }
}

/// Source argument for a handler that needs no generated entry point.
///
/// A `dir/*.go` wildcard is compiled as the package directory `./dir`, since
/// commands run without a shell to expand it.
pub fn compile_source(handler: &str) -> String {
    match handler.strip_suffix("*.go") {
        Some(directory) => {
            let directory = directory.trim_end_matches('/');
            if directory.is_empty() {
                ".".to_string()
            } else if directory.starts_with('/') || directory.starts_with("./") {
                directory.to_string()
            } else {
                format!("./{directory}")
            }
        }
        None => handler.to_string(),
    }
}

/// Drives entry-point generation and compilation for a set of functions.
pub struct GoBuilder<'a> {
    /// Service root; generated files are written and commands run relative to it.
    pub service_path: &'a Path,
    pub config: &'a GoBuildConfig,
    pub runner: &'a dyn CommandRunner,
    /// Toolchain root every generated entry point's module must live under.
    pub toolchain_root: PathBuf,
}

impl<'a> GoBuilder<'a> {
    pub fn new(
        service_path: &'a Path,
        config: &'a GoBuildConfig,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self { service_path, config, runner, toolchain_root: config.toolchain_root() }
    }

    pub fn with_toolchain_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.toolchain_root = root.into();
        self
    }

    /// Write a generated entry point for every function that plans one.
    ///
    /// Every plan's module is checked against the toolchain root before any
    /// file is written; one module outside it aborts the whole step. Write
    /// failures surface as a build failure. Returns the paths written.
    pub fn create_entry_points(
        &self,
        functions: &[FunctionSpec],
    ) -> Result<Vec<PathBuf>, GoBuildError> {
        let plans: Vec<EntryPointPlan> =
            functions.iter().filter_map(|f| EntryPointPlan::for_function(f, self.config)).collect();
        if plans.is_empty() {
            return Ok(Vec::new());
        }

        info!("Creating main functions for modules");
        let imports = plans
            .iter()
            .map(|plan| plan.module_import_path(self.service_path, &self.toolchain_root))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|err| error!("{err}"))?;

        let mut written = Vec::with_capacity(plans.len());
        for (plan, module_import) in plans.iter().zip(&imports) {
            let out_path = self.service_path.join(&plan.main_path);
            generate_entry_point(plan, &out_path, module_import, &self.config.path_to_aws_lambda)
                .map_err(|err| {
                    error!("{err}");
                    GoBuildError::BuildFailure { function: plan.function.clone(), command: None }
                })?;
            written.push(out_path);
        }
        Ok(written)
    }

    /// The compile command for a target, with the AWS-target prefix applied.
    pub fn build_command(&self, target: &BuildTarget) -> Result<CommandSpec, GoBuildError> {
        self.config
            .build_cmd
            .render(&self.config.awsbuild_prefix, &[target.source.as_str(), target.binary.as_str()])
    }

    /// Compile each function in order, stopping at the first failure.
    pub fn build(&self, functions: &[FunctionSpec]) -> Result<Vec<BuildTarget>, GoBuildError> {
        info!("Beginning Go build");

        let mut built = Vec::with_capacity(functions.len());
        for function in functions {
            let Some(target) = BuildTarget::for_function(function, self.config) else {
                error!("Function '{}' declares no handler to build", function.name);
                return Err(GoBuildError::BuildFailure {
                    function: function.name.clone(),
                    command: None,
                });
            };

            let command = self.build_command(&target).map_err(|err| {
                error!("Error building golang file at {}: {err}", target.handler);
                GoBuildError::BuildFailure { function: target.function.clone(), command: None }
            })?;
            let command_line = command.command_line();
            info!("{command_line}");

            let succeeded = match self.runner.run(&command, self.service_path) {
                Ok(outcome) => outcome.success(),
                Err(err) => {
                    error!("Failed to spawn {}: {err}", command.program);
                    false
                }
            };
            if !succeeded {
                error!(
                    "Error building golang file at {}\nTo replicate please run:\n{command_line}\n",
                    target.handler
                );
                return Err(GoBuildError::BuildFailure {
                    function: target.function.clone(),
                    command: Some(command_line),
                });
            }
            built.push(target);
        }
        Ok(built)
    }
}
