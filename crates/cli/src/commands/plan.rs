use std::path::PathBuf;

use anyhow::{Context, Result};
use gobuild_core::config::GoBuildConfig;
use gobuild_core::model::ServiceDescription;
use gobuild_core::services::build::{BuildTarget, GoBuilder};
use gobuild_core::services::process::SystemRunner;
use gobuild_core::services::selection::select_go_functions;
use serde::Serialize;

use crate::commands::load_service;

/// What `build` would do, without running anything.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    pub service_path: PathBuf,
    pub toolchain_root: PathBuf,
    pub functions: Vec<PlannedFunction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedFunction {
    #[serde(flatten)]
    pub target: BuildTarget,
    /// Import path of the generated entry point's module, when it resolves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_import: Option<String>,
    /// Why the module import does not resolve; `build` fails on it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_error: Option<String>,
    pub command: String,
}

/// Work out the build plan of `service`.
pub fn plan_build(
    service: &ServiceDescription,
    config: &GoBuildConfig,
    function: Option<&str>,
) -> Result<BuildPlan> {
    let runner = SystemRunner;
    let builder = GoBuilder::new(&service.service_path, config, &runner);

    let mut planned = Vec::new();
    for spec in select_go_functions(service, config, function) {
        let Some(target) = BuildTarget::for_function(&spec, config) else {
            continue;
        };
        let command = builder
            .build_command(&target)
            .with_context(|| format!("Invalid build command for '{}'", target.function))?
            .command_line();
        let (module_import, module_error) = match &target.entry_point {
            Some(plan) => {
                match plan.module_import_path(&service.service_path, &builder.toolchain_root) {
                    Ok(import) => (Some(import), None),
                    Err(err) => (None, Some(err.to_string())),
                }
            }
            None => (None, None),
        };
        planned.push(PlannedFunction { target, module_import, module_error, command });
    }

    Ok(BuildPlan {
        service_path: service.service_path.clone(),
        toolchain_root: builder.toolchain_root.clone(),
        functions: planned,
    })
}

/// Print the build plan for the selected functions.
pub fn plan_command(
    root: &str,
    config_file: Option<&str>,
    function: Option<&str>,
    json: bool,
) -> Result<()> {
    let service = load_service(root, config_file)?;
    let config = service.go_build_config();
    let plan = plan_build(&service, &config, function)?;

    if json {
        let serialized =
            serde_json::to_string_pretty(&plan).context("Failed to serialize plan to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Service root: {}", plan.service_path.display());
    println!("Toolchain root: {}", plan.toolchain_root.display());
    println!("Functions ({}):", plan.functions.len());
    if plan.functions.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for planned in &plan.functions {
        let target = &planned.target;
        println!("  - {} [{}]", target.function, target.handler);
        println!("      source: {}", target.source);
        println!("      binary: {}", target.binary);
        if let Some(entry) = &target.entry_point {
            println!("      entry point: {} ({})", entry.main_path, entry.public_function_name);
        }
        if let Some(import) = &planned.module_import {
            println!("      import: {import}");
        }
        if let Some(err) = &planned.module_error {
            println!("      error: {err}");
        }
        println!("      command: {}", planned.command);
    }
    Ok(())
}
