use std::fs;

use anyhow::{Context, Result};
use gobuild_core::model::ServiceDescription;
use gobuild_core::services::deploy::rewrite_for_deployment;
use gobuild_core::services::selection::select_go_functions;
use tracing::info;

use crate::commands::load_service;

/// Rewrite the selected Go functions of `service` to point at their binaries.
pub fn rewrite_service(service: &mut ServiceDescription, function: Option<&str>) -> Result<()> {
    let config = service.go_build_config();
    let functions = select_go_functions(service, &config, function);
    let rewritten = rewrite_for_deployment(&functions, &config);
    service.substitute_functions(rewritten)
}

/// Emit the service description as it should be packaged.
pub fn package_command(
    root: &str,
    config_file: Option<&str>,
    function: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let mut service = load_service(root, config_file)?;
    rewrite_service(&mut service, function)?;
    let yaml = service.to_yaml_string()?;

    match output {
        Some(path) => {
            fs::write(path, &yaml)
                .with_context(|| format!("Failed to write rewritten service to {path}"))?;
            info!("Wrote rewritten service to {path}");
        }
        None => print!("{yaml}"),
    }
    Ok(())
}
