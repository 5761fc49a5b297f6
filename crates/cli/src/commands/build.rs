use anyhow::Result;
use gobuild_core::services::build::GoBuilder;
use gobuild_core::services::compress::UpxCompressor;
use gobuild_core::services::process::SystemRunner;
use gobuild_core::services::selection::select_go_functions;
use tracing::{info, warn};

use crate::commands::load_service;

/// Generate entry points, compile every selected function, then pack the binaries.
pub fn build_command(
    root: &str,
    config_file: Option<&str>,
    function: Option<&str>,
    local: bool,
) -> Result<()> {
    let service = load_service(root, config_file)?;
    let config = service.go_build_config();
    if local {
        info!("Local builds are not active; the AWS target prefix is still applied");
    }

    let functions = select_go_functions(&service, &config, function);
    if functions.is_empty() {
        warn!("No Go functions selected, nothing to build");
        return Ok(());
    }

    let runner = SystemRunner;
    let builder = GoBuilder::new(&service.service_path, &config, &runner);
    builder.create_entry_points(&functions)?;
    let built = builder.build(&functions)?;

    let report = UpxCompressor::new(&service.service_path, &config, &runner).compress(&functions)?;

    println!("Built {} function(s):", built.len());
    for target in &built {
        println!("  - {} -> {}", target.function, target.binary);
    }
    if !report.compressed.is_empty() {
        println!("Compressed {} binary(ies)", report.compressed.len());
    }
    Ok(())
}
