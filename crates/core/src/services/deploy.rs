use tracing::{debug, info};

use crate::config::GoBuildConfig;
use crate::model::{FunctionSpec, PackageRules};
use crate::services::paths::output_binary_path;

/// Point each function at its built binary, ahead of packaging.
///
/// Returns rewritten copies; the caller substitutes them back into the
/// service (see [`ServiceDescription::substitute_functions`]). With
/// `minimizePackage`, functions without their own package rules get rules
/// that ship only the binary.
///
/// [`ServiceDescription::substitute_functions`]: crate::model::ServiceDescription::substitute_functions
pub fn rewrite_for_deployment(
    functions: &[FunctionSpec],
    config: &GoBuildConfig,
) -> Vec<FunctionSpec> {
    info!("Reassigning go paths to point to {}", config.bin_path);

    functions
        .iter()
        .map(|function| {
            let mut rewritten = function.clone();
            let Some(binary) = output_binary_path(function, config) else {
                debug!(function = %function.name, "no handler, leaving function unchanged");
                return rewritten;
            };
            if config.minimize_package && rewritten.package.is_none() {
                rewritten.package = Some(PackageRules::only(&binary));
            }
            rewritten.handler = Some(binary);
            rewritten
        })
        .collect()
}
