use tracing::{debug, warn};

use crate::config::GoBuildConfig;
use crate::model::{FunctionSpec, ServiceDescription};

/// Select the functions that need a Go build, in declaration order.
///
/// With `filter` set only that function is a candidate (an unknown name
/// selects nothing). When the project-wide runtime is the configured Go
/// runtime, functions without their own runtime inherit it; otherwise a
/// function must declare the Go runtime explicitly.
///
/// With `useBinPathForHandler` enabled, the returned records carry a rewritten
/// handler of the form `<dir>/*.go` (the handler's directory below `binPath`).
/// The service itself is never modified.
pub fn select_go_functions(
    service: &ServiceDescription,
    config: &GoBuildConfig,
    filter: Option<&str>,
) -> Vec<FunctionSpec> {
    let candidates: Vec<&FunctionSpec> = match filter {
        Some(name) => match service.function(name) {
            Some(function) => vec![function],
            None => {
                warn!(function = name, "function not declared in service, nothing selected");
                Vec::new()
            }
        },
        None => service.functions.iter().collect(),
    };

    let project_is_go = service.provider_runtime.as_deref() == Some(config.runtime.as_str());

    candidates
        .into_iter()
        .map(|function| {
            let mut function = function.clone();
            if config.use_bin_path_for_handler {
                if let Some(handler) = function.handler.as_deref() {
                    function.handler = Some(handler_from_bin_path(handler, &config.bin_path));
                }
            }
            function
        })
        .filter(|function| {
            let selected = is_go_function(function, &config.runtime, project_is_go);
            if !selected {
                debug!(function = %function.name, runtime = ?function.runtime, "skipping non-Go function");
            }
            selected
        })
        .collect()
}

/// Runtime rule deciding whether a single function is a Go function.
pub fn is_go_function(function: &FunctionSpec, go_runtime: &str, project_is_go: bool) -> bool {
    match function.runtime.as_deref().filter(|r| !r.is_empty()) {
        Some(runtime) => runtime == go_runtime,
        None => project_is_go,
    }
}

/// Turn a handler pointing at a built binary back into a wildcard over the
/// Go sources of its directory: `bin/users/get/main` -> `users/get/*.go`.
pub fn handler_from_bin_path(handler: &str, bin_path: &str) -> String {
    let relative = handler
        .strip_prefix(bin_path.trim_end_matches('/'))
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .map(|rest| rest.trim_start_matches('/'))
        .unwrap_or(handler);
    let directory = relative.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    format!("{directory}/*.go")
}
