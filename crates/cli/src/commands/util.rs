use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use gobuild_core::model::{find_service_file, ServiceDescription};

use crate::canonicalize_or_current;

/// Resolve the service file: an explicit `--config` (relative to the root),
/// otherwise `serverless.yml` / `serverless.yaml` in the root.
pub fn resolve_service_file(root: &Path, config: Option<&str>) -> Result<PathBuf> {
    match config {
        Some(file) => Ok(root.join(file)),
        None => find_service_file(root).ok_or_else(|| {
            anyhow!("No serverless.yml or serverless.yaml found in {}", root.display())
        }),
    }
}

/// Load the service rooted at `root`; the root stays the working directory of
/// every command even when `--config` points into a subdirectory.
pub fn load_service(root: &str, config: Option<&str>) -> Result<ServiceDescription> {
    let root_path = canonicalize_or_current(root)?;
    let file = resolve_service_file(&root_path, config)?;
    let mut service = ServiceDescription::load(&file)?;
    service.service_path = root_path;
    Ok(service)
}
