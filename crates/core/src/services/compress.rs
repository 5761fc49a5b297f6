use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::GoBuildConfig;
use crate::model::FunctionSpec;
use crate::services::paths::output_binary_path;
use crate::services::process::{CommandRunner, CommandSpec};
use crate::services::GoBuildError;

/// Resolve the packer executable: `UPX_BIN` when set, otherwise `upx` on PATH.
pub fn resolve_upx_bin() -> String {
    std::env::var("UPX_BIN")
        .ok()
        .filter(|bin| !bin.trim().is_empty())
        .unwrap_or_else(|| "upx".to_string())
}

/// Size change of one packed binary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionStats {
    pub binary: String,
    pub option: String,
    pub size_before: u64,
    pub size_after: u64,
}

impl CompressionStats {
    pub fn reduction_percent(&self) -> f64 {
        if self.size_before == 0 {
            return 0.0;
        }
        100.0 - (self.size_after as f64 / self.size_before as f64) * 100.0
    }

    /// One-line report, sizes in megabytes.
    pub fn summary(&self) -> String {
        format!(
            "[{}] {} ({:.2}% reduced) {:.2} Mb => {:.2} Mb",
            self.option,
            self.binary,
            self.reduction_percent(),
            self.size_before as f64 / 1_000_000.0,
            self.size_after as f64 / 1_000_000.0
        )
    }
}

/// Outcome of a compression pass that did not fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompressReport {
    pub compressed: Vec<CompressionStats>,
    /// Functions skipped through `upxEnabled: false`.
    pub skipped: Vec<String>,
}

/// Packs built binaries with an external executable packer.
pub struct UpxCompressor<'a> {
    pub service_path: &'a Path,
    pub config: &'a GoBuildConfig,
    pub runner: &'a dyn CommandRunner,
    pub upx_bin: String,
}

impl<'a> UpxCompressor<'a> {
    pub fn new(
        service_path: &'a Path,
        config: &'a GoBuildConfig,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self { service_path, config, runner, upx_bin: resolve_upx_bin() }
    }

    pub fn with_upx_bin(mut self, upx_bin: impl Into<String>) -> Self {
        self.upx_bin = upx_bin.into();
        self
    }

    /// Pack every eligible binary.
    ///
    /// Does nothing when packing is disabled globally. Each binary is attempted
    /// independently; failures are logged and, once every binary has been
    /// attempted, reported together as [`GoBuildError::CompressFailure`].
    pub fn compress(&self, functions: &[FunctionSpec]) -> Result<CompressReport, GoBuildError> {
        let mut report = CompressReport::default();
        if !self.config.upx_enabled {
            debug!("upx disabled, skipping compression");
            return Ok(report);
        }

        info!("Beginning UPX compressing");
        let mut failed = Vec::new();
        for function in functions {
            if function.upx_enabled == Some(false) {
                debug!(function = %function.name, "upx disabled for function");
                report.skipped.push(function.name.clone());
                continue;
            }
            let Some(binary) = output_binary_path(function, self.config) else {
                warn!("Function '{}' declares no handler, nothing to compress", function.name);
                continue;
            };

            match self.compress_binary(function, &binary) {
                Ok(stats) => {
                    info!("{}", stats.summary());
                    report.compressed.push(stats);
                }
                Err(err) => {
                    error!(
                        "Error compressing executable at {}: {err}",
                        function.handler.as_deref().unwrap_or(&binary)
                    );
                    failed.push(binary);
                }
            }
        }

        if failed.is_empty() {
            Ok(report)
        } else {
            Err(GoBuildError::CompressFailure { binaries: failed })
        }
    }

    fn compress_binary(
        &self,
        function: &FunctionSpec,
        binary: &str,
    ) -> Result<CompressionStats, String> {
        let options = function.upx_option.as_ref().unwrap_or(&self.config.upx_option);
        let binary_path = self.service_path.join(binary);
        let size_before = file_size(&binary_path)?;

        let command =
            CommandSpec::new(self.upx_bin.as_str()).args(options.flags().iter().cloned()).arg(binary);
        let outcome = self
            .runner
            .run(&command, self.service_path)
            .map_err(|e| format!("failed to spawn {}: {e}", self.upx_bin))?;
        if !outcome.success() {
            return Err(format!("`{command}` exited with {:?}", outcome.code));
        }

        Ok(CompressionStats {
            binary: binary.to_string(),
            option: options.label().to_string(),
            size_before,
            size_after: file_size(&binary_path)?,
        })
    }
}

fn file_size(path: &Path) -> Result<u64, String> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| format!("cannot read {}: {e}", path.display()))
}
