use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::config::{CommandTemplate, UpxOptions};

/// Name of the section under `custom` holding user overrides.
pub const GO_BUILD_NAMESPACE: &str = "go-build";

pub const DEFAULT_AWSBUILD_PREFIX: &str = "GOOS=linux ";
pub const DEFAULT_BUILD_CMD: &str = r#"go build -ldflags="-s -w" -o %2 %1"#;
pub const DEFAULT_TEST_CMD: &str = "GO_TEST=serverless go test %1";
pub const DEFAULT_BIN_PATH: &str = "bin";
pub const DEFAULT_RUNTIME: &str = "go1.x";
pub const DEFAULT_GENERATED_MAIN_PATH: &str = "generatedEntrypoints";
pub const DEFAULT_PATH_TO_AWS_LAMBDA: &str = "github.com/aws/aws-lambda-go/lambda";

/// Fully resolved plugin configuration.
///
/// Immutable for the duration of one command; build it once with
/// [`GoBuildConfig::from_custom`] and pass it by reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoBuildConfig {
    /// Words prepended to the build command (environment assignments for the AWS target).
    pub awsbuild_prefix: String,
    /// Compile command; `%1` is the source path, `%2` the destination binary.
    pub build_cmd: CommandTemplate,
    /// Test command; `%1` is the test target.
    pub test_cmd: CommandTemplate,
    /// Directory receiving compiled binaries, relative to the service root.
    pub bin_path: String,
    /// Test targets run by the `test` command.
    pub tests: Vec<String>,
    /// Runtime identifier marking a function as a Go function.
    pub runtime: String,
    /// Explicit toolchain root (GOPATH source directory).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_path: Option<String>,
    /// Directory receiving generated entry points, relative to the service root.
    pub generated_main_path: String,
    /// Import path of the platform runtime package providing `Start`.
    #[serde(rename = "pathToAWSLambda")]
    pub path_to_aws_lambda: String,
    /// Treat handlers as already pointing into `bin_path` and build their whole package.
    pub use_bin_path_for_handler: bool,
    /// Attach an include-only-the-binary package rule on deployment.
    pub minimize_package: bool,
    pub upx_enabled: bool,
    pub upx_option: UpxOptions,
    /// Host plugin commands triggered before the tests run.
    pub test_plugins: Vec<String>,
    /// Delay in milliseconds between the test plugins and the first test.
    pub test_start_delay: u64,
}

impl Default for GoBuildConfig {
    fn default() -> Self {
        Self {
            awsbuild_prefix: DEFAULT_AWSBUILD_PREFIX.to_string(),
            build_cmd: CommandTemplate::Line(DEFAULT_BUILD_CMD.to_string()),
            test_cmd: CommandTemplate::Line(DEFAULT_TEST_CMD.to_string()),
            bin_path: DEFAULT_BIN_PATH.to_string(),
            tests: Vec::new(),
            runtime: DEFAULT_RUNTIME.to_string(),
            go_path: None,
            generated_main_path: DEFAULT_GENERATED_MAIN_PATH.to_string(),
            path_to_aws_lambda: DEFAULT_PATH_TO_AWS_LAMBDA.to_string(),
            use_bin_path_for_handler: false,
            minimize_package: false,
            upx_enabled: false,
            upx_option: UpxOptions::default(),
            test_plugins: Vec::new(),
            test_start_delay: 0,
        }
    }
}

impl GoBuildConfig {
    /// Resolve the configuration from a service's `custom` section.
    pub fn from_custom(custom: Option<&Value>) -> Self {
        let overrides = custom.and_then(|c| c.get(GO_BUILD_NAMESPACE)).and_then(Value::as_mapping);
        Self::from_overrides(overrides)
    }

    /// Merge user overrides on top of the built-in defaults.
    pub fn from_overrides(overrides: Option<&Mapping>) -> Self {
        let mut config = Self::default();
        let Some(map) = overrides else {
            return config;
        };

        merge(map, "awsbuildPrefix", &mut config.awsbuild_prefix);
        merge(map, "buildCmd", &mut config.build_cmd);
        merge(map, "testCmd", &mut config.test_cmd);
        merge(map, "binPath", &mut config.bin_path);
        merge(map, "tests", &mut config.tests);
        merge(map, "runtime", &mut config.runtime);
        if let Some(go_path) = lookup::<String>(map, "goPath") {
            config.go_path = Some(go_path);
        }
        merge(map, "generatedMainPath", &mut config.generated_main_path);
        merge(map, "pathToAWSLambda", &mut config.path_to_aws_lambda);
        merge(map, "useBinPathForHandler", &mut config.use_bin_path_for_handler);
        merge(map, "minimizePackage", &mut config.minimize_package);
        merge(map, "upxEnabled", &mut config.upx_enabled);
        merge(map, "upxOption", &mut config.upx_option);
        merge(map, "testPlugins", &mut config.test_plugins);
        merge(map, "testStartDelay", &mut config.test_start_delay);

        config
    }

    /// Toolchain root every generated entry point's module must live under.
    ///
    /// Precedence:
    /// - `goPath` from the configuration, when non-empty.
    /// - `$GOPATH/src/` (first entry of a list-valued `GOPATH`).
    /// - `$HOME/go/src/`, the Go toolchain's own default GOPATH.
    pub fn toolchain_root(&self) -> PathBuf {
        self.toolchain_root_from(std::env::var_os("GOPATH"), std::env::var_os("HOME"))
    }

    /// Same as [`toolchain_root`](Self::toolchain_root) with the environment supplied by the caller.
    pub fn toolchain_root_from(&self, gopath: Option<OsString>, home: Option<OsString>) -> PathBuf {
        if let Some(explicit) = self.go_path.as_deref().filter(|p| !p.trim().is_empty()) {
            return PathBuf::from(explicit);
        }
        let first_gopath = gopath.and_then(|value| std::env::split_paths(&value).next());
        match first_gopath.filter(|p| !p.as_os_str().is_empty()) {
            Some(gopath) => gopath.join("src"),
            None => home.map(PathBuf::from).unwrap_or_default().join("go").join("src"),
        }
    }

    pub fn test_start_delay(&self) -> Duration {
        Duration::from_millis(self.test_start_delay)
    }
}

/// Decode a single override, treating absent, null and malformed values alike.
fn lookup<T: DeserializeOwned>(map: &Mapping, key: &str) -> Option<T> {
    decode_or_default(key, map.get(key)?.clone())
}

/// Decode `value`, logging and discarding it when it is null or malformed.
pub(crate) fn decode_or_default<T: DeserializeOwned>(key: &str, value: Value) -> Option<T> {
    if value.is_null() {
        return None;
    }
    match serde_yaml::from_value::<T>(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            debug!(key, %err, "ignoring malformed go-build option, using default");
            None
        }
    }
}

fn merge<T: DeserializeOwned>(map: &Mapping, key: &str, slot: &mut T) {
    if let Some(value) = lookup(map, key) {
        *slot = value;
    }
}
