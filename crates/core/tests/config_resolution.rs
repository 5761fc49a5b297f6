mod common;

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use common::custom;
use gobuild_core::config::{CommandTemplate, GoBuildConfig, DEFAULT_BUILD_CMD};

#[test]
fn missing_custom_section_yields_defaults() {
    let config = GoBuildConfig::from_custom(None);
    assert_eq!(config, GoBuildConfig::default());
    assert_eq!(config.runtime, "go1.x");
    assert_eq!(config.bin_path, "bin");
    assert_eq!(config.awsbuild_prefix, "GOOS=linux ");
    assert_eq!(config.build_cmd, CommandTemplate::Line(DEFAULT_BUILD_CMD.to_string()));
    assert!(config.tests.is_empty());
    assert!(!config.upx_enabled);
}

#[test]
fn custom_without_namespace_or_with_scalar_namespace_yields_defaults() {
    let other_plugin = custom("other-plugin: { binPath: nope }");
    assert_eq!(GoBuildConfig::from_custom(Some(&other_plugin)), GoBuildConfig::default());

    let scalar = custom("go-build: just-a-string");
    assert_eq!(GoBuildConfig::from_custom(Some(&scalar)), GoBuildConfig::default());

    let not_a_mapping = custom("[1, 2, 3]");
    assert_eq!(GoBuildConfig::from_custom(Some(&not_a_mapping)), GoBuildConfig::default());
}

#[test]
fn overrides_replace_only_their_keys() {
    let section = custom(
        r#"
go-build:
  binPath: out/bin
  runtime: provided.al2
  tests: ["./handlers/...", "./lib/..."]
  minimizePackage: true
  upxEnabled: true
  upxOption: { best: true }
  testPlugins: ["offline start"]
  testStartDelay: 250
  goPath: /work/go/src/
"#,
    );
    let config = GoBuildConfig::from_custom(Some(&section));

    assert_eq!(config.bin_path, "out/bin");
    assert_eq!(config.runtime, "provided.al2");
    assert_eq!(config.tests, vec!["./handlers/...", "./lib/..."]);
    assert!(config.minimize_package);
    assert!(config.upx_enabled);
    assert_eq!(config.upx_option.flags(), &["--best"]);
    assert_eq!(config.test_plugins, vec!["offline start"]);
    assert_eq!(config.test_start_delay(), Duration::from_millis(250));
    assert_eq!(config.go_path.as_deref(), Some("/work/go/src/"));

    // Untouched keys keep their defaults.
    assert_eq!(config.generated_main_path, "generatedEntrypoints");
    assert_eq!(config.path_to_aws_lambda, "github.com/aws/aws-lambda-go/lambda");
    assert!(!config.use_bin_path_for_handler);
}

#[test]
fn malformed_values_fall_back_per_key() {
    let section = custom(
        r#"
go-build:
  tests: "./..."
  testStartDelay: soon
  minimizePackage: [yes]
  binPath: ~
  runtime: go1.x-custom
"#,
    );
    let config = GoBuildConfig::from_custom(Some(&section));

    assert!(config.tests.is_empty());
    assert_eq!(config.test_start_delay, 0);
    assert!(!config.minimize_package);
    assert_eq!(config.bin_path, "bin");
    assert_eq!(config.runtime, "go1.x-custom");
}

#[test]
fn build_command_accepts_word_lists() {
    let section = custom(r#"go-build: { buildCmd: ["go", "build", "-o", "%2", "%1"] }"#);
    let config = GoBuildConfig::from_custom(Some(&section));

    let command = config.build_cmd.render(&config.awsbuild_prefix, &["src.go", "bin/src"]).unwrap();
    assert_eq!(command.env, vec![("GOOS".to_string(), "linux".to_string())]);
    assert_eq!(command.program, "go");
    assert_eq!(command.args, vec!["build", "-o", "bin/src", "src.go"]);
}

#[test]
fn default_build_command_renders_without_a_shell() {
    let config = GoBuildConfig::default();
    let command =
        config.build_cmd.render(&config.awsbuild_prefix, &["pkg/fn.go", "bin/pkg/fn"]).unwrap();

    assert_eq!(command.env, vec![("GOOS".to_string(), "linux".to_string())]);
    assert_eq!(command.program, "go");
    assert_eq!(command.args, vec!["build", "-ldflags=-s -w", "-o", "bin/pkg/fn", "pkg/fn.go"]);
}

#[test]
fn substituted_values_are_not_resplit() {
    let template = CommandTemplate::Line("go test %1".into());
    let command = template.render("", &["./dir with space/..."]).unwrap();
    assert_eq!(command.args, vec!["test", "./dir with space/..."]);
}

#[test]
fn templates_without_a_program_are_rejected() {
    let only_env = CommandTemplate::Line("GOOS=linux".into());
    assert!(only_env.render("", &[]).is_err());

    let unbalanced = CommandTemplate::Line("go build \"%1".into());
    assert!(unbalanced.render("", &["x"]).is_err());
}

#[test]
fn toolchain_root_prefers_explicit_go_path() {
    let config = GoBuildConfig { go_path: Some("/explicit/src/".into()), ..Default::default() };
    let root = config.toolchain_root_from(Some(OsString::from("/env/go")), None);
    assert_eq!(root, PathBuf::from("/explicit/src/"));
}

#[test]
fn toolchain_root_falls_back_to_gopath_then_home() {
    let config = GoBuildConfig::default();

    let from_env = config.toolchain_root_from(Some(OsString::from("/env/go")), None);
    assert_eq!(from_env, PathBuf::from("/env/go/src"));

    let from_home = config.toolchain_root_from(None, Some(OsString::from("/home/dev")));
    assert_eq!(from_home, PathBuf::from("/home/dev/go/src"));

    let blank = GoBuildConfig { go_path: Some("  ".into()), ..Default::default() };
    let ignored_blank = blank.toolchain_root_from(Some(OsString::from("/env/go")), None);
    assert_eq!(ignored_blank, PathBuf::from("/env/go/src"));
}
