mod common;

use std::fs;
use std::path::Path;

use common::{MissingProgramRunner, RecordingRunner};
use gobuild_core::config::{GoBuildConfig, UpxOptions};
use gobuild_core::model::FunctionSpec;
use gobuild_core::services::compress::{CompressionStats, UpxCompressor};
use gobuild_core::services::GoBuildError;
use tempfile::tempdir;

fn enabled() -> GoBuildConfig {
    GoBuildConfig { upx_enabled: true, ..Default::default() }
}

fn write_binary(root: &Path, relative: &str, len: usize) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![0u8; len]).unwrap();
}

/// Mimic the packer by halving the binary named by the last argument.
fn halve_last_arg(command: &gobuild_core::services::process::CommandSpec, cwd: &Path) {
    let target = cwd.join(command.args.last().unwrap());
    let len = fs::metadata(&target).unwrap().len() as usize;
    fs::write(target, vec![0u8; len / 2]).unwrap();
}

#[test]
fn disabled_globally_is_a_no_op() {
    let temp = tempdir().unwrap();
    let config = GoBuildConfig::default();
    let runner = RecordingRunner::new();
    let enabled_fn = FunctionSpec { upx_enabled: Some(true), ..FunctionSpec::new("a", "a.go") };

    let report = UpxCompressor::new(temp.path(), &config, &runner).compress(&[enabled_fn]).unwrap();
    assert!(report.compressed.is_empty());
    assert!(runner.calls().is_empty());
}

#[test]
fn compresses_each_binary_and_reports_sizes() {
    let temp = tempdir().unwrap();
    write_binary(temp.path(), "bin/a", 2_000_000);
    let config = GoBuildConfig { upx_option: UpxOptions::new(["--best"]), ..enabled() };
    let runner = RecordingRunner::new().with_effect(halve_last_arg);

    let report = UpxCompressor::new(temp.path(), &config, &runner)
        .with_upx_bin("upx-test")
        .compress(&[FunctionSpec::new("a", "a.go")])
        .unwrap();

    assert_eq!(runner.command_lines(), vec!["upx-test --best bin/a"]);
    let stats = &report.compressed[0];
    assert_eq!(stats.size_before, 2_000_000);
    assert_eq!(stats.size_after, 1_000_000);
    assert_eq!(stats.summary(), "[--best] bin/a (50.00% reduced) 2.00 Mb => 1.00 Mb");
}

#[test]
fn per_function_settings_override_global_ones() {
    let temp = tempdir().unwrap();
    write_binary(temp.path(), "bin/a", 10);
    write_binary(temp.path(), "bin/b", 10);
    let config = GoBuildConfig { upx_option: UpxOptions::new(["--best"]), ..enabled() };
    let runner = RecordingRunner::new();
    let functions = vec![
        FunctionSpec { upx_enabled: Some(false), ..FunctionSpec::new("skip", "skip.go") },
        FunctionSpec { upx_option: Some(UpxOptions::new(["-1"])), ..FunctionSpec::new("a", "a.go") },
        FunctionSpec::new("b", "b.go"),
    ];

    let report = UpxCompressor::new(temp.path(), &config, &runner)
        .with_upx_bin("upx")
        .compress(&functions)
        .unwrap();

    assert_eq!(report.skipped, vec!["skip"]);
    assert_eq!(runner.command_lines(), vec!["upx -1 bin/a", "upx --best bin/b"]);
    assert_eq!(report.compressed[0].option, "-1");
}

#[test]
fn failures_do_not_stop_remaining_binaries() {
    let temp = tempdir().unwrap();
    write_binary(temp.path(), "bin/a", 10);
    write_binary(temp.path(), "bin/b", 10);
    let config = enabled();
    let runner = RecordingRunner::with_codes([1, 0]);
    let functions = vec![
        FunctionSpec::new("missing", "missing.go"),
        FunctionSpec::new("a", "a.go"),
        FunctionSpec::new("b", "b.go"),
    ];

    let err = UpxCompressor::new(temp.path(), &config, &runner)
        .with_upx_bin("upx")
        .compress(&functions)
        .unwrap_err();

    assert_eq!(err.to_string(), "UPX compressing failure");
    match err {
        GoBuildError::CompressFailure { binaries } => {
            assert_eq!(binaries, vec!["bin/missing", "bin/a"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // The missing binary never reaches the packer; a and b both do.
    assert_eq!(runner.command_lines(), vec!["upx bin/a", "upx bin/b"]);
}

#[test]
fn packer_that_cannot_spawn_fails_the_step() {
    let temp = tempdir().unwrap();
    write_binary(temp.path(), "bin/a", 10);
    let config = enabled();
    let err = UpxCompressor::new(temp.path(), &config, &MissingProgramRunner)
        .compress(&[FunctionSpec::new("a", "a.go")])
        .unwrap_err();
    assert!(matches!(err, GoBuildError::CompressFailure { .. }));
}

#[test]
fn reduction_of_empty_binary_is_zero() {
    let stats = CompressionStats {
        binary: "bin/a".into(),
        option: "standard".into(),
        size_before: 0,
        size_after: 0,
    };
    assert_eq!(stats.reduction_percent(), 0.0);
}

#[test]
fn mapping_options_are_reported_by_key_name() {
    let temp = tempdir().unwrap();
    write_binary(temp.path(), "bin/a", 10);
    let options: UpxOptions = serde_yaml::from_str("{ best: true }").unwrap();
    let config = GoBuildConfig { upx_option: options, ..enabled() };
    let runner = RecordingRunner::new();

    let report = UpxCompressor::new(temp.path(), &config, &runner)
        .with_upx_bin("upx")
        .compress(&[FunctionSpec::new("a", "a.go")])
        .unwrap();

    assert_eq!(runner.command_lines(), vec!["upx --best bin/a"]);
    assert!(report.compressed[0].summary().starts_with("[best] bin/a"));
}
