use gobuild_core::config::GoBuildConfig;
use gobuild_core::model::{FunctionSpec, PackageRules, ServiceDescription};
use gobuild_core::services::deploy::rewrite_for_deployment;
use gobuild_core::services::selection::select_go_functions;

#[test]
fn handlers_point_at_built_binaries() {
    let config = GoBuildConfig::default();
    let functions =
        vec![FunctionSpec::new("a", "cmd/a.go"), FunctionSpec::new("greet", "handlers/greet.Hello")];

    let rewritten = rewrite_for_deployment(&functions, &config);

    assert_eq!(rewritten[0].handler.as_deref(), Some("bin/cmd/a"));
    assert_eq!(rewritten[1].handler.as_deref(), Some("bin/handlers/greet.Hello"));
    assert!(rewritten.iter().all(|f| f.package.is_none()));
    // Inputs are left untouched.
    assert_eq!(functions[0].handler.as_deref(), Some("cmd/a.go"));
}

#[test]
fn minimize_package_adds_rules_only_when_absent() {
    let config = GoBuildConfig { minimize_package: true, ..Default::default() };
    let own_rules = PackageRules { include: vec!["assets/**".into()], ..Default::default() };
    let functions = vec![
        FunctionSpec::new("plain", "cmd/plain.go"),
        FunctionSpec { package: Some(own_rules.clone()), ..FunctionSpec::new("own", "cmd/own.go") },
    ];

    let rewritten = rewrite_for_deployment(&functions, &config);

    let plain = rewritten[0].package.as_ref().unwrap();
    assert_eq!(plain.exclude, vec!["./**"]);
    assert_eq!(plain.include, vec!["./bin/cmd/plain"]);
    assert_eq!(rewritten[1].package.as_ref(), Some(&own_rules));
}

#[test]
fn functions_without_handler_are_left_alone() {
    let config = GoBuildConfig { minimize_package: true, ..Default::default() };
    let bare = FunctionSpec { name: "bare".into(), ..Default::default() };
    let rewritten = rewrite_for_deployment(&[bare.clone()], &config);
    assert_eq!(rewritten, vec![bare]);
}

#[test]
fn rewritten_functions_are_substituted_into_the_service_document() {
    let mut service = ServiceDescription::from_yaml_str(
        r#"
service: demo
provider:
  name: aws
  runtime: go1.x
functions:
  hello:
    handler: handlers/hello.go
    events:
      - http: { path: hello, method: get }
  web:
    handler: web.handler
    runtime: nodejs18.x
custom:
  go-build:
    minimizePackage: true
"#,
        "/srv/demo",
    )
    .unwrap();
    let config = service.go_build_config();
    let selected = select_go_functions(&service, &config, None);
    let rewritten = rewrite_for_deployment(&selected, &config);
    service.substitute_functions(rewritten).unwrap();

    assert_eq!(service.function("hello").unwrap().handler.as_deref(), Some("bin/handlers/hello"));
    assert_eq!(service.function("web").unwrap().handler.as_deref(), Some("web.handler"));

    let yaml = service.to_yaml_string().unwrap();
    let reparsed = ServiceDescription::from_yaml_str(&yaml, "/srv/demo").unwrap();
    let hello = reparsed.function("hello").unwrap();
    assert_eq!(hello.handler.as_deref(), Some("bin/handlers/hello"));
    assert_eq!(hello.package.as_ref().unwrap().include, vec!["./bin/handlers/hello"]);
    assert!(hello.extra.contains_key("events"));
    assert_eq!(reparsed.function_names(), vec!["hello", "web"]);
    assert!(yaml.contains("service: demo"));
}
