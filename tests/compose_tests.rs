//! Configuration composition integration tests
//!
//! Projects are laid out on disk and composed end to end: discovery,
//! environment, options, capabilities and the mode fragment together.

mod common;

use common::fixtures::ProjectFixture;
use common::vars;
use jm_cli::config::plugins::{
    CASE_SENSITIVE_PATHS, CIRCULAR_DEPENDENCY, CSS_EXTRACT, DLL_REFERENCE, DUPLICATE_PACKAGE_CHECK,
    HOT_MODULE_REPLACEMENT, HTML, LINT, TYPE_CHECK,
};
use jm_cli::config::{compose, BuildMode, Overrides, Target};
use jm_cli::context::InvocationContext;
use jm_cli::error::JmError;
use serde_json::json;

fn multi_page() -> common::fixtures::Project {
    ProjectFixture::new()
        .page("index", "tsx")
        .page("about", "ts")
        .page("admin", "jsx")
        .file("src/logo.png", "png")
        .build()
}

fn compose_ok(ctx: &InvocationContext, overrides: &Overrides) -> jm_cli::config::BundlerConfiguration {
    compose(ctx, overrides).unwrap()
}

#[test]
fn test_single_page_development_entry() {
    let project = ProjectFixture::new().page("index", "tsx").build();
    let ctx = project.context(BuildMode::Development);

    let config = compose_ok(&ctx, &Overrides::new(BuildMode::Development));

    let scripts = &config.entry["index"];
    assert_eq!(scripts.last().map(String::as_str), Some("./index.tsx"));
    assert_eq!(config.entry.len(), 1);
    assert_eq!(config.mode, BuildMode::Development);
    assert_eq!(config.output.public_path.as_deref(), Some("/"));
    assert!(config.plugin(HOT_MODULE_REPLACEMENT).is_some());
    assert!(config.plugin(CASE_SENSITIVE_PATHS).is_some());
}

#[test]
fn test_named_group_prefixes_every_output() {
    let project = multi_page();

    for mode in [BuildMode::Development, BuildMode::Production] {
        let ctx = project.context(mode);
        let named = compose_ok(
            &ctx,
            &Overrides::new(mode).named("admin").with_entry(vec!["admin".to_string()]),
        );
        let unnamed = compose_ok(&ctx, &Overrides::new(mode));

        let named_outputs = named.output_filenames();
        assert!(!named_outputs.is_empty());
        for filename in &named_outputs {
            let basename = filename.rsplit('/').next().unwrap_or(filename);
            assert!(basename.starts_with("admin_"), "{} in {}", filename, mode);
        }
        for filename in unnamed.output_filenames() {
            assert!(!filename.contains("admin_"), "{} in {}", filename, mode);
        }
        assert_eq!(named.name.as_deref(), Some("admin"));
    }
}

#[test]
fn test_content_hash_only_in_production() {
    let project = multi_page();

    let prod = compose_ok(
        &project.context(BuildMode::Production),
        &Overrides::new(BuildMode::Production),
    );
    let dev = compose_ok(
        &project.context(BuildMode::Development),
        &Overrides::new(BuildMode::Development),
    );

    for filename in prod.asset_filenames() {
        assert!(filename.contains("[contenthash"), "{}", filename);
    }
    for filename in dev.asset_filenames() {
        assert!(!filename.contains("hash"), "{}", filename);
    }
    assert!(prod.plugin(CSS_EXTRACT).is_some());
}

#[test]
fn test_composition_is_deterministic() {
    let project = multi_page();
    let ctx = project.context(BuildMode::Production);
    let overrides = Overrides::new(BuildMode::Production).named("client");

    let first = compose_ok(&ctx, &overrides);
    let second = compose_ok(&ctx, &overrides);

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[test]
fn test_production_output_and_html_pages() {
    let project = multi_page();
    let ctx = project.context(BuildMode::Production);

    let config = compose_ok(&ctx, &Overrides::new(BuildMode::Production));

    assert!(config.bail);
    assert_eq!(config.output.public_path.as_deref(), Some("./"));
    assert_eq!(config.output.path, project.root().join("dist"));
    assert_eq!(
        config.html_filenames(),
        ["about.html", "admin.html", "index.html"]
    );
    let html = config
        .plugins
        .iter()
        .filter(|p| p.name == HTML)
        .find(|p| p.options["filename"] == "about.html")
        .unwrap();
    let chunks = html.options["chunks"].as_array().unwrap();
    assert!(chunks.contains(&json!("about")));
}

#[test]
fn test_diagnostic_plugins_only_in_production() {
    let project = multi_page();

    let prod = compose_ok(
        &project.context(BuildMode::Production),
        &Overrides::new(BuildMode::Production),
    );
    let dev = compose_ok(
        &project.context(BuildMode::Development),
        &Overrides::new(BuildMode::Development),
    );

    assert!(prod.plugin(DUPLICATE_PACKAGE_CHECK).is_some());
    assert!(prod.plugin(CIRCULAR_DEPENDENCY).is_some());
    assert!(dev.plugin(DUPLICATE_PACKAGE_CHECK).is_none());
    assert!(dev.plugin(CIRCULAR_DEPENDENCY).is_none());
}

#[test]
fn test_type_check_and_lint_follow_capabilities() {
    let bare = ProjectFixture::new().page("index", "tsx").build();
    let config = compose_ok(
        &bare.context(BuildMode::Development),
        &Overrides::new(BuildMode::Development),
    );
    assert!(config.plugin(TYPE_CHECK).is_none());
    assert!(config.plugin(LINT).is_none());

    let tooled = ProjectFixture::new()
        .page("index", "tsx")
        .file("tsconfig.json", "{}")
        .file(".eslintrc.json", "{}")
        .build();
    let config = compose_ok(
        &tooled.context(BuildMode::Development),
        &Overrides::new(BuildMode::Development),
    );
    assert!(config.plugin(TYPE_CHECK).is_some());
    assert!(config.plugin(LINT).is_some());

    let unsafe_ctx = tooled.context_with(
        BuildMode::Development,
        &vars(&[("UNSAFE_DISABLE_TSLINT", "true")]),
    );
    let config = compose_ok(&unsafe_ctx, &Overrides::new(BuildMode::Development));
    assert!(config.plugin(TYPE_CHECK).is_some());
    assert!(config.plugin(LINT).is_none());

    let opted_out = ProjectFixture::new()
        .page("index", "tsx")
        .file("tsconfig.json", "{}")
        .jm(json!({"enableTypeCheck": false}))
        .build();
    let config = compose_ok(
        &opted_out.context(BuildMode::Development),
        &Overrides::new(BuildMode::Development),
    );
    assert!(config.plugin(TYPE_CHECK).is_none());
}

#[test]
fn test_dll_reference_requires_built_dll() {
    let project = multi_page();
    let overrides = Overrides::new(BuildMode::Development);

    let before = compose_ok(&project.context(BuildMode::Development), &overrides);
    assert!(before.plugin(DLL_REFERENCE).is_none());

    project.write("node_modules/.cache/jm/dll.hash", "abc");
    let after = compose_ok(&project.context(BuildMode::Development), &overrides);
    assert!(after.plugin(DLL_REFERENCE).is_some());

    let disabled = project.context_with(BuildMode::Development, &vars(&[("DISABLE_DLL", "true")]));
    assert!(compose_ok(&disabled, &overrides).plugin(DLL_REFERENCE).is_none());
}

#[test]
fn test_user_alias_and_source_alias() {
    let project = ProjectFixture::new()
        .page("index", "tsx")
        .jm(json!({"alias": {"@components": "./src/components"}}))
        .build();

    let config = compose_ok(
        &project.context(BuildMode::Production),
        &Overrides::new(BuildMode::Production),
    );

    assert_eq!(config.resolve.alias["@components"], "./src/components");
    assert!(config.resolve.alias.contains_key("~"));
}

#[test]
fn test_electron_renderer_target() {
    let project = ProjectFixture::new()
        .page("index", "tsx")
        .jm(json!({"electron": true}))
        .build();

    let config = compose_ok(
        &project.context(BuildMode::Development),
        &Overrides::new(BuildMode::Development),
    );
    assert_eq!(config.target, Target::ElectronRenderer);
}

#[test]
fn test_unknown_entry_fails_composition() {
    let project = multi_page();
    let ctx = project.context(BuildMode::Production);

    let err = compose(
        &ctx,
        &Overrides::new(BuildMode::Production).with_entry(vec!["missing".to_string()]),
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<JmError>(),
        Some(JmError::EntryNotFound { missing, .. }) if missing == &["missing"]
    ));
}

#[test]
fn test_invalid_options_fail_to_load() {
    let project = ProjectFixture::new()
        .page("index", "tsx")
        .jm(json!({"electorn": true, "ie8": "yes"}))
        .build();

    let err = InvocationContext::load_with(
        project.root(),
        BuildMode::Development,
        &Default::default(),
        &jm_cli::infra::RealFileSystem,
    )
    .unwrap_err();

    match err.downcast_ref::<JmError>() {
        Some(JmError::ConfigurationValidation { errors }) => {
            let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
            assert!(paths.contains(&"/electorn"), "{:?}", paths);
            assert!(paths.contains(&"/ie8"), "{:?}", paths);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
