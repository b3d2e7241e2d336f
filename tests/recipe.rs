// tests/recipe.rs

//! Recipe loading, option resolution and dependency lookup against real
//! directories.

mod common;

use common::{recipe, RecordingTool, FOCG_RECIPE};
use cookbook::recipe::kitchen::{
    emit, ChainProvider, DependencyResolver, EditableProvider, LocalCacheProvider, LookupContext,
};
use cookbook::recipe::{load_recipe, validate_recipe, BuildPolicy, OptionDomain, Requirement};
use cookbook::{BaseConfig, ErrorKind, Kitchen, KitchenConfig, OptionSet, OptionValue, Phase};
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

#[test]
fn test_override_resolves_over_defaults() {
    let mut options = OptionSet::new();
    options.declare("shared", OptionDomain::Boolean, false).unwrap();
    options.declare("build_tests", OptionDomain::Boolean, false).unwrap();

    let mut overrides = BTreeMap::new();
    overrides.insert("build_tests".to_string(), OptionValue::Bool(true));
    let resolved = options.resolve(&overrides).unwrap();

    let expected: BTreeMap<String, OptionValue> = [
        ("build_tests".to_string(), OptionValue::Bool(true)),
        ("shared".to_string(), OptionValue::Bool(false)),
    ]
    .into_iter()
    .collect();
    assert_eq!(resolved.values(), &expected);
}

#[test]
fn test_emit_for_forwarded_option() {
    let mut options = OptionSet::new();
    options.declare("build_tests", OptionDomain::Boolean, true).unwrap();
    options.forward("build_tests", "BUILD_tests").unwrap();
    let resolved = options.resolve(&BTreeMap::new()).unwrap();

    let config = emit::emit(&resolved, "conan_paths.cmake").unwrap();
    assert_eq!(
        config.text_lines(),
        vec![
            "include(\"${CMAKE_CURRENT_LIST_DIR}/conan_paths.cmake\")".to_string(),
            "set(BUILD_tests True)".to_string(),
        ]
    );
}

#[test]
fn test_load_recipe_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookbook.toml");
    fs::write(&path, FOCG_RECIPE).unwrap();

    let recipe = load_recipe(&path, &BaseConfig::default()).unwrap();
    assert_eq!(recipe.package.name, "focg");
    assert_eq!(recipe.requires.len(), 2);
    assert_eq!(recipe.build_requires.len(), 1);
    assert!(validate_recipe(&recipe).is_empty());

    let missing = load_recipe(&dir.path().join("nope.toml"), &BaseConfig::default());
    assert_eq!(missing.unwrap_err().kind(), ErrorKind::Io);
}

#[test]
fn test_malformed_recipe_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookbook.toml");
    fs::write(&path, "name = \"focg\"\nflavour = \"spicy\"\n").unwrap();

    let err = load_recipe(&path, &BaseConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn test_local_cache_layout() {
    let dir = tempfile::tempdir().unwrap();
    let cache = LocalCacheProvider::new(dir.path());
    let graphics = Requirement::parse("graphics/abc123@adnn/develop").unwrap();
    let math = Requirement::parse("math/def456@adnn/develop").unwrap();
    fs::create_dir_all(cache.artifact_dir(&graphics)).unwrap();
    fs::create_dir_all(cache.artifact_dir(&math)).unwrap();

    let settings = BTreeMap::new();
    let context = LookupContext {
        settings: &settings,
        build_policy: BuildPolicy::Never,
    };
    let resolved = DependencyResolver::new(&cache)
        .resolve(&[graphics.clone(), math.clone()], &context)
        .unwrap();

    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].requirement, graphics);
    assert_eq!(
        resolved[0].handle.location,
        dir.path().join("graphics/abc123/adnn/develop")
    );
    assert_eq!(resolved[1].requirement, math);
    assert_eq!(resolved[1].handle.provider, "local-cache");
}

#[test]
fn test_editable_checkout_shadows_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache_root = dir.path().join("cache");
    let checkout = dir.path().join("checkouts/math");
    fs::create_dir_all(&checkout).unwrap();

    let cache = LocalCacheProvider::new(&cache_root);
    for requirement in ["graphics/abc123@adnn/develop", "math/def456@adnn/develop"] {
        let requirement = Requirement::parse(requirement).unwrap();
        fs::create_dir_all(cache.artifact_dir(&requirement)).unwrap();
    }
    fs::create_dir_all(cache_root.join("ninja/1.11.1/_/_")).unwrap();

    let mut editables = EditableProvider::new();
    editables.insert("math", &checkout);
    let chain = ChainProvider::new()
        .with(Arc::new(editables))
        .with(Arc::new(cache));

    let mut config = KitchenConfig::for_source(dir.path());
    config.cache_root = cache_root.clone();
    let kitchen = Kitchen::new(config, Arc::new(chain), Arc::new(RecordingTool::new()));

    let result = kitchen
        .cook(&recipe(FOCG_RECIPE), &BTreeMap::new())
        .unwrap();
    assert_eq!(result.phases, Phase::ALL.to_vec());

    let providers: Vec<_> = result
        .dependencies
        .iter()
        .map(|d| (d.requirement.name.as_str(), d.handle.provider.as_str()))
        .collect();
    assert_eq!(
        providers,
        vec![
            ("graphics", "local-cache"),
            ("math", "editable"),
            ("ninja", "local-cache"),
        ]
    );
    assert_eq!(result.dependencies[1].handle.location, checkout);
}

#[test]
fn test_empty_cache_fails_configure() {
    let dir = tempfile::tempdir().unwrap();
    let config = KitchenConfig::for_source(dir.path());
    let kitchen = Kitchen::new(
        config,
        Arc::new(LocalCacheProvider::new(dir.path().join("cache"))),
        Arc::new(RecordingTool::new()),
    );

    let failure = kitchen
        .cook(&recipe(FOCG_RECIPE), &BTreeMap::new())
        .unwrap_err();
    assert_eq!(failure.phase, Phase::Configure);
    assert_eq!(failure.error.to_string(), "Unresolved dependency 'graphics'");
}

#[test]
fn test_requirement_cannot_escape_cache() {
    let file = cookbook::parse_recipe(
        "name = \"escape\"\nrequires = [\"../..@../..\"]\n",
    )
    .unwrap();
    let err = file.merge(&BaseConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
