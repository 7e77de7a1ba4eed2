// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;

use super::*;

fn write_spec(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write spec file");
    path
}

#[rstest]
fn test_load_base_and_local() {
    let tmp = TempDir::new().unwrap();
    write_spec(tmp.path(), BUILD_SPEC_FILENAME, r#"{"a": {"x": 1, "y": 2}}"#);
    write_spec(
        tmp.path(),
        BUILD_SPEC_LOCAL_FILENAME,
        r#"{"a": {"y": 20, "z": 30}}"#,
    );

    let stack = load_build_specs(tmp.path()).expect("Should load build specs");

    assert_eq!(stack.len(), 2);
    assert_eq!(stack.get("a.x").unwrap(), &json!(1));
    assert_eq!(stack.get("a.y").unwrap(), &json!(20));
    assert_eq!(stack.get("a.z").unwrap(), &json!(30));
    assert_eq!(stack.keys("a").unwrap(), vec!["x", "y", "z"]);
}

#[rstest]
fn test_missing_optional_layer_is_skipped() {
    let tmp = TempDir::new().unwrap();
    write_spec(tmp.path(), BUILD_SPEC_FILENAME, r#"{"flag": false}"#);

    let stack = load_build_specs(tmp.path()).expect("Should load without local file");

    assert_eq!(stack.len(), 1);
    assert_eq!(
        stack.sources().collect::<Vec<_>>(),
        vec![tmp.path().join(BUILD_SPEC_FILENAME).as_path()]
    );
    assert_eq!(stack.get_optional("flag").unwrap(), Some(&json!(false)));
    assert_eq!(stack.get_optional("missing").unwrap(), None);
}

#[rstest]
fn test_missing_required_layer_fails() {
    let tmp = TempDir::new().unwrap();
    write_spec(tmp.path(), BUILD_SPEC_LOCAL_FILENAME, r#"{"a": 1}"#);

    match load_build_specs(tmp.path()) {
        Err(Error::LoadFailed { path, error }) => {
            assert_eq!(path, tmp.path().join(BUILD_SPEC_FILENAME));
            assert_eq!(error.kind(), ErrorKind::NotFound);
        }
        other => panic!("expected LoadFailed, got {other:?}"),
    }
}

#[rstest]
#[case(false)]
#[case(true)]
fn test_malformed_layer_fails(#[case] optional: bool) {
    let tmp = TempDir::new().unwrap();
    let base = write_spec(tmp.path(), "base.json", r#"{"a": 1}"#);
    let broken = write_spec(tmp.path(), "broken.json", r#"{"a": "#);

    let sources = vec![
        LayerSource::required(base),
        LayerSource {
            path: broken.clone(),
            optional,
        },
    ];

    match SpecStack::load(&sources) {
        Err(Error::ParseFailed { path, .. }) => assert_eq!(path, broken),
        other => panic!("expected ParseFailed, got {other:?}"),
    }
}

#[rstest]
fn test_unreadable_optional_layer_fails() {
    let tmp = TempDir::new().unwrap();
    let base = write_spec(tmp.path(), "base.json", r#"{"a": 1}"#);
    // A directory exists but cannot be read as a file.
    let dir = tmp.path().join("local.json");
    std::fs::create_dir(&dir).unwrap();

    let result = SpecStack::load(&[LayerSource::required(base), LayerSource::optional(&dir)]);
    assert!(
        matches!(result, Err(Error::LoadFailed { ref path, .. }) if *path == dir),
        "got {result:?}"
    );
}

#[rstest]
fn test_failure_stops_later_layers() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("missing.json");
    let broken = write_spec(tmp.path(), "broken.json", "not json");

    // The first failure is reported, not the later one.
    let result = SpecStack::load(&[
        LayerSource::required(&missing),
        LayerSource::required(&broken),
    ]);
    assert!(
        matches!(result, Err(Error::LoadFailed { ref path, .. }) if *path == missing),
        "got {result:?}"
    );
}

#[rstest]
fn test_later_sources_take_precedence() {
    let tmp = TempDir::new().unwrap();
    let one = write_spec(tmp.path(), "one.json", r#"{"v": 1, "only-one": true}"#);
    let two = write_spec(tmp.path(), "two.json", r#"{"v": 2}"#);
    let three = write_spec(tmp.path(), "three.json", r#"{"v": 3}"#);

    let stack = SpecStack::load(&[
        LayerSource::required(&one),
        LayerSource::optional(tmp.path().join("absent.json")),
        LayerSource::required(&two),
        LayerSource::required(&three),
    ])
    .expect("Should load stack");

    assert_eq!(stack.len(), 3);
    assert_eq!(
        stack.sources().collect::<Vec<_>>(),
        vec![three.as_path(), two.as_path(), one.as_path()]
    );
    assert_eq!(stack.get("v").unwrap(), &json!(3));
    assert_eq!(stack.get("only-one").unwrap(), &json!(true));
}

#[rstest]
fn test_load_single_build_spec() {
    let tmp = TempDir::new().unwrap();
    let path = write_spec(tmp.path(), "build.spec", r#"{"bits-branch": "master"}"#);
    // A local file next to it is not consulted.
    write_spec(tmp.path(), BUILD_SPEC_LOCAL_FILENAME, r#"{"bits-branch": "mine"}"#);

    let stack = load_build_spec(&path).expect("Should load build spec");
    assert_eq!(stack.len(), 1);
    assert_eq!(stack.get("bits-branch").unwrap(), &json!("master"));
}

#[rstest]
fn test_build_spec_sources() {
    let sources = build_spec_sources("/work/sdc-headnode");
    assert_eq!(
        sources,
        vec![
            LayerSource::required("/work/sdc-headnode/build.spec"),
            LayerSource::optional("/work/sdc-headnode/build.spec.local"),
        ]
    );
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_load_async_matches_sync() {
    let tmp = TempDir::new().unwrap();
    write_spec(tmp.path(), BUILD_SPEC_FILENAME, r#"{"a": {"x": 1, "y": 2}}"#);
    write_spec(
        tmp.path(),
        BUILD_SPEC_LOCAL_FILENAME,
        r#"{"a": {"y": 20, "z": 30}}"#,
    );
    let sources = build_spec_sources(tmp.path());

    let stack = SpecStack::load_async(&sources)
        .await
        .expect("Should load build specs");
    let sync = SpecStack::load(&sources).unwrap();

    assert_eq!(stack.layers(), sync.layers());
    assert_eq!(stack.get("a.y").unwrap(), &json!(20));
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_load_async_missing_required() {
    let tmp = TempDir::new().unwrap();
    let result = SpecStack::load_async(&build_spec_sources(tmp.path())).await;
    assert!(matches!(result, Err(Error::LoadFailed { .. })));
}
