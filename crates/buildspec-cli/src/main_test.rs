// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use buildspec::Error;
use rstest::{fixture, rstest};
use serde_json::json;
use tempfile::TempDir;

use super::*;

fn write_spec(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn flags(root: &Path) -> SpecFlags {
    SpecFlags {
        root: root.to_path_buf(),
        file: None,
        local: None,
        no_local: false,
        separator: buildspec::DEFAULT_SEPARATOR,
    }
}

#[fixture]
fn tmpdir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_spec(tmp.path(), BUILD_SPEC_FILENAME, r#"{"a": {"x": 1}}"#);
    write_spec(tmp.path(), BUILD_SPEC_LOCAL_FILENAME, r#"{"a": {"y": 2}}"#);
    tmp
}

fn opt(root: &Path, args: &[&str]) -> Opt {
    let root = root.to_string_lossy().to_string();
    let mut argv = vec!["buildspec", "--root", root.as_str()];
    argv.extend_from_slice(args);
    Opt::try_parse_from(argv).expect("arguments should parse")
}

#[rstest]
fn test_sources_default_to_root(tmpdir: TempDir) {
    let sources = flags(tmpdir.path()).sources();
    assert_eq!(
        sources,
        vec![
            LayerSource::required(tmpdir.path().join(BUILD_SPEC_FILENAME)),
            LayerSource::optional(tmpdir.path().join(BUILD_SPEC_LOCAL_FILENAME)),
        ]
    );
}

#[rstest]
fn test_file_replaces_base(tmpdir: TempDir) {
    let other = write_spec(tmpdir.path(), "other.spec", r#"{"b": true}"#);
    let flags = SpecFlags {
        file: Some(other.clone()),
        ..flags(tmpdir.path())
    };
    assert_eq!(flags.sources()[0], LayerSource::required(other));
}

#[rstest]
fn test_local_replaces_override(tmpdir: TempDir) {
    let local = tmpdir.path().join("mine.local");
    let flags = SpecFlags {
        local: Some(local.clone()),
        ..flags(tmpdir.path())
    };
    assert_eq!(flags.sources()[1], LayerSource::optional(local));
}

#[rstest]
fn test_no_local_drops_override(tmpdir: TempDir) {
    let flags = SpecFlags {
        local: Some(tmpdir.path().join("ignored.local")),
        no_local: true,
        ..flags(tmpdir.path())
    };
    assert_eq!(
        flags.sources(),
        vec![LayerSource::required(
            tmpdir.path().join(BUILD_SPEC_FILENAME)
        )]
    );
}

#[rstest]
#[tokio::test]
async fn test_load_stacks_both_files(tmpdir: TempDir) {
    let spec = flags(tmpdir.path()).load().await.expect("Should load");
    assert_eq!(spec.len(), 2);
    assert_eq!(spec.keys("a").unwrap(), vec!["x", "y"]);
}

#[rstest]
#[tokio::test]
async fn test_load_with_file_and_no_local(tmpdir: TempDir) {
    let other = write_spec(tmpdir.path(), "other.spec", r#"{"a": {"z": 3}}"#);
    let flags = SpecFlags {
        file: Some(other),
        no_local: true,
        ..flags(tmpdir.path())
    };
    let spec = flags.load().await.expect("Should load");
    assert_eq!(spec.len(), 1);
    assert_eq!(spec.keys("a").unwrap(), vec!["z"]);
}

#[rstest]
#[tokio::test]
async fn test_load_applies_separator() {
    let tmp = TempDir::new().unwrap();
    write_spec(
        tmp.path(),
        BUILD_SPEC_FILENAME,
        r#"{"files": {"platform.x": {"jobname": "platform"}}}"#,
    );
    let flags = SpecFlags {
        separator: '|',
        ..flags(tmp.path())
    };
    let spec = flags.load().await.expect("Should load");
    assert_eq!(spec.separator(), '|');
    assert_eq!(
        spec.get("files|platform.x|jobname").unwrap(),
        &json!("platform")
    );
}

#[rstest]
#[tokio::test]
async fn test_load_missing_base_fails() {
    let tmp = TempDir::new().unwrap();
    let result = flags(tmp.path()).load().await;
    assert!(matches!(result, Err(Error::LoadFailed { .. })));
}

#[rstest]
#[tokio::test]
async fn test_execute_load_failure_exit_code() {
    let tmp = TempDir::new().unwrap();
    let code = opt(tmp.path(), &["keys"]).execute().await.unwrap();
    assert_eq!(code, EXIT_LOAD_FAILED);
}

#[rstest]
#[tokio::test]
async fn test_execute_malformed_local_exit_code(tmpdir: TempDir) {
    write_spec(tmpdir.path(), BUILD_SPEC_LOCAL_FILENAME, "{not json");
    let code = opt(tmpdir.path(), &["get", "a.x"]).execute().await.unwrap();
    assert_eq!(code, EXIT_LOAD_FAILED);

    // Skipping the local file skips its parse error too.
    let code = opt(tmpdir.path(), &["--no-local", "get", "a.x"])
        .execute()
        .await
        .unwrap();
    assert_eq!(code, 0);
}

#[rstest]
#[tokio::test]
async fn test_execute_check_exit_codes(tmpdir: TempDir) {
    let code = opt(tmpdir.path(), &["check", "--json"])
        .execute()
        .await
        .unwrap();
    assert_eq!(code, 0);

    write_spec(
        tmpdir.path(),
        BUILD_SPEC_LOCAL_FILENAME,
        r#"{"platform-image": "master"}"#,
    );
    let code = opt(tmpdir.path(), &["check", "--json"])
        .execute()
        .await
        .unwrap();
    assert_eq!(code, 1);
}

#[rstest]
#[tokio::test]
async fn test_execute_keys_and_feature(tmpdir: TempDir) {
    write_spec(
        tmpdir.path(),
        BUILD_SPEC_LOCAL_FILENAME,
        r#"{"features": {"headnode-zfs": {"enabled": true}}}"#,
    );
    let code = opt(tmpdir.path(), &["keys"]).execute().await.unwrap();
    assert_eq!(code, 0);

    let code = opt(tmpdir.path(), &["feature", "headnode-zfs"])
        .execute()
        .await
        .unwrap();
    assert_eq!(code, 0);

    let result = opt(tmpdir.path(), &["feature", "nonexistent"]).execute().await;
    assert!(result.is_err());

    let result = opt(tmpdir.path(), &["feature"]).execute().await;
    assert!(result.is_err());
}
