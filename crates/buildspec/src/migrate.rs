// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Detection of build spec keys that are no longer supported.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{KeyPath, SpecStack};

#[cfg(test)]
#[path = "./migrate_test.rs"]
mod migrate_test;

/// Keys replaced by entries under `files`.
const OLD_BRANCH_KEYS: &[(&str, &str)] = &[
    ("agents-shar", r#""files.agents.*" and "files.agents_md5.*""#),
    ("ipxe-release", r#""files.ipxe.*""#),
    ("platform-image", r#""files.platform.*""#),
    ("platform-release", r#""files.platform.*""#),
    ("sdcadm-release", r#""files.sdcadm.*""#),
];

/// Keys replaced by entries under `features`.
const OLD_FEATURE_KEYS: &[(&str, &str)] = &[(
    "debug-platform",
    r#""features.debug-platform.*" or $DEBUG_BUILD"#,
)];

/// Zones that used to be configured with a `<zone>-image` key.
const OLD_IMAGE_ZONES: &[&str] = &[
    "adminui", "amon", "amonredis", "assets", "binder", "ca", "cloudapi", "cnapi", "dhcpd",
    "fwapi", "imgapi", "mahi", "manatee", "moray", "napi", "papi", "rabbitmq", "redis", "sapi",
    "sdc", "ufds", "vmapi", "workflow",
];

const DEFAULT_IMGAPI_URL: &str = "https://updates.joyent.com";

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("valid uuid regex")
});

/// What kind of outdated configuration a [`Finding`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    /// Branch and release keys now described under `files`.
    OldBranchKeys,
    /// Feature toggles now described under `features`.
    OldFeatureKeys,
    /// The `datasets` key.
    Datasets,
    /// `<zone>-image` keys whose value matches what is now the default.
    ImageKeysAtDefault,
    /// `<zone>-image` keys naming a local image file.
    ImageKeysLocalFile,
    /// `<zone>-image` keys naming an image UUID.
    ImageKeysUuid,
    /// `<zone>-image` keys that must be converted by hand.
    ImageKeysManual,
}

/// One group of outdated keys and how to fix them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub keys: Vec<String>,
    pub message: String,
}

/// Check a stack for keys that are no longer supported.
///
/// An empty result means the configuration is current.
pub fn check_migrations(spec: &SpecStack) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(check_renamed_keys(
        spec,
        OLD_BRANCH_KEYS,
        FindingKind::OldBranchKeys,
        "The following keys are no longer supported, and must be converted to the new style as described in the documentation:",
        "becomes",
    ));
    findings.extend(check_renamed_keys(
        spec,
        OLD_FEATURE_KEYS,
        FindingKind::OldFeatureKeys,
        "The following keys are no longer supported, and must be converted to \"features\" as described in the documentation:",
        "is either",
    ));
    findings.extend(check_datasets(spec));
    findings.extend(check_old_image_keys(spec));
    findings
}

/// A key counts as set when it is present and not `null`, `false`, `0` or `""`.
fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

fn top_level<'a>(spec: &'a SpecStack, key: &str) -> Option<&'a Value> {
    spec.resolve(&KeyPath::from_segments([key]))
        .map(|resolved| resolved.value)
}

fn check_renamed_keys(
    spec: &SpecStack,
    renames: &[(&str, &str)],
    kind: FindingKind,
    intro: &str,
    verb: &str,
) -> Option<Finding> {
    let (keys, lines): (Vec<String>, Vec<String>) = renames
        .iter()
        .filter(|(old, _)| is_set(top_level(spec, old)))
        .map(|(old, new)| (old.to_string(), format!("  - \"{old}\" {verb} {new}")))
        .unzip();

    if keys.is_empty() {
        return None;
    }
    Some(Finding {
        kind,
        keys,
        message: format!("{intro}\n\n{}\n", lines.join("\n")),
    })
}

fn check_datasets(spec: &SpecStack) -> Option<Finding> {
    if !is_set(top_level(spec, "datasets")) {
        return None;
    }
    Some(Finding {
        kind: FindingKind::Datasets,
        keys: vec!["datasets".to_string()],
        message: "The \"datasets\" key in \"build.spec\" is no longer supported. Please see the documentation for the new \"image\" key.".to_string(),
    })
}

/// Name of the build job producing a zone's image.
fn job_name(zone: &str) -> &str {
    match zone {
        "manatee" => "sdc-manatee",
        "manta" => "manta-deployment",
        other => other,
    }
}

fn check_old_image_keys(spec: &SpecStack) -> Vec<Finding> {
    let mut at_default = Vec::new();
    let mut local_files = Vec::new();
    let mut uuids = Vec::new();
    let mut manual = Vec::new();

    for zone in OLD_IMAGE_ZONES {
        let value = top_level(spec, &format!("{zone}-image"));
        if !is_set(value) {
            continue;
        }
        let Some(Value::String(value)) = value else {
            manual.push(zone.to_string());
            continue;
        };

        let job = job_name(zone);
        if Path::new(value).is_file() {
            local_files.push((zone.to_string(), value.clone()));
        } else if UUID_RE.is_match(value) {
            uuids.push((zone.to_string(), value.clone()));
        } else if *value == format!("{job}/{job}-zfs-.*manifest") {
            at_default.push(zone.to_string());
        } else {
            manual.push(zone.to_string());
        }
    }

    let mut findings = Vec::new();

    if !at_default.is_empty() {
        findings.push(Finding {
            kind: FindingKind::ImageKeysAtDefault,
            message: format!(
                "The following keys are no longer supported, but your configuration matches the new defaults. These keys should be removed:\n\n{}\n",
                bullet_list(&at_default)
            ),
            keys: at_default,
        });
    }

    if !local_files.is_empty() {
        let zones = local_files
            .iter()
            .map(|(zone, file)| (zone.clone(), json!({"source": "file", "file": file})));
        findings.push(replacement_finding(
            FindingKind::ImageKeysLocalFile,
            "They specify local files to use directly instead of downloading from Manta.",
            zones.collect(),
        ));
    }

    if !uuids.is_empty() {
        let zones = uuids.iter().map(|(zone, uuid)| {
            (
                zone.clone(),
                json!({"source": "imgapi", "imgapi": DEFAULT_IMGAPI_URL, "uuid": uuid}),
            )
        });
        findings.push(replacement_finding(
            FindingKind::ImageKeysUuid,
            "They specify image UUIDs to download from an IMGAPI server.",
            zones.collect(),
        ));
    }

    if !manual.is_empty() {
        let lines: Vec<String> = manual
            .iter()
            .map(|zone| format!("  * \"{zone}-image\" --> \"zones.{zone}\""))
            .collect();
        findings.push(Finding {
            kind: FindingKind::ImageKeysManual,
            message: format!(
                "The following keys are no longer supported, but your configuration could not be converted automatically. Please see the documentation for the new \"zones\" key. The affected keys and their new counterparts are listed below:\n\n{}\n",
                lines.join("\n")
            ),
            keys: manual,
        });
    }

    findings
}

fn bullet_list(zones: &[String]) -> String {
    zones
        .iter()
        .map(|zone| format!("  * \"{zone}-image\""))
        .collect::<Vec<_>>()
        .join("\n")
}

fn replacement_finding(kind: FindingKind, what: &str, zones: Vec<(String, Value)>) -> Finding {
    let keys: Vec<String> = zones.iter().map(|(zone, _)| zone.clone()).collect();
    let replacement = json!({ "zones": zones.into_iter().collect::<serde_json::Map<_, _>>() });
    Finding {
        kind,
        message: format!(
            "The following keys are no longer supported, but can be respecified in the new format. {what} First, remove these keys:\n\n{}\n\nNext, specify the same data in the new format:\n\n{}\n",
            bullet_list(&keys),
            render_indented(&replacement)
        ),
        keys,
    }
}

/// Pretty JSON with four space indentation, shifted right by four spaces.
fn render_indented(value: &Value) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut serializer).is_err() {
        return value.to_string();
    }
    String::from_utf8_lossy(&buf)
        .lines()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
