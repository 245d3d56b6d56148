use crate::config::ToolConfig;
use crate::release::{ReleaseDescriptor, WINDOWS_X64_MSI};
use crate::version::{has_prerelease_marker, parse_version};

use std::collections::BTreeSet;
use std::path::PathBuf;

#[test]
fn parse_version_strips_leading_v() {
    let version = parse_version("v18.20.0").expect("must parse");
    assert_eq!((version.major, version.minor, version.patch), (18, 20, 0));
}

#[test]
fn parse_version_pads_partial_versions() {
    let one = parse_version("18").expect("must parse");
    assert_eq!((one.major, one.minor, one.patch), (18, 0, 0));

    let two = parse_version("18.17").expect("must parse");
    assert_eq!((two.major, two.minor, two.patch), (18, 17, 0));
}

#[test]
fn parse_version_keeps_prerelease_suffix() {
    let version = parse_version("v21.0.0-rc1").expect("must parse");
    assert_eq!(version.pre.as_str(), "rc1");
}

#[test]
fn parse_version_pads_partial_with_prerelease_suffix() {
    let version = parse_version("22-nightly20240101").expect("must parse");
    assert_eq!((version.major, version.minor, version.patch), (22, 0, 0));
    assert_eq!(version.pre.as_str(), "nightly20240101");
}

#[test]
fn parse_version_rejects_garbage() {
    assert!(parse_version("not-a-version").is_err());
    assert!(parse_version("").is_err());
}

#[test]
fn prerelease_marker_detects_embedded_hyphen() {
    assert!(has_prerelease_marker("v21.0.0-rc1"));
    assert!(!has_prerelease_marker("v21.0.0"));
}

#[test]
fn prerelease_marker_ignores_version_prefix() {
    assert!(!has_prerelease_marker(" v18.20.0 "));
}

#[test]
fn release_descriptor_artifact_membership() {
    let release = ReleaseDescriptor {
        version: "v18.20.0".to_string(),
        long_term_support: true,
        artifacts: BTreeSet::from([WINDOWS_X64_MSI.to_string(), "win-x64-zip".to_string()]),
        prerelease: false,
    };
    assert!(release.has_artifact(WINDOWS_X64_MSI));
    assert!(!release.has_artifact("linux-x64"));
}

#[test]
fn config_parses_overrides() {
    let config = ToolConfig::from_toml_str(
        r#"
release_index_url = "https://mirror.test/dist/index.json"
data_dir = "C:\\n8n-data"
"#,
    )
    .expect("must parse");
    assert_eq!(
        config.release_index_url.as_deref(),
        Some("https://mirror.test/dist/index.json")
    );
    assert_eq!(config.data_dir, Some(PathBuf::from("C:\\n8n-data")));
    assert!(config.app_metadata_url.is_none());
}

#[test]
fn config_rejects_unknown_keys() {
    let err = ToolConfig::from_toml_str("unknown_key = true").expect_err("must reject");
    assert!(err.to_string().contains("config"));
}

#[test]
fn config_load_missing_file_yields_defaults() {
    let config =
        ToolConfig::load(std::path::Path::new("/definitely/missing/nodemend.toml"))
            .expect("must default");
    assert_eq!(config, ToolConfig::default());
}
