use std::collections::BTreeSet;

use nodemend_core::{parse_version, ReleaseDescriptor, WINDOWS_X64_MSI};
use semver::Version;

use crate::constraint::{parse_constraint, Bound, VersionRange};
use crate::plan::{plan_install, resolve_install_decision};
use crate::select::select_release;

fn release(version: &str, lts: bool) -> ReleaseDescriptor {
    ReleaseDescriptor {
        version: version.to_string(),
        long_term_support: lts,
        artifacts: BTreeSet::from([
            WINDOWS_X64_MSI.to_string(),
            "win-x64-zip".to_string(),
            "linux-x64".to_string(),
        ]),
        prerelease: false,
    }
}

fn version(raw: &str) -> Version {
    parse_version(raw).expect("must parse")
}

fn bounded(lower: &str, upper: &str) -> VersionRange {
    parse_constraint(&format!(">={lower} <{upper}"))
}

#[test]
fn parses_inclusive_lower_exclusive_upper() {
    let range = parse_constraint(">=18.17.0 <21.0.0");
    assert_eq!(
        range.lower,
        Bound::Value {
            version: version("18.17.0"),
            inclusive: true,
        }
    );
    assert_eq!(
        range.upper,
        Bound::Value {
            version: version("21.0.0"),
            inclusive: false,
        }
    );
}

#[test]
fn parses_exclusive_lower_inclusive_upper() {
    let range = parse_constraint(">16 <=18.19");
    assert_eq!(
        range.lower,
        Bound::Value {
            version: version("16.0.0"),
            inclusive: false,
        }
    );
    assert_eq!(
        range.upper,
        Bound::Value {
            version: version("18.19.0"),
            inclusive: true,
        }
    );
}

#[test]
fn wildcard_upper_bound_normalizes_to_ninety_nine_ceiling() {
    let range = parse_constraint(">=16 <=18.x");
    assert_eq!(
        range.upper,
        Bound::Value {
            version: version("18.99.99"),
            inclusive: true,
        }
    );
}

#[test]
fn wildcard_ceiling_is_inclusive_even_for_strict_operator() {
    let range = parse_constraint("<18.x");
    assert_eq!(
        range.upper,
        Bound::Value {
            version: version("18.99.99"),
            inclusive: true,
        }
    );
}

#[test]
fn wildcard_on_minor_component_pads_patch_only() {
    let range = parse_constraint("<=18.2.x");
    assert_eq!(
        range.upper,
        Bound::Value {
            version: version("18.2.99"),
            inclusive: true,
        }
    );
}

#[test]
fn missing_upper_clause_is_unbounded() {
    let range = parse_constraint(">=18");
    assert_eq!(range.upper, Bound::Unbounded);
    assert!(range.contains(&version("999.0.0")));
}

#[test]
fn missing_lower_clause_is_unbounded() {
    let range = parse_constraint("<=20.x");
    assert_eq!(range.lower, Bound::Unbounded);
    assert!(range.contains(&version("0.1.0")));
}

#[test]
fn malformed_constraint_is_fully_unbounded() {
    let range = parse_constraint("latest stable please");
    assert_eq!(range, VersionRange::unbounded());
}

#[test]
fn malformed_bound_clause_falls_open() {
    // An operator with no parsable version behind it never rejects anything.
    let range = parse_constraint(">= <21");
    assert_eq!(range.lower, Bound::Unbounded);
    assert_ne!(range.upper, Bound::Unbounded);
}

#[test]
fn range_contains_respects_inclusivity() {
    let range = parse_constraint(">=18.17.0 <21.0.0");
    assert!(range.contains(&version("18.17.0")));
    assert!(range.contains(&version("20.99.0")));
    assert!(!range.contains(&version("21.0.0")));
    assert!(!range.contains(&version("18.16.9")));

    let strict = parse_constraint(">18.17.0 <=21.0.0");
    assert!(!strict.contains(&version("18.17.0")));
    assert!(strict.contains(&version("21.0.0")));
}

#[test]
fn selects_newest_lts_in_range_over_newer_non_lts() {
    let releases = vec![
        release("v17.9.1", false),
        release("v18.17.0", true),
        release("v18.20.0", true),
        release("v20.1.0", false),
    ];
    let range = bounded("16", "21");
    let chosen = select_release(&releases, &range, WINDOWS_X64_MSI).expect("must select");
    assert_eq!(chosen.version, "v18.20.0");
}

#[test]
fn falls_back_to_newest_non_lts_when_no_lts_in_range() {
    let releases = vec![
        release("v17.9.1", false),
        release("v18.17.0", true),
        release("v18.20.0", true),
        release("v20.1.0", false),
    ];
    let range = bounded("19", "21");
    let chosen = select_release(&releases, &range, WINDOWS_X64_MSI).expect("must select");
    assert_eq!(chosen.version, "v20.1.0");
}

#[test]
fn rejects_releases_missing_platform_artifact() {
    let mut windows_only = release("v18.20.0", true);
    let mut linux_only = release("v20.1.0", true);
    linux_only.artifacts = BTreeSet::from(["linux-x64".to_string()]);
    windows_only.artifacts = BTreeSet::from([WINDOWS_X64_MSI.to_string()]);

    let releases = vec![windows_only, linux_only];
    let range = bounded("16", "21");
    let chosen = select_release(&releases, &range, WINDOWS_X64_MSI).expect("must select");
    assert_eq!(chosen.version, "v18.20.0");
}

#[test]
fn rejects_prerelease_by_textual_marker_even_without_flag() {
    let releases = vec![release("v18.20.0", true), release("v21.0.0-rc1", true)];
    let range = parse_constraint(">=16");
    let chosen = select_release(&releases, &range, WINDOWS_X64_MSI).expect("must select");
    assert_eq!(chosen.version, "v18.20.0");
}

#[test]
fn rejects_prerelease_by_structured_flag() {
    let mut nightly = release("v22.0.0", false);
    nightly.prerelease = true;
    let releases = vec![release("v18.20.0", true), nightly];
    let range = parse_constraint(">=16");
    let chosen = select_release(&releases, &range, WINDOWS_X64_MSI).expect("must select");
    assert_eq!(chosen.version, "v18.20.0");
}

#[test]
fn skips_malformed_index_versions() {
    let releases = vec![release("not-even-close", true), release("v18.20.0", true)];
    let range = parse_constraint(">=16");
    let chosen = select_release(&releases, &range, WINDOWS_X64_MSI).expect("must select");
    assert_eq!(chosen.version, "v18.20.0");
}

#[test]
fn empty_survivor_set_yields_none() {
    let releases = vec![release("v14.0.0", true)];
    let range = bounded("16", "21");
    assert!(select_release(&releases, &range, WINDOWS_X64_MSI).is_none());
}

#[test]
fn unbounded_upper_never_rejects() {
    let releases = vec![release("v999.0.0", false)];
    let range = parse_constraint(">=1");
    let chosen = select_release(&releases, &range, WINDOWS_X64_MSI).expect("must select");
    assert_eq!(chosen.version, "v999.0.0");
}

#[test]
fn plan_skips_when_installed_matches_target_exactly() {
    let decision = plan_install(Some("v18.20.0"), &version("18.20.0"));
    assert!(!decision.action_required);
    assert_eq!(decision.target_version, "18.20.0");
}

#[test]
fn plan_requires_action_on_version_mismatch() {
    let decision = plan_install(Some("v18.19.0"), &version("18.20.0"));
    assert!(decision.action_required);
}

#[test]
fn plan_requires_action_when_runtime_absent() {
    let decision = plan_install(None, &version("18.20.0"));
    assert!(decision.action_required);
}

#[test]
fn plan_requires_action_when_installed_version_is_garbage() {
    let decision = plan_install(Some("mystery build"), &version("18.20.0"));
    assert!(decision.action_required);
}

#[test]
fn resolve_decision_end_to_end() {
    let releases = vec![
        release("v17.9.1", false),
        release("v18.17.0", true),
        release("v18.20.0", true),
        release("v20.1.0", false),
    ];
    let decision =
        resolve_install_decision(&releases, ">=16 <21", WINDOWS_X64_MSI, Some("v18.20.0"))
            .expect("must resolve");
    assert!(!decision.action_required);
    assert_eq!(decision.target_version, "18.20.0");
}

#[test]
fn resolve_decision_no_candidate_names_constraint_and_artifact() {
    let releases = vec![release("v14.0.0", true)];
    let err = resolve_install_decision(&releases, ">=16 <21", WINDOWS_X64_MSI, None)
        .expect_err("must fail");
    let message = err.to_string();
    assert!(message.contains(">=16 <21"), "unexpected error: {message}");
    assert!(message.contains(WINDOWS_X64_MSI), "unexpected error: {message}");
}
