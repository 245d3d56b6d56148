use nodemend_core::{has_prerelease_marker, parse_version, ReleaseDescriptor};
use semver::Version;

use crate::constraint::VersionRange;

/// Picks the newest installable release inside `range` that publishes the
/// required platform artifact, preferring long-term-support releases when any
/// survive the filter. Returns `None` when nothing qualifies; the caller
/// decides whether that is fatal.
pub fn select_release<'a>(
    releases: &'a [ReleaseDescriptor],
    range: &VersionRange,
    artifact: &str,
) -> Option<&'a ReleaseDescriptor> {
    let mut survivors: Vec<(&ReleaseDescriptor, Version)> = Vec::new();
    for release in releases {
        if release.prerelease || has_prerelease_marker(&release.version) {
            continue;
        }
        if !release.has_artifact(artifact) {
            continue;
        }
        // Malformed index entries are skipped, not fatal.
        let Ok(version) = parse_version(&release.version) else {
            continue;
        };
        if !range.contains(&version) {
            continue;
        }
        survivors.push((release, version));
    }

    let has_lts = survivors
        .iter()
        .any(|(release, _)| release.long_term_support);
    survivors
        .into_iter()
        .filter(|(release, _)| !has_lts || release.long_term_support)
        .max_by(|left, right| left.1.cmp(&right.1))
        .map(|(release, _)| release)
}
