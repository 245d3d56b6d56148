use anyhow::{Context, Result};
use semver::Version;

/// Parses a runtime version string as published in release indexes and by
/// `node --version`: an optional leading `v`, one to three dotted numeric
/// components, and an optional pre-release/build suffix.
pub fn parse_version(raw: &str) -> Result<Version> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let padded = pad_to_three_components(body);
    Version::parse(&padded).with_context(|| format!("invalid version string: '{raw}'"))
}

/// A hyphen in the version body marks a pre-release even when the index
/// carries no structured flag for it.
pub fn has_prerelease_marker(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
        .contains('-')
}

fn pad_to_three_components(body: &str) -> String {
    let (numeric, suffix) = match body.find(['-', '+']) {
        Some(index) => body.split_at(index),
        None => (body, ""),
    };
    match numeric.matches('.').count() {
        0 => format!("{numeric}.0.0{suffix}"),
        1 => format!("{numeric}.0{suffix}"),
        _ => body.to_string(),
    }
}
