use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use sha2::{Digest, Sha256};

/// Parses a SHASUMS256.txt document: one `<hex-digest>  <filename>` row per
/// line, with an optional `*` binary-mode marker on the filename.
pub fn parse_shasums(text: &str) -> BTreeMap<String, String> {
    let mut digests = BTreeMap::new();
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let (Some(digest), Some(name)) = (parts.next(), parts.next()) else {
            continue;
        };
        digests.insert(
            name.trim_start_matches('*').to_string(),
            digest.to_ascii_lowercase(),
        );
    }
    digests
}

pub fn verify_file_sha256(path: &Path, expected_hex: &str) -> Result<()> {
    let bytes =
        fs::read(path).with_context(|| format!("failed reading artifact: {}", path.display()))?;
    let actual = hex::encode(Sha256::digest(&bytes));
    if !actual.eq_ignore_ascii_case(expected_hex.trim()) {
        return Err(anyhow!(
            "checksum mismatch for {}: expected {}, got {}",
            path.display(),
            expected_hex.trim(),
            actual
        ));
    }
    Ok(())
}
