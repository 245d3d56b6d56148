use std::collections::BTreeSet;

/// Artifact identifier for the 64-bit Windows installer package in the
/// runtime release index.
pub const WINDOWS_X64_MSI: &str = "win-x64-msi";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    pub version: String,
    pub long_term_support: bool,
    pub artifacts: BTreeSet<String>,
    pub prerelease: bool,
}

impl ReleaseDescriptor {
    pub fn has_artifact(&self, name: &str) -> bool {
        self.artifacts.contains(name)
    }
}
