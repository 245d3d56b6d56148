use nodemend_core::{has_prerelease_marker, ReleaseDescriptor};
use serde::Deserialize;

/// One entry of the runtime release index. The `lts` field is either `false`
/// or a codename string in the published document.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeRelease {
    pub version: String,
    #[serde(default)]
    pub lts: LtsField,
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LtsField {
    Flag(bool),
    Codename(String),
}

impl Default for LtsField {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl LtsField {
    pub fn is_lts(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Codename(_) => true,
        }
    }
}

impl RuntimeRelease {
    pub fn into_descriptor(self) -> ReleaseDescriptor {
        let prerelease = has_prerelease_marker(&self.version);
        ReleaseDescriptor {
            long_term_support: self.lts.is_lts(),
            artifacts: self.files.into_iter().collect(),
            prerelease,
            version: self.version,
        }
    }
}
