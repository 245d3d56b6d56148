mod client;
mod index;
mod metadata;
mod shasums;

pub use client::{
    DistClient, DEFAULT_APP_METADATA_URL, DEFAULT_DIST_BASE_URL, DEFAULT_RELEASE_INDEX_URL,
};
pub use index::{LtsField, RuntimeRelease};
pub use metadata::{AppEngines, AppMetadata};
pub use shasums::{parse_shasums, verify_file_sha256};
