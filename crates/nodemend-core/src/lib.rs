mod config;
mod release;
mod version;

pub use config::ToolConfig;
pub use release::{ReleaseDescriptor, WINDOWS_X64_MSI};
pub use version::{has_prerelease_marker, parse_version};

#[cfg(test)]
mod tests;
