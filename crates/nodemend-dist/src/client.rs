use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use nodemend_core::{ReleaseDescriptor, ToolConfig};
use reqwest::blocking::Client;

use crate::index::RuntimeRelease;
use crate::metadata::AppMetadata;
use crate::shasums::parse_shasums;

pub const DEFAULT_APP_METADATA_URL: &str = "https://registry.npmjs.org/n8n/latest";
pub const DEFAULT_RELEASE_INDEX_URL: &str = "https://nodejs.org/dist/index.json";
pub const DEFAULT_DIST_BASE_URL: &str = "https://nodejs.org/dist";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for the application registry and the runtime distribution
/// site. Every failure is fatal to the caller and names the URL involved;
/// there is no retry here.
#[derive(Debug)]
pub struct DistClient {
    http: Client,
    app_metadata_url: String,
    release_index_url: String,
    dist_base_url: String,
}

impl DistClient {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("nodemend/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            app_metadata_url: config
                .app_metadata_url
                .clone()
                .unwrap_or_else(|| DEFAULT_APP_METADATA_URL.to_string()),
            release_index_url: config
                .release_index_url
                .clone()
                .unwrap_or_else(|| DEFAULT_RELEASE_INDEX_URL.to_string()),
            dist_base_url: config
                .dist_base_url
                .clone()
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_DIST_BASE_URL.to_string()),
        })
    }

    pub fn fetch_app_metadata(&self) -> Result<AppMetadata> {
        let body = self.get_text(&self.app_metadata_url)?;
        serde_json::from_str(&body).with_context(|| {
            format!("malformed application metadata: {}", self.app_metadata_url)
        })
    }

    pub fn fetch_release_index(&self) -> Result<Vec<ReleaseDescriptor>> {
        let body = self.get_text(&self.release_index_url)?;
        let releases: Vec<RuntimeRelease> = serde_json::from_str(&body)
            .with_context(|| format!("malformed release index: {}", self.release_index_url))?;
        Ok(releases
            .into_iter()
            .map(RuntimeRelease::into_descriptor)
            .collect())
    }

    pub fn fetch_shasums(&self, version: &str) -> Result<BTreeMap<String, String>> {
        let url = self.shasums_url(version);
        Ok(parse_shasums(&self.get_text(&url)?))
    }

    pub fn installer_file_name(version: &str) -> String {
        format!("node-v{version}-x64.msi")
    }

    pub fn installer_url(&self, version: &str) -> String {
        format!(
            "{}/v{version}/{}",
            self.dist_base_url,
            Self::installer_file_name(version)
        )
    }

    pub fn shasums_url(&self, version: &str) -> String {
        format!("{}/v{version}/SHASUMS256.txt", self.dist_base_url)
    }

    pub fn download_installer<OnProgress>(
        &self,
        version: &str,
        dest: &Path,
        mut on_progress: OnProgress,
    ) -> Result<()>
    where
        OnProgress: FnMut(u64, Option<u64>),
    {
        let url = self.installer_url(version);
        let mut response = self
            .http
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("request failed: {url}"))?;
        let total = response.content_length();

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create download dir: {}", parent.display()))?;
        }
        let mut file = fs::File::create(dest)
            .with_context(|| format!("failed to create download file: {}", dest.display()))?;

        let mut buffer = [0_u8; 64 * 1024];
        let mut downloaded = 0_u64;
        loop {
            let read = response
                .read(&mut buffer)
                .with_context(|| format!("failed reading response body: {url}"))?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])
                .with_context(|| format!("failed writing download file: {}", dest.display()))?;
            downloaded += read as u64;
            on_progress(downloaded, total);
        }
        Ok(())
    }

    fn get_text(&self, url: &str) -> Result<String> {
        self.http
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("request failed: {url}"))?
            .text()
            .with_context(|| format!("failed reading response body: {url}"))
    }
}
