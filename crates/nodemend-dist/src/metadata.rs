use serde::Deserialize;

/// Latest-release document for the application, as served by its package
/// registry. Only the fields this tool consumes are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct AppMetadata {
    pub version: String,
    #[serde(default)]
    pub engines: AppEngines,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppEngines {
    #[serde(default)]
    pub node: Option<String>,
}

impl AppMetadata {
    /// The declared runtime constraint. A missing declaration yields an empty
    /// string, which parses downstream into a fully unbounded range.
    pub fn runtime_constraint(&self) -> &str {
        self.engines.node.as_deref().unwrap_or("")
    }
}
