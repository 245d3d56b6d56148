use std::collections::BTreeMap;

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathScope {
    Process,
    User,
    Machine,
}

impl PathScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::User => "user",
            Self::Machine => "machine",
        }
    }
}

/// Capability over the three PATH scopes. The persisted scopes are
/// machine-global mutable state with no locking; callers assume no concurrent
/// mutator during a run.
pub trait EnvironmentStore {
    fn path_entries(&self, scope: PathScope) -> Result<Vec<String>>;
    fn set_path_entries(&mut self, scope: PathScope, entries: &[String]) -> Result<()>;
}

/// In-memory store for tests and dry runs. Records every write so tests can
/// assert that an unchanged scope was never rewritten.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnvironmentStore {
    scopes: BTreeMap<PathScope, Vec<String>>,
    writes: Vec<PathScope>,
}

impl MemoryEnvironmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&mut self, scope: PathScope, entries: &[&str]) {
        self.scopes
            .insert(scope, entries.iter().map(|entry| entry.to_string()).collect());
    }

    pub fn write_count(&self, scope: PathScope) -> usize {
        self.writes.iter().filter(|written| **written == scope).count()
    }
}

impl EnvironmentStore for MemoryEnvironmentStore {
    fn path_entries(&self, scope: PathScope) -> Result<Vec<String>> {
        Ok(self.scopes.get(&scope).cloned().unwrap_or_default())
    }

    fn set_path_entries(&mut self, scope: PathScope, entries: &[String]) -> Result<()> {
        self.scopes.insert(scope, entries.to_vec());
        self.writes.push(scope);
        Ok(())
    }
}

/// The real store for this host, or an error where persisted PATH scopes are
/// not reachable (non-Windows hosts).
pub fn system_environment_store() -> Result<Box<dyn EnvironmentStore>> {
    #[cfg(windows)]
    {
        Ok(Box::new(RegistryEnvironmentStore))
    }

    #[cfg(not(windows))]
    {
        Err(anyhow::anyhow!(
            "persisted PATH repair requires the Windows registry; this host is unsupported"
        ))
    }
}

#[cfg(windows)]
pub use windows_store::RegistryEnvironmentStore;

#[cfg(windows)]
mod windows_store {
    use std::io;

    use anyhow::{Context, Result};
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_SET_VALUE};
    use winreg::RegKey;

    use super::{EnvironmentStore, PathScope};

    const USER_ENVIRONMENT_KEY: &str = "Environment";
    const MACHINE_ENVIRONMENT_KEY: &str =
        "SYSTEM\\CurrentControlSet\\Control\\Session Manager\\Environment";

    /// Persisted scopes live in the registry `Environment` keys; the process
    /// scope is this process's own PATH variable.
    #[derive(Debug, Clone, Copy)]
    pub struct RegistryEnvironmentStore;

    impl RegistryEnvironmentStore {
        fn scope_key(scope: PathScope, access: u32) -> Result<RegKey> {
            let (root, subkey) = match scope {
                PathScope::User => (RegKey::predef(HKEY_CURRENT_USER), USER_ENVIRONMENT_KEY),
                PathScope::Machine => {
                    (RegKey::predef(HKEY_LOCAL_MACHINE), MACHINE_ENVIRONMENT_KEY)
                }
                PathScope::Process => unreachable!("process scope does not use the registry"),
            };
            root.open_subkey_with_flags(subkey, access)
                .with_context(|| format!("failed to open {} environment key", scope.as_str()))
        }

        fn read_persisted_value(scope: PathScope) -> Result<String> {
            let key = Self::scope_key(scope, KEY_READ)?;
            match key.get_value::<String, _>("Path") {
                Ok(value) => Ok(value),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
                Err(err) => Err(err).with_context(|| {
                    format!("failed to read {} PATH value", scope.as_str())
                }),
            }
        }
    }

    impl EnvironmentStore for RegistryEnvironmentStore {
        fn path_entries(&self, scope: PathScope) -> Result<Vec<String>> {
            if scope == PathScope::Process {
                let Some(raw) = std::env::var_os("PATH") else {
                    return Ok(Vec::new());
                };
                return Ok(std::env::split_paths(&raw)
                    .map(|entry| entry.to_string_lossy().into_owned())
                    .filter(|entry| !entry.is_empty())
                    .collect());
            }

            Ok(Self::read_persisted_value(scope)?
                .split(';')
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect())
        }

        fn set_path_entries(&mut self, scope: PathScope, entries: &[String]) -> Result<()> {
            let joined = entries.join(";");
            if scope == PathScope::Process {
                std::env::set_var("PATH", &joined);
                return Ok(());
            }

            let key = Self::scope_key(scope, KEY_SET_VALUE)?;
            key.set_value("Path", &joined)
                .with_context(|| format!("failed to write {} PATH value", scope.as_str()))
        }
    }
}
