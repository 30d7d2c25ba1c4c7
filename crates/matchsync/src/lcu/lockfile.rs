//! League client lock file.
//!
//! While running, the client writes `name:pid:port:password:protocol` to a
//! lock file in its install directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::provider::{ProviderError, Result};

/// Lock file location of a default install.
pub fn default_lockfile_path() -> PathBuf {
    if cfg!(target_os = "windows") {
        PathBuf::from(r"C:\Riot Games\League of Legends\lockfile")
    } else {
        PathBuf::from("/Applications/League of Legends.app/Contents/LoL/lockfile")
    }
}

/// Credentials for the client's local API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockfileCredentials {
    pub process_name: String,
    pub pid: u32,
    pub port: u16,
    pub password: String,
    pub protocol: String,
}

impl LockfileCredentials {
    /// Parse lock file contents.
    pub fn parse(contents: &str) -> Result<Self> {
        let parts: Vec<&str> = contents.trim().split(':').collect();
        let [process_name, pid, port, password, protocol] = parts.as_slice() else {
            return Err(ProviderError::Lockfile(format!(
                "expected 5 ':'-separated fields, found {}",
                parts.len()
            )));
        };

        let pid = pid
            .parse()
            .map_err(|_| ProviderError::Lockfile(format!("invalid pid: {pid}")))?;
        let port = port
            .parse()
            .map_err(|_| ProviderError::Lockfile(format!("invalid port: {port}")))?;
        if password.is_empty() {
            return Err(ProviderError::Lockfile("empty password".to_string()));
        }

        Ok(Self {
            process_name: process_name.to_string(),
            pid,
            port,
            password: password.to_string(),
            protocol: protocol.to_string(),
        })
    }

    /// Read and parse the lock file at `path`.
    ///
    /// # Errors
    ///
    /// A missing file means the client is not running and is reported as such.
    pub fn read(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ProviderError::Lockfile(format!(
                "League client is not running (no lock file at {})",
                path.display()
            ))),
            Err(e) => Err(ProviderError::Lockfile(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Base URL of the local API.
    pub fn base_url(&self) -> String {
        let scheme = if self.protocol.is_empty() {
            "https"
        } else {
            self.protocol.as_str()
        };
        format!("{scheme}://127.0.0.1:{}", self.port)
    }

    /// `Authorization` header value (`riot:<password>`, basic auth).
    pub fn authorization(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("riot:{}", self.password)))
    }
}
