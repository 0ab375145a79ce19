//! Service configuration (`slotbook.toml` plus environment overrides).
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [booking]
//! host_id = 1
//! conflict_policy = "include_rescheduled"
//! ```
//!
//! Environment variables override the file: `HOST`, `PORT`, `BOOKING_HOST_ID`
//! and `BOOKING_CONFLICT_POLICY`. `SLOTBOOK_CONFIG` points at an alternative file.
//! Repository selection lives in [`crate::db::RepositoryConfig`].

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{ConflictPolicy, HostId};

pub const DEFAULT_CONFIG_FILE: &str = "slotbook.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub booking: BookingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Booking behaviour shared by every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSettings {
    /// Host whose calendar this deployment serves.
    pub host_id: HostId,
    pub conflict_policy: ConflictPolicy,
}

impl ServiceConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// File named by `SLOTBOOK_CONFIG`, else `slotbook.toml` when present, else
    /// defaults; environment overrides applied last.
    pub fn load() -> Result<Self> {
        let base = match std::env::var("SLOTBOOK_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
        }
        if let Some(host_id) = lookup("BOOKING_HOST_ID") {
            self.booking.host_id = host_id
                .parse()
                .with_context(|| format!("BOOKING_HOST_ID must be an integer, got '{}'", host_id))?;
        }
        if let Some(policy) = lookup("BOOKING_CONFLICT_POLICY") {
            self.booking.conflict_policy = policy
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid BOOKING_CONFLICT_POLICY")?;
        }
        Ok(self)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
