/*!
 * Descriptor Table Configuration
 *
 * Capacity and console binding for new tables. Defaults come from
 * `core::limits`; `from_env` applies overrides:
 * - KERNEL_FD_CAPACITY: slots per table (default: 128)
 * - KERNEL_CONSOLE_PATH: device bound to descriptors 0-2 (default: con:)
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::core::limits::{CONSOLE_PATH, MAX_TABLE_CAPACITY, MIN_TABLE_CAPACITY, OPEN_MAX};
use crate::core::serde::pathbuf_string;
use crate::core::{FdError, FdResult};

pub const ENV_FD_CAPACITY: &str = "KERNEL_FD_CAPACITY";
pub const ENV_CONSOLE_PATH: &str = "KERNEL_CONSOLE_PATH";

/// Descriptor table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FdConfig {
    /// Number of slots in every table
    pub capacity: usize,
    /// Device opened for stdin, stdout and stderr
    #[serde(with = "pathbuf_string")]
    pub console_path: PathBuf,
}

impl Default for FdConfig {
    fn default() -> Self {
        Self {
            capacity: OPEN_MAX,
            console_path: PathBuf::from(CONSOLE_PATH),
        }
    }
}

impl FdConfig {
    /// Default configuration with a different capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Default configuration overridden from the environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_FD_CAPACITY) {
            match raw.trim().parse::<usize>() {
                Ok(capacity) => config.capacity = capacity,
                Err(e) => warn!(value = %raw, error = %e, "ignoring invalid {}", ENV_FD_CAPACITY),
            }
        }

        if let Some(path) = lookup(ENV_CONSOLE_PATH) {
            if path.is_empty() {
                warn!("ignoring empty {}", ENV_CONSOLE_PATH);
            } else {
                config.console_path = PathBuf::from(path);
            }
        }

        config
    }

    /// Check the configuration can produce a usable table
    pub fn validate(&self) -> FdResult<()> {
        if self.capacity < MIN_TABLE_CAPACITY {
            return Err(FdError::InvalidArgument(format!(
                "capacity {} cannot hold the {} standard descriptors",
                self.capacity, MIN_TABLE_CAPACITY
            )));
        }
        if self.capacity > MAX_TABLE_CAPACITY {
            return Err(FdError::InvalidArgument(format!(
                "capacity {} exceeds maximum {}",
                self.capacity, MAX_TABLE_CAPACITY
            )));
        }
        if self.console_path.as_os_str().is_empty() {
            return Err(FdError::InvalidArgument("console path is empty".into()));
        }
        Ok(())
    }
}
