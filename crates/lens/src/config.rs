// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{LensError, Result};
use pager::{DEFAULT_PAGE_SIZE, DEFAULT_RESET_DELAY, PAGE_SIZES};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the lens home directory
pub const HOME_ENV: &str = "LENS_HOME";

const FILES_DIR: &str = "files";
const STATE_FILE: &str = "state.json";

#[derive(Debug, Clone)]
pub struct LensConfig {
    /// Root of everything persisted between sessions
    pub home: PathBuf,
    pub page_size: usize,
    pub reset_delay: Duration,
    pub load_sqlite_extension: bool,
}

impl LensConfig {
    #[must_use]
    pub fn new(home: PathBuf) -> Self {
        Self {
            home,
            page_size: DEFAULT_PAGE_SIZE,
            reset_delay: DEFAULT_RESET_DELAY,
            load_sqlite_extension: true,
        }
    }

    /// Use `override_home` if given, else `LENS_HOME`
    pub fn from_env(override_home: Option<PathBuf>) -> Result<Self> {
        if let Some(home) = override_home {
            return Ok(Self::new(home));
        }
        let home = env::var(HOME_ENV)
            .map_err(|_| LensError::Config(format!("{HOME_ENV} environment variable not set")))?;
        Ok(Self::new(PathBuf::from(home)))
    }

    pub fn with_page_size(mut self, page_size: usize) -> Result<Self> {
        if !PAGE_SIZES.contains(&page_size) {
            return Err(LensError::Config(format!(
                "page size {page_size} is not one of {PAGE_SIZES:?}"
            )));
        }
        self.page_size = page_size;
        Ok(self)
    }

    #[must_use]
    pub fn files_dir(&self) -> PathBuf {
        self.home.join(FILES_DIR)
    }

    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.home.join(STATE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_and_defaults() {
        let config = LensConfig::from_env(Some(PathBuf::from("/tmp/lens"))).unwrap();
        assert_eq!(config.files_dir(), PathBuf::from("/tmp/lens/files"));
        assert_eq!(config.state_path(), PathBuf::from("/tmp/lens/state.json"));
        assert_eq!(config.page_size, 50);
        assert_eq!(config.reset_delay, Duration::from_millis(150));
    }

    #[test]
    fn test_page_size_allow_list() {
        let config = LensConfig::new(PathBuf::from("/tmp/lens"));
        assert!(config.clone().with_page_size(25).is_ok());
        assert!(matches!(config.with_page_size(30), Err(LensError::Config(_))));
    }
}
