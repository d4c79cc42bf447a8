// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use lens::{AppState, Lens, LensConfig, RehydrateReport};
use log::debug;
use std::path::PathBuf;

/// What every command needs to open the lens home
#[derive(Debug, Clone, Default)]
pub struct LensContext {
    /// `--home`, overriding `LENS_HOME`
    pub home: Option<PathBuf>,
    /// Skip installing the SQLite extension (no attachments)
    pub offline: bool,
}

impl LensContext {
    pub fn config(&self) -> Result<LensConfig> {
        let mut config = LensConfig::from_env(self.home.clone())?;
        config.load_sqlite_extension = !self.offline;
        Ok(config)
    }

    /// Open the engine and store, replay stored files and reconcile the
    /// saved state with what came back
    pub async fn open_session(&self) -> Result<Session> {
        let config = self.config()?;
        tokio::fs::create_dir_all(&config.home).await?;
        debug!("Opening lens home {}", config.home.display());

        let lens = Lens::open(&config).await?;
        let mut state = AppState::load(&config.state_path()).await;
        let report = lens.rehydrate_all().await;
        state.reconcile(&report);

        Ok(Session {
            config,
            lens,
            state,
            report,
        })
    }
}

/// One command invocation's view of the lens home
pub struct Session {
    pub config: LensConfig,
    pub lens: Lens,
    pub state: AppState,
    pub report: RehydrateReport,
}

impl Session {
    pub async fn save_state(&self) -> Result<()> {
        self.state.save(&self.config.state_path()).await?;
        Ok(())
    }
}

/// Human-readable size
#[must_use]
pub fn format_file_size(size: usize) -> String {
    if size >= 1024 * 1024 {
        format!("{:.1}MB", size as f64 / (1024.0 * 1024.0))
    } else if size >= 1024 {
        format!("{:.1}KB", size as f64 / 1024.0)
    } else {
        format!("{size}B")
    }
}

/// Local time of a millisecond timestamp
#[must_use]
pub fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis).map_or_else(
        || millis.to_string(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}
