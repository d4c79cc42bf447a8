// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging bootstrap shared by the lens crates
//!
//! Usage:
//! - Set LENS_LOG=off (default) - no logs
//! - Set LENS_LOG=info - data source lifecycle (uploads, deletes, rehydration)
//! - Set LENS_LOG=debug - generated SQL, page slicing, store I/O
//! - Any other value is handed to env_logger as a filter string,
//!   e.g. LENS_LOG=lens=debug,filestore=info

use std::sync::Once;

/// Environment variable consulted by [`init_diagnostics`]
pub const LOG_ENV: &str = "LENS_LOG";

static INIT: Once = Once::new();

/// Initialize logging based on the LENS_LOG environment variable
///
/// This should be called once at application startup. It's safe to call
/// multiple times - subsequent calls will be ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let setting = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
        let filter = filter_for(&setting);

        // try_init: a test harness may already own the global logger
        let _ = env_logger::Builder::new()
            .parse_filters(&filter)
            .format_timestamp_millis()
            .target(env_logger::Target::Stderr)
            .try_init();
    });
}

/// Translate a LENS_LOG value into an env_logger filter string
fn filter_for(setting: &str) -> String {
    match setting.trim() {
        "" | "off" => "off".to_string(),
        level @ ("error" | "warn" | "info" | "debug" | "trace") => level.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        // Should not panic when called multiple times
        init_diagnostics();
        init_diagnostics();
        init_diagnostics();
    }

    #[test]
    fn test_filter_for_levels() {
        assert_eq!(filter_for("off"), "off");
        assert_eq!(filter_for(""), "off");
        assert_eq!(filter_for(" debug "), "debug");
        assert_eq!(filter_for("lens=debug,filestore=info"), "lens=debug,filestore=info");
    }
}
