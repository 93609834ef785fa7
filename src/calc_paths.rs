//! Home-based storage paths for the calculator daemon.
//!
//! Everything lives under `~/.stack-calc/` unless `STACK_CALC_HOME` points
//! somewhere else:
//! - `calcd.port` - Port file written by a running daemon
//! - `calcd.log` - Daemon debug log
//! - `config.yaml` - Optional configuration

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// The name of the calculator home directory.
const CALC_HOME_DIR: &str = ".stack-calc";

/// Environment variable overriding the calculator home directory.
pub const CALC_HOME_ENV: &str = "STACK_CALC_HOME";

/// Returns the calculator home directory.
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if:
/// - Home directory cannot be determined
/// - Directory creation fails
pub fn calc_home_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(CALC_HOME_ENV) {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => dirs::home_dir()
            .context("Could not determine home directory for calculator state")?
            .join(CALC_HOME_DIR),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create calculator home: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the daemon port file path: `~/.stack-calc/calcd.port`
pub fn calcd_port_path() -> Result<PathBuf> {
    Ok(calc_home_dir()?.join("calcd.port"))
}

/// Returns the daemon debug log path: `~/.stack-calc/calcd.log`
pub fn calcd_log_path() -> Result<PathBuf> {
    Ok(calc_home_dir()?.join("calcd.log"))
}

/// Returns the default config path: `~/.stack-calc/config.yaml`
pub fn config_path() -> Result<PathBuf> {
    Ok(calc_home_dir()?.join("config.yaml"))
}
