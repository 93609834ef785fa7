//! Debug log file for the calculator daemon.
//!
//! Lines look like `[12:04:33.517] [rpc_server] RPC server listening on ...`.
//! Write failures are ignored; the log is a debugging aid only.

use std::io::Write;
use std::path::{Path, PathBuf};

/// Where daemon lifecycle lines go.
///
/// The default target is `calcd.log` under the calculator home, resolved on
/// every write so a changed `STACK_CALC_HOME` is honoured. Servers started
/// by tests point it at their own file instead.
#[derive(Debug, Clone, Default)]
pub struct DaemonLog {
    path: Option<PathBuf>,
}

impl DaemonLog {
    /// Log to `calcd.log` under the calculator home.
    pub fn home() -> Self {
        Self::default()
    }

    /// Log to a fixed file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Appends one `[time] [tag] msg` line.
    pub fn log(&self, tag: &str, msg: &str) {
        match &self.path {
            Some(path) => append_line(path, tag, msg),
            None => {
                if let Ok(path) = crate::calc_paths::calcd_log_path() {
                    append_line(&path, tag, msg);
                }
            }
        }
    }
}

fn append_line(path: &Path, tag: &str, msg: &str) {
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    else {
        return;
    };
    let now = chrono::Local::now().format("%H:%M:%S%.3f");
    let _ = writeln!(file, "[{}] [{}] {}", now, tag, msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc_paths::CALC_HOME_ENV;

    #[test]
    fn test_fixed_target_appends_tagged_lines_in_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("server.log");
        let log = DaemonLog::at(&path);

        log.log("rpc_server", "first");
        log.log("rpc_server", "second");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("[rpc_server] first"));
        assert!(lines[1].ends_with("[rpc_server] second"));
    }

    #[test]
    fn test_unwritable_target_is_ignored() {
        let temp_dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending
        DaemonLog::at(temp_dir.path()).log("rpc_server", "dropped");
    }

    #[test]
    #[serial_test::serial]
    fn test_home_target_follows_calc_home() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::env::set_var(CALC_HOME_ENV, temp_dir.path());

        DaemonLog::home().log("rpc_server", "to home");

        let content = std::fs::read_to_string(temp_dir.path().join("calcd.log")).unwrap();
        assert!(content.contains("[rpc_server] to home"));

        std::env::remove_var(CALC_HOME_ENV);
    }
}
