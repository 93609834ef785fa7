//! Batch command driver.
//!
//! Reads scripts written in the calculator's command vocabulary and plays
//! them against a daemon, one fresh session per script:
//!
//! ```text
//! pushValue 5
//! pushValue 3
//! pushOperation lcm
//! pop
//! isEmpty
//! delayPop 200
//! exit
//! ```

use crate::calc_daemon::rpc_client::CalcClient;
use crate::rpc::SessionId;
use anyhow::{bail, Context, Result};

/// One parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PushValue(i64),
    PushOperation(String),
    Pop,
    IsEmpty,
    DelayPop(i64),
}

/// Parses a whole script.
///
/// Blank lines are skipped and `exit` ends the script; anything after it is
/// ignored. The operator of `pushOperation` is passed through as-is so the
/// daemon gets to reject unknown ones.
pub fn parse_script(source: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            continue;
        };
        let arg = words.next();
        if let Some(extra) = words.next() {
            bail!("line {}: unexpected argument '{}'", index + 1, extra);
        }

        let command = match (name, arg) {
            ("exit", None) => break,
            ("pop", None) => Command::Pop,
            ("isEmpty", None) => Command::IsEmpty,
            ("pushValue", Some(value)) => Command::PushValue(parse_int(value, index)?),
            ("delayPop", Some(millis)) => Command::DelayPop(parse_int(millis, index)?),
            ("pushOperation", Some(op)) => Command::PushOperation(op.to_string()),
            ("pushValue" | "delayPop" | "pushOperation", None) => {
                bail!("line {}: '{}' needs an argument", index + 1, name)
            }
            ("exit" | "pop" | "isEmpty", Some(extra)) => {
                bail!("line {}: unexpected argument '{}'", index + 1, extra)
            }
            (other, _) => bail!("line {}: unknown command '{}'", index + 1, other),
        };
        commands.push(command);
    }

    Ok(commands)
}

fn parse_int(text: &str, index: usize) -> Result<i64> {
    text.parse()
        .with_context(|| format!("line {}: '{}' is not an integer", index + 1, text))
}

/// Output of one script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReport {
    pub session_id: SessionId,
    /// One line per `pop`, `delayPop` and `isEmpty`, plus one per failed call
    pub lines: Vec<String>,
}

/// Runs `commands` against a fresh session.
///
/// A failed call is recorded as an `Error: ...` line and the script carries
/// on with the next command.
pub async fn run_script(client: &CalcClient, commands: &[Command]) -> Result<ScriptReport> {
    let session_id = client
        .create_session()
        .await
        .context("Failed to create session")?;
    let mut lines = Vec::new();

    for command in commands {
        let output = match command {
            Command::PushValue(value) => client.push_value(&session_id, *value).await.map(|_| None),
            Command::PushOperation(op) => client.push_operation(&session_id, op).await.map(|_| None),
            Command::Pop => client.pop(&session_id).await.map(|v| Some(format_popped(v))),
            Command::IsEmpty => client.is_empty(&session_id).await.map(|b| Some(b.to_string())),
            Command::DelayPop(millis) => client
                .delay_pop(&session_id, *millis)
                .await
                .map(|v| Some(format_popped(v))),
        };

        match output {
            Ok(Some(line)) => lines.push(line),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(%session_id, ?command, error = %e, "script command failed");
                lines.push(format!("Error: {}", e));
            }
        }
    }

    Ok(ScriptReport { session_id, lines })
}

/// `null` stands for the empty-stack signal.
fn format_popped(value: Option<i64>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}

#[cfg(test)]
#[path = "tests/script_tests.rs"]
mod tests;
