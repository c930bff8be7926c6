//! Running stored commands.

use crate::error::{CliError, CliResult};
use bm_core::Record;
use std::process::{Command, ExitCode};
use tracing::debug;

/// Shell used to interpret stored commands.
const SHELL: &str = "bash";

/// Runs `record` through `bash -c` with inherited stdio.
///
/// Returns the command's exit status so `bm` can exit with it.
pub fn execute(record: &Record) -> CliResult<ExitCode> {
    eprintln!("running command '{}': {}", record.id, record.command);
    let code = run_shell(record)?;
    Ok(ExitCode::from(status_byte(code)))
}

fn run_shell(record: &Record) -> CliResult<i32> {
    let status = Command::new(SHELL)
        .arg("-c")
        .arg(&record.command)
        .status()
        .map_err(|source| CliError::Spawn {
            id: record.id.clone(),
            source,
        })?;
    debug!(id = %record.id, ?status, "command finished");

    status
        .code()
        .ok_or_else(|| CliError::Terminated(record.id.clone()))
}

/// Statuses outside 0..=255 only occur on Windows; they map to 1.
fn status_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_byte_mapping() {
        assert_eq!(status_byte(0), 0);
        assert_eq!(status_byte(3), 3);
        assert_eq!(status_byte(-1), 1);
        assert_eq!(status_byte(4096), 1);
    }

    #[cfg(unix)]
    #[test]
    fn propagates_exit_status() {
        assert_eq!(run_shell(&Record::new("t", "exit 7")).unwrap(), 7);
        assert_eq!(run_shell(&Record::new("t", "true")).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn signal_termination_is_an_error() {
        let err = run_shell(&Record::new("t", "kill -9 $$")).unwrap_err();
        assert!(matches!(err, CliError::Terminated(id) if id == "t"));
    }
}
