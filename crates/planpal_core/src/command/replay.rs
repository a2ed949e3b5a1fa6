//! Startup replay of stored command logs.
//!
//! # Invariants
//! - Lines run in `ExecMode::Replay`: silent and without autosave.
//! - A failing line is recorded as a warning; later lines and files still run.
//! - Lines that could not be decoded are warnings at their own line number.
//! - Only contact logs are replayed; logs of other kinds are reported and
//!   left on disk untouched.
//! - Autosave is restored to its previous setting after replay.

use crate::command::interpreter::{CommandOutcome, ExecMode, Interpreter};
use crate::model::entity::EntityKind;
use crate::storage::command_log::LogLines;
use crate::storage::log_store::LogStore;
use crate::storage::StorageResult;
use log::{info, warn};

/// One skipped log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayWarning {
    pub source: String,
    /// 1-based line number within the stored log.
    pub line_number: usize,
    pub code: &'static str,
    pub message: String,
}

/// Summary of a replay pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Sources replayed, in order.
    pub sources: Vec<String>,
    /// Lines that executed successfully.
    pub applied: usize,
    pub warnings: Vec<ReplayWarning>,
    /// Stored logs that were not replayed because no manager handles
    /// their kind.
    pub skipped: Vec<SkippedLog>,
}

impl ReplayReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.skipped.is_empty()
    }
}

/// A stored log of a kind the contact interpreter does not own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLog {
    pub kind: EntityKind,
    /// `<kind dir>/<file name>`.
    pub source: String,
    pub lines: usize,
}

/// Code attached to lines that are not valid UTF-8.
pub const UNDECODABLE_LINE_CODE: &str = "invalid_encoding";

/// Replays every log the manager's store holds.
///
/// Missing storage means an empty report, not an error.
pub fn restore<S: LogStore>(interpreter: &mut Interpreter<S>) -> StorageResult<ReplayReport> {
    let stored = interpreter.manager().store().load_lists()?;
    let mut report = ReplayReport::default();
    for entry in &stored {
        if entry.kind != EntityKind::Contact {
            warn!(
                "event=replay module=command status=skip kind={} reason=unsupported_kind",
                entry.kind
            );
            report.skipped.push(SkippedLog {
                kind: entry.kind,
                source: format!("{}/{}", entry.kind.storage_dir(), entry.source),
                lines: entry.log.len() + entry.undecodable.len(),
            });
            continue;
        }
        replay_into(
            interpreter,
            &entry.source,
            &entry.log,
            &entry.undecodable,
            &mut report,
        );
    }
    info!(
        "event=replay module=command status=ok sources={} applied={} warnings={} skipped={}",
        report.sources.len(),
        report.applied,
        report.warnings.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Replays one log and returns its report.
pub fn replay_log<S: LogStore>(
    interpreter: &mut Interpreter<S>,
    source: &str,
    log: &LogLines,
) -> ReplayReport {
    let mut report = ReplayReport::default();
    replay_into(interpreter, source, log, &[], &mut report);
    report
}

fn replay_into<S: LogStore>(
    interpreter: &mut Interpreter<S>,
    source: &str,
    log: &LogLines,
    undecodable: &[usize],
    report: &mut ReplayReport,
) {
    let previous_autosave = interpreter.manager().autosave_enabled();
    interpreter.manager_mut().set_autosave(false);

    let mut undecodable = undecodable.iter().copied().peekable();
    let mut line_number = 0;
    let mut awaiting_category = false;
    for line in log {
        line_number += 1;
        while undecodable.next_if_eq(&line_number).is_some() {
            skip_undecodable(source, line_number, report);
            line_number += 1;
        }

        let result = if awaiting_category {
            awaiting_category = false;
            interpreter.execute_category(line, ExecMode::Replay)
        } else {
            interpreter.execute(line, ExecMode::Replay)
        };

        match result {
            Ok(reply) => {
                report.applied += 1;
                match reply.outcome {
                    CommandOutcome::Continue => {}
                    CommandOutcome::AwaitCategory => awaiting_category = true,
                    CommandOutcome::Exit => {
                        warn!(
                            "event=replay_line module=command status=skip line={} reason=exit_in_log",
                            line_number
                        );
                    }
                }
            }
            Err(err) => {
                warn!(
                    "event=replay_line module=command status=error line={} error_code={}",
                    line_number,
                    err.code()
                );
                report.warnings.push(ReplayWarning {
                    source: source.to_string(),
                    line_number,
                    code: err.code(),
                    message: err.to_string(),
                });
            }
        }
    }

    for trailing in undecodable {
        skip_undecodable(source, trailing, report);
    }

    interpreter.manager_mut().set_autosave(previous_autosave);
    report.sources.push(source.to_string());
}

fn skip_undecodable(source: &str, line_number: usize, report: &mut ReplayReport) {
    warn!(
        "event=replay_line module=command status=error line={} error_code={}",
        line_number, UNDECODABLE_LINE_CODE
    );
    report.warnings.push(ReplayWarning {
        source: source.to_string(),
        line_number,
        code: UNDECODABLE_LINE_CODE,
        message: "line is not valid UTF-8".to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::replay_log;
    use crate::command::interpreter::Interpreter;
    use crate::service::contact_service::ContactManager;
    use crate::storage::command_log::LogLines;
    use crate::storage::log_store::MemoryLogStore;

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let mut interpreter = Interpreter::new(ContactManager::new(MemoryLogStore::new()));
        let log = LogLines::parse("add name:Alice\ndelete 9\nfrobnicate\nadd name:Bob\nbye\n");

        let report = replay_log(&mut interpreter, "list.txt", &log);
        assert_eq!(report.applied, 3);
        let codes: Vec<_> = report.warnings.iter().map(|w| (w.line_number, w.code)).collect();
        assert_eq!(codes, [(2, "out_of_range"), (3, "illegal_command")]);
        assert_eq!(interpreter.manager().view_contact_list(), ["1. Alice", "2. Bob"]);
    }

    #[test]
    fn replay_does_not_write_and_restores_autosave() {
        let mut interpreter = Interpreter::new(ContactManager::new(MemoryLogStore::new()));
        let log = LogLines::parse("add name:Alice\n");
        replay_log(&mut interpreter, "list.txt", &log);
        assert_eq!(interpreter.manager().store().writes(), 0);
        assert!(interpreter.manager().autosave_enabled());
    }

    #[test]
    fn category_lines_in_a_log_are_honoured() {
        let mut interpreter = Interpreter::new(ContactManager::new(MemoryLogStore::new()));
        let log = LogLines::parse("add name:Alice\ncategory\nadd friend\ncategory\nedit 1 friend\n");
        let report = replay_log(&mut interpreter, "list.txt", &log);
        assert!(report.is_clean());
        let members = interpreter.manager().members_of("friend").unwrap();
        assert_eq!(members[0].name, "Alice");
    }
}
