//! Pure rendering/parsing of command logs.

use crate::command::interpreter::ADD_COMMAND;
use crate::model::entity::ListEntity;
use crate::storage::log_store::LogStore;
use crate::storage::StorageResult;
use log::{info, warn};

/// Ordered, independently replayable command lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogLines {
    lines: Vec<String>,
}

impl LogLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits file text into lines. Blank lines are dropped; line endings
    /// (`\n` or `\r\n`) are not part of a line.
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Splits raw file bytes into lines, decoding each line on its own.
    ///
    /// Returns the decodable lines and the 1-based numbers (counted over
    /// non-blank lines) of lines that are not valid UTF-8.
    pub fn decode(bytes: &[u8]) -> (Self, Vec<usize>) {
        let mut log = Self::new();
        let mut undecodable = Vec::new();
        let mut line_number = 0;
        for raw in bytes.split(|byte| *byte == b'\n') {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            match std::str::from_utf8(raw) {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => {
                    line_number += 1;
                    log.push(line);
                }
                Err(_) => {
                    line_number += 1;
                    undecodable.push(line_number);
                }
            }
        }
        (log, undecodable)
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// File text: every line terminated by `\n`.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.lines.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<'a> IntoIterator for &'a LogLines {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Result of one save attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Log rewritten with this many lines.
    Written { lines: usize },
    /// List was empty; the previous log was left untouched.
    SkippedEmpty,
}

/// Renders one `add <storage description>` line per record, in order.
pub fn render_log<R: ListEntity>(records: &[R]) -> LogLines {
    let mut log = LogLines::new();
    for record in records {
        log.push(format!("{ADD_COMMAND} {}", record.storage_description()));
    }
    log
}

/// Rewrites the log for `R::KIND`, unless `records` is empty.
pub fn save_records<R, S>(store: &mut S, records: &[R]) -> StorageResult<SaveOutcome>
where
    R: ListEntity,
    S: LogStore + ?Sized,
{
    if records.is_empty() {
        warn!(
            "event=log_save module=storage status=skip kind={} reason=empty_list",
            R::KIND
        );
        return Ok(SaveOutcome::SkippedEmpty);
    }

    let log = render_log(records);
    store.save_list(R::KIND, &log)?;
    info!(
        "event=log_save module=storage status=ok kind={} lines={}",
        R::KIND,
        log.len()
    );
    Ok(SaveOutcome::Written { lines: log.len() })
}

#[cfg(test)]
mod tests {
    use super::{render_log, save_records, LogLines, SaveOutcome};
    use crate::model::contact::Contact;
    use crate::model::entity::EntityKind;
    use crate::storage::log_store::MemoryLogStore;

    #[test]
    fn render_emits_one_add_line_per_record() {
        let records = vec![
            Contact::parse("Alice").unwrap(),
            Contact::parse("Bob /phone:42").unwrap(),
        ];
        let log = render_log(&records);
        assert_eq!(log.as_slice(), ["add name:Alice", "add name:Bob /phone:42"]);
        assert_eq!(log.to_text(), "add name:Alice\nadd name:Bob /phone:42\n");
    }

    #[test]
    fn parse_drops_blank_lines_and_crlf() {
        let log = LogLines::parse("add name:A\r\n\n  \nadd name:B\n");
        assert_eq!(log.as_slice(), ["add name:A", "add name:B"]);
    }

    #[test]
    fn decode_keeps_good_lines_around_a_bad_byte() {
        let (log, undecodable) = LogLines::decode(b"add name:A\r\n\nadd name:Caf\xE9\nadd name:B\n");
        assert_eq!(log.as_slice(), ["add name:A", "add name:B"]);
        assert_eq!(undecodable, [2]);
    }

    #[test]
    fn empty_list_is_not_written() {
        let mut store = MemoryLogStore::new();
        let records: Vec<Contact> = Vec::new();
        assert_eq!(
            save_records(&mut store, &records).unwrap(),
            SaveOutcome::SkippedEmpty
        );
        assert!(store.get(EntityKind::Contact).is_none());
        assert_eq!(store.writes(), 0);
    }
}
