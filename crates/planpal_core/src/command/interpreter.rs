//! Line-oriented command dispatch.

use crate::category::category_index::NO_MEMBERS_NOTICE;
use crate::list::indexed_list::render_matches;
use crate::model::entity::ListEntity;
use crate::service::contact_service::{CategoryReply, ContactManager, ContactServiceError};
use crate::storage::log_store::LogStore;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const ADD_COMMAND: &str = "add";
pub const DELETE_COMMAND: &str = "delete";
pub const EDIT_COMMAND: &str = "edit";
pub const FIND_COMMAND: &str = "find";
pub const LIST_COMMAND: &str = "list";
pub const CATEGORY_COMMAND: &str = "category";
pub const SET_COMMAND: &str = "set";
pub const SEARCH_COMMAND: &str = "search";
pub const BYE_COMMAND: &str = "bye";

/// Sub-prompt options shown when `category` is entered without a payload.
pub const CATEGORY_PROMPT: [&str; 7] = [
    "Options:",
    "1. add <category>            (e.g. add close friend)",
    "2. remove <category>         (e.g. remove emergency)",
    "3. edit <n> <cat>[/<cat>...] (e.g. edit 1 friend/family)",
    "4. rename <old>/<new>        (e.g. rename friend/buddy)",
    "5. view",
    "6. quit",
];

pub const BYE_MESSAGE: &str = "Bye. Hope to see you again!";

/// How a line is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// User input: replies are rendered, mutations are saved.
    Interactive,
    /// Log replay: no replies. The replay driver also turns autosave off.
    Replay,
}

impl ExecMode {
    pub fn is_silent(self) -> bool {
        matches!(self, Self::Replay)
    }
}

/// What the caller should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Read the next command line.
    Continue,
    /// Feed the next line to `execute_category`.
    AwaitCategory,
    /// Stop reading input and exit successfully.
    Exit,
}

/// Reply to one executed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub outcome: CommandOutcome,
    /// Always empty in `ExecMode::Replay`.
    pub messages: Vec<String>,
}

/// Interpreter error.
#[derive(Debug)]
pub enum CommandError {
    /// Command needs a payload and got none.
    EmptyDescription,
    /// Unknown command token.
    IllegalCommand(String),
    Service(ContactServiceError),
}

impl CommandError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "empty_description",
            Self::IllegalCommand(_) => "illegal_command",
            Self::Service(err) => err.code(),
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::IllegalCommand(token) if token.is_empty() => write!(f, "please enter a command"),
            Self::IllegalCommand(token) => write!(f, "unknown command: `{token}`"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContactServiceError> for CommandError {
    fn from(value: ContactServiceError) -> Self {
        match value {
            ContactServiceError::EmptyDescription => Self::EmptyDescription,
            ContactServiceError::IllegalCommand(token) => Self::IllegalCommand(token),
            other => Self::Service(other),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Reply collector that stays empty in silent mode.
struct Output {
    silent: bool,
    messages: Vec<String>,
}

impl Output {
    fn new(mode: ExecMode) -> Self {
        Self {
            silent: mode.is_silent(),
            messages: Vec::new(),
        }
    }

    fn say(&mut self, message: impl Into<String>) {
        if !self.silent {
            self.messages.push(message.into());
        }
    }

    fn say_all<I, T>(&mut self, messages: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        if !self.silent {
            self.messages.extend(messages.into_iter().map(Into::into));
        }
    }

    fn finish(self, outcome: CommandOutcome) -> Reply {
        Reply {
            outcome,
            messages: self.messages,
        }
    }
}

/// Stateless command dispatcher over one contact manager.
pub struct Interpreter<S: LogStore> {
    manager: ContactManager<S>,
}

impl<S: LogStore> Interpreter<S> {
    pub fn new(manager: ContactManager<S>) -> Self {
        Self { manager }
    }

    /// Executes one command line.
    pub fn execute(&mut self, line: &str, mode: ExecMode) -> CommandResult<Reply> {
        let line = line.trim();
        let (token, rest) = split_command(line);
        debug!("event=command module=command status=start token_len={}", token.len());
        let mut out = Output::new(mode);

        let outcome = match token {
            ADD_COMMAND => {
                let position = self.manager.add_contact(required(rest)?)?;
                let added = self.display_at(position);
                out.say(format!("Added contact {position}: {added}"));
                out.say(format!("You now have {} contact(s).", self.contact_count()));
                CommandOutcome::Continue
            }
            DELETE_COMMAND => {
                let removed = self.manager.delete_contact(required(rest)?)?;
                out.say(format!("Deleted contact: {}", removed.display()));
                out.say(format!("You now have {} contact(s).", self.contact_count()));
                CommandOutcome::Continue
            }
            EDIT_COMMAND => {
                let position = self.manager.edit_contact(required(rest)?)?;
                let edited = self.display_at(position);
                out.say(format!("Edited contact {position}: {edited}"));
                CommandOutcome::Continue
            }
            FIND_COMMAND => {
                let matches = self.manager.find_contact(required(rest)?)?;
                if !matches.is_empty() {
                    out.say(format!("Found {} matching contact(s):", matches.len()));
                }
                out.say_all(render_matches(&matches));
                CommandOutcome::Continue
            }
            LIST_COMMAND => {
                if !out.silent {
                    out.say_all(self.manager.view_contact_list());
                }
                CommandOutcome::Continue
            }
            CATEGORY_COMMAND | SET_COMMAND => {
                if rest.is_empty() {
                    out.say_all(CATEGORY_PROMPT);
                    CommandOutcome::AwaitCategory
                } else {
                    self.run_category(rest, &mut out)?;
                    CommandOutcome::Continue
                }
            }
            SEARCH_COMMAND => {
                let category = required(rest)?;
                let members = self.manager.members_of(category)?;
                if members.is_empty() {
                    out.say(NO_MEMBERS_NOTICE);
                } else {
                    out.say(format!("Contacts in `{category}`:"));
                    out.say_all(
                        members
                            .iter()
                            .enumerate()
                            .map(|(slot, contact)| format!("{}. {}", slot + 1, contact.display())),
                    );
                }
                CommandOutcome::Continue
            }
            BYE_COMMAND => {
                out.say(BYE_MESSAGE);
                CommandOutcome::Exit
            }
            other => return Err(CommandError::IllegalCommand(other.to_string())),
        };
        Ok(out.finish(outcome))
    }

    /// Executes one category sub-prompt line.
    pub fn execute_category(&mut self, line: &str, mode: ExecMode) -> CommandResult<Reply> {
        let mut out = Output::new(mode);
        self.run_category(line.trim(), &mut out)?;
        Ok(out.finish(CommandOutcome::Continue))
    }

    pub fn manager(&self) -> &ContactManager<S> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ContactManager<S> {
        &mut self.manager
    }

    pub fn into_manager(self) -> ContactManager<S> {
        self.manager
    }

    fn run_category(&mut self, sub_command: &str, out: &mut Output) -> CommandResult<()> {
        match self.manager.set_category(sub_command)? {
            CategoryReply::Added(name) => {
                out.say(format!("Successfully added category: '{name}'"));
            }
            CategoryReply::Removed { name, stripped } => {
                out.say(format!(
                    "Successfully deleted category: '{name}' ({stripped} contact(s) updated)"
                ));
            }
            CategoryReply::Renamed { from, to } => {
                out.say(format!("Renamed category '{from}' to '{to}'"));
            }
            CategoryReply::Assigned { position, names } => {
                let contact = self.display_at(position);
                out.say(format!("Categories of {contact}: {}", names.join(", ")));
            }
            CategoryReply::View(lines) => out.say_all(lines),
            CategoryReply::Quit => out.say("Closed category options."),
        }
        Ok(())
    }

    fn display_at(&self, position: usize) -> String {
        self.manager
            .contacts()
            .get(position - 1)
            .map(|contact| contact.display())
            .unwrap_or_default()
    }

    fn contact_count(&self) -> usize {
        self.manager.contacts().len()
    }
}

/// Splits a line into its first whitespace-delimited word and the trimmed
/// remainder.
pub fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, rest.trim()),
        None => (line, ""),
    }
}

fn required(rest: &str) -> CommandResult<&str> {
    if rest.is_empty() {
        return Err(CommandError::EmptyDescription);
    }
    Ok(rest)
}

#[cfg(test)]
mod tests {
    use super::{split_command, CommandError, CommandOutcome, ExecMode, Interpreter};
    use crate::service::contact_service::ContactManager;
    use crate::storage::log_store::MemoryLogStore;

    fn interpreter() -> Interpreter<MemoryLogStore> {
        Interpreter::new(ContactManager::new(MemoryLogStore::new()))
    }

    #[test]
    fn split_command_takes_first_word() {
        assert_eq!(split_command("  add  Alice Tan "), ("add", "Alice Tan"));
        assert_eq!(split_command("list"), ("list", ""));
        assert_eq!(split_command(""), ("", ""));
    }

    #[test]
    fn missing_payload_and_unknown_token() {
        let mut interpreter = interpreter();
        for line in ["add", "delete  ", "edit", "find", "search"] {
            assert!(matches!(
                interpreter.execute(line, ExecMode::Interactive),
                Err(CommandError::EmptyDescription)
            ));
        }
        assert!(matches!(
            interpreter.execute("dance now", ExecMode::Interactive),
            Err(CommandError::IllegalCommand(token)) if token == "dance"
        ));
        assert!(matches!(
            interpreter.execute("", ExecMode::Interactive),
            Err(CommandError::IllegalCommand(_))
        ));
    }

    #[test]
    fn replay_mode_is_silent() {
        let mut interpreter = interpreter();
        let reply = interpreter.execute("add Alice", ExecMode::Replay).unwrap();
        assert!(reply.messages.is_empty());
        let reply = interpreter.execute("list", ExecMode::Replay).unwrap();
        assert!(reply.messages.is_empty());

        let reply = interpreter.execute("list", ExecMode::Interactive).unwrap();
        assert_eq!(reply.messages, ["1. Alice"]);
    }

    #[test]
    fn bye_and_bare_category_signal_the_caller() {
        let mut interpreter = interpreter();
        let reply = interpreter.execute("bye", ExecMode::Interactive).unwrap();
        assert_eq!(reply.outcome, CommandOutcome::Exit);

        let reply = interpreter.execute("set", ExecMode::Interactive).unwrap();
        assert_eq!(reply.outcome, CommandOutcome::AwaitCategory);
        let numbered: Vec<_> = reply
            .messages
            .iter()
            .skip(1)
            .map(|line| line.split_whitespace().next().unwrap_or_default())
            .collect();
        assert_eq!(numbered, ["1.", "2.", "3.", "4.", "5.", "6."]);

        let reply = interpreter
            .execute("category add friend", ExecMode::Interactive)
            .unwrap();
        assert_eq!(reply.outcome, CommandOutcome::Continue);
        assert!(interpreter.manager().categories().contains("friend"));
    }

    #[test]
    fn find_reports_no_matches() {
        let mut interpreter = interpreter();
        interpreter.execute("add Alice", ExecMode::Interactive).unwrap();
        let reply = interpreter.execute("find Zed", ExecMode::Interactive).unwrap();
        assert_eq!(reply.messages, ["No matches found."]);
    }
}
