//! Contact manager.
//!
//! # Responsibility
//! - Expose add/delete/edit/find/view and category operations on contacts.
//! - Keep the contact list and category index consistent.
//! - Rewrite the contact log after every successful list mutation.
//!
//! # Invariants
//! - A deleted contact is dropped from every category.
//! - In-memory state is updated before the save; a failed save leaves the
//!   durable log stale and is reported as `Storage`.
//! - Category changes are not written to the log.

use crate::category::category_index::{split_category_names, CategoryError, CategoryIndex};
use crate::list::indexed_list::{IndexedList, ListError, ListMatch};
use crate::model::contact::Contact;
use crate::storage::command_log::{save_records, SaveOutcome};
use crate::storage::log_store::LogStore;
use crate::storage::StorageError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CATEGORY_ADD: &str = "add";
const CATEGORY_REMOVE: &str = "remove";
const CATEGORY_EDIT: &str = "edit";
const CATEGORY_RENAME: &str = "rename";
const CATEGORY_VIEW: &str = "view";
const CATEGORY_QUIT: &str = "quit";

pub type ContactServiceResult<T> = Result<T, ContactServiceError>;

/// Contact manager error.
#[derive(Debug)]
pub enum ContactServiceError {
    /// Required argument is blank or missing.
    EmptyDescription,
    /// Unknown category sub-command.
    IllegalCommand(String),
    List(ListError),
    Category(CategoryError),
    /// Mutation applied in memory but the log could not be rewritten.
    Storage(StorageError),
}

impl ContactServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "empty_description",
            Self::IllegalCommand(_) => "illegal_command",
            Self::List(err) => err.code(),
            Self::Category(err) => err.code(),
            Self::Storage(err) => err.code(),
        }
    }
}

impl Display for ContactServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::IllegalCommand(token) => write!(f, "invalid category command: `{token}`"),
            Self::List(err) => write!(f, "{err}"),
            Self::Category(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "error saving data: {err}"),
        }
    }
}

impl Error for ContactServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::List(err) => Some(err),
            Self::Category(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ListError> for ContactServiceError {
    fn from(value: ListError) -> Self {
        match value {
            ListError::EmptyDescription => Self::EmptyDescription,
            other => Self::List(other),
        }
    }
}

impl From<CategoryError> for ContactServiceError {
    fn from(value: CategoryError) -> Self {
        match value {
            CategoryError::EmptyDescription => Self::EmptyDescription,
            other => Self::Category(other),
        }
    }
}

impl From<StorageError> for ContactServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Outcome of one category sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryReply {
    Added(String),
    Removed { name: String, stripped: usize },
    Renamed { from: String, to: String },
    Assigned { position: usize, names: Vec<String> },
    View(Vec<String>),
    Quit,
}

/// Contact list plus its category index, backed by a command log.
pub struct ContactManager<S: LogStore> {
    contacts: IndexedList<Contact>,
    categories: CategoryIndex,
    store: S,
    autosave: bool,
}

impl<S: LogStore> ContactManager<S> {
    /// Creates an empty manager with no categories.
    pub fn new(store: S) -> Self {
        Self {
            contacts: IndexedList::new(),
            categories: CategoryIndex::new(),
            store,
            autosave: true,
        }
    }

    /// Creates an empty manager seeded with `categories`.
    pub fn with_categories<I, T>(store: S, categories: I) -> Result<Self, CategoryError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut manager = Self::new(store);
        manager.categories = CategoryIndex::with_categories(categories)?;
        Ok(manager)
    }

    /// Adds a contact parsed from `description`; returns its position.
    pub fn add_contact(&mut self, description: &str) -> ContactServiceResult<usize> {
        let description = non_empty(description)?;
        let position = self.contacts.add_description(description)?;
        info!(
            "event=contact_add module=service status=ok position={} total={}",
            position,
            self.contacts.len()
        );
        self.autosave()?;
        Ok(position)
    }

    /// Deletes the contact at `position_text` and drops its memberships.
    pub fn delete_contact(&mut self, position_text: &str) -> ContactServiceResult<Contact> {
        let position_text = non_empty(position_text)?;
        let removed = match self.contacts.delete(position_text) {
            Ok(removed) => removed,
            Err(err) => {
                warn!(
                    "event=contact_delete module=service status=error error_code={}",
                    err.code()
                );
                return Err(err.into());
            }
        };
        self.categories.forget_record(removed.id);
        info!(
            "event=contact_delete module=service status=ok total={}",
            self.contacts.len()
        );
        self.autosave()?;
        Ok(removed)
    }

    /// Applies `<position> <fields>`; returns the edited position.
    pub fn edit_contact(&mut self, query: &str) -> ContactServiceResult<usize> {
        let query = non_empty(query)?;
        let position = match self.contacts.edit(query) {
            Ok(position) => position,
            Err(err) => {
                warn!(
                    "event=contact_edit module=service status=error error_code={}",
                    err.code()
                );
                return Err(err.into());
            }
        };
        info!("event=contact_edit module=service status=ok position={position}");
        self.autosave()?;
        Ok(position)
    }

    /// Finds contacts whose display form contains any term of `needle`.
    pub fn find_contact(&self, needle: &str) -> ContactServiceResult<Vec<ListMatch<'_, Contact>>> {
        let needle = non_empty(needle)?;
        let matches = self.contacts.find(needle)?;
        info!(
            "event=contact_find module=service status=ok hits={}",
            matches.len()
        );
        Ok(matches)
    }

    /// Renders the numbered contact list.
    pub fn view_contact_list(&self) -> Vec<String> {
        self.contacts.view()
    }

    /// Runs one category sub-command:
    /// `add <name>`, `remove <name>`, `edit <n> <name>[/<name>...]`,
    /// `rename <old>/<new>`, `view`, or `quit`.
    pub fn set_category(&mut self, sub_command: &str) -> ContactServiceResult<CategoryReply> {
        let sub_command = non_empty(sub_command)?;
        let (token, rest) = match sub_command.split_once(char::is_whitespace) {
            Some((token, rest)) => (token, rest.trim()),
            None => (sub_command, ""),
        };

        let reply = match token {
            CATEGORY_ADD => {
                self.categories.add_category(rest)?;
                CategoryReply::Added(rest.to_string())
            }
            CATEGORY_REMOVE => {
                let stripped = self.categories.remove_category(rest, &mut self.contacts)?;
                CategoryReply::Removed {
                    name: rest.to_string(),
                    stripped,
                }
            }
            CATEGORY_EDIT => {
                let (position_text, names) = match rest.split_once(char::is_whitespace) {
                    Some((position_text, names)) => (position_text, names.trim()),
                    None => (rest, ""),
                };
                let names = split_category_names(names);
                let position = self.categories.edit_categories_of(
                    &mut self.contacts,
                    position_text,
                    &names,
                )?;
                CategoryReply::Assigned {
                    position,
                    names: self.assigned_names(position),
                }
            }
            CATEGORY_RENAME => {
                let Some((from, to)) = rest.split_once('/') else {
                    return Err(ContactServiceError::EmptyDescription);
                };
                self.categories
                    .rename_category(from, to, &mut self.contacts)?;
                CategoryReply::Renamed {
                    from: from.trim().to_string(),
                    to: to.trim().to_string(),
                }
            }
            CATEGORY_VIEW => CategoryReply::View(self.categories.view(&self.contacts)),
            CATEGORY_QUIT => CategoryReply::Quit,
            other => {
                warn!("event=category_command module=service status=error error_code=illegal_command");
                return Err(ContactServiceError::IllegalCommand(other.to_string()));
            }
        };
        info!("event=category_command module=service status=ok command={token}");
        Ok(reply)
    }

    /// Members of category `name`, in assignment order.
    pub fn members_of(&self, name: &str) -> ContactServiceResult<Vec<&Contact>> {
        Ok(self.categories.members_of(name, &self.contacts)?)
    }

    /// Rewrites the contact log from the current list.
    pub fn persist(&mut self) -> ContactServiceResult<SaveOutcome> {
        match save_records(&mut self.store, self.contacts.as_slice()) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(
                    "event=contact_save module=service status=error error_code={} error={}",
                    err.code(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Enables or disables the save after each mutation. Replay turns it
    /// off because the log being replayed already is the durable state.
    pub fn set_autosave(&mut self, enabled: bool) {
        self.autosave = enabled;
    }

    pub fn autosave_enabled(&self) -> bool {
        self.autosave
    }

    pub fn contacts(&self) -> &IndexedList<Contact> {
        &self.contacts
    }

    pub fn categories(&self) -> &CategoryIndex {
        &self.categories
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether both sides of the category membership invariant hold.
    pub fn is_consistent(&self) -> bool {
        self.categories.is_consistent_with(&self.contacts)
    }

    fn autosave(&mut self) -> ContactServiceResult<()> {
        if self.autosave {
            self.persist()?;
        }
        Ok(())
    }

    fn assigned_names(&self, position: usize) -> Vec<String> {
        self.contacts
            .get(position - 1)
            .map(|contact| contact.categories.as_slice().to_vec())
            .unwrap_or_default()
    }
}

fn non_empty(value: &str) -> ContactServiceResult<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContactServiceError::EmptyDescription);
    }
    Ok(trimmed)
}
