//! Ordered, 1-based addressed record sequence.

use crate::model::entity::{ListEntity, RecordError, RecordId};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Notice rendered by `view` for an empty list.
pub const EMPTY_LIST_NOTICE: &str = "The list is empty.";
/// Notice rendered when `find` has no hits.
pub const NO_MATCHES_NOTICE: &str = "No matches found.";

pub type ListResult<T> = Result<T, ListError>;

/// Errors from list addressing and record parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    /// Required argument is blank or missing.
    EmptyDescription,
    /// Position text is not an integer.
    InvalidIndex(String),
    /// Position is outside `[1, len]`.
    OutOfRange { position: i64, len: usize },
    /// Record description or edit payload was rejected.
    InvalidRecord(RecordError),
}

impl ListError {
    /// Stable error code for logs and replay warnings.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "empty_description",
            Self::InvalidIndex(_) => "invalid_index",
            Self::OutOfRange { .. } => "out_of_range",
            Self::InvalidRecord(err) => err.code(),
        }
    }
}

impl Display for ListError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::InvalidIndex(value) => write!(f, "invalid index: `{value}` does not name a record"),
            Self::OutOfRange { position, len } => {
                if *len == 0 {
                    write!(f, "index {position} is out of range: the list is empty")
                } else {
                    write!(f, "index {position} is out of range: expected 1..={len}")
                }
            }
            Self::InvalidRecord(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ListError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRecord(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordError> for ListError {
    fn from(value: RecordError) -> Self {
        match value {
            RecordError::EmptyDescription => Self::EmptyDescription,
            other => Self::InvalidRecord(other),
        }
    }
}

/// One `find` hit together with its current 1-based position.
#[derive(Debug, PartialEq, Eq)]
pub struct ListMatch<'a, R> {
    pub position: usize,
    pub record: &'a R,
}

/// Ordered sequence of records addressed by 1-based positions.
///
/// Positions are only valid until the next mutation; callers must not
/// cache them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedList<R> {
    items: Vec<R>,
}

impl<R> Default for IndexedList<R> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<R: ListEntity> IndexedList<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns its 1-based position.
    pub fn add(&mut self, record: R) -> usize {
        self.items.push(record);
        self.items.len()
    }

    /// Parses `description` into a record and appends it.
    pub fn add_description(&mut self, description: &str) -> ListResult<usize> {
        let record = R::from_description(description)?;
        Ok(self.add(record))
    }

    /// Removes the record at `position_text` and shifts later records down.
    pub fn delete(&mut self, position_text: &str) -> ListResult<R> {
        let slot = self.resolve(position_text)?;
        debug!(
            "event=list_delete module=list status=ok position={} len_before={}",
            slot + 1,
            self.items.len()
        );
        Ok(self.items.remove(slot))
    }

    /// Applies `<position> <fields>` to one record in place.
    ///
    /// Returns the edited position. The index is validated before the
    /// payload, so a bad index wins over a missing payload.
    pub fn edit(&mut self, query: &str) -> ListResult<usize> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ListError::EmptyDescription);
        }
        let (position_text, fields) = match query.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (query, ""),
        };

        let slot = self.resolve(position_text)?;
        if fields.is_empty() {
            return Err(ListError::EmptyDescription);
        }
        self.items[slot].apply_edit(fields)?;
        Ok(slot + 1)
    }

    /// Returns records that match any whitespace-separated term of `needle`
    /// (see `ListEntity::matches`). Order is preserved.
    pub fn find(&self, needle: &str) -> ListResult<Vec<ListMatch<'_, R>>> {
        let terms: Vec<&str> = needle.split_whitespace().collect();
        if terms.is_empty() {
            return Err(ListError::EmptyDescription);
        }

        Ok(self
            .items
            .iter()
            .enumerate()
            .filter(|(_, record)| record.matches(&terms))
            .map(|(slot, record)| ListMatch {
                position: slot + 1,
                record,
            })
            .collect())
    }

    /// Renders every record as `<position>. <display>`.
    pub fn view(&self) -> Vec<String> {
        if self.items.is_empty() {
            return vec![EMPTY_LIST_NOTICE.to_string()];
        }
        self.items
            .iter()
            .enumerate()
            .map(|(slot, record)| format!("{}. {}", slot + 1, record.display()))
            .collect()
    }

    /// Maps user-facing position text to a 0-based slot.
    pub fn resolve(&self, position_text: &str) -> ListResult<usize> {
        let position = parse_position(position_text)?;
        if position < 1 || position > self.items.len() as i64 {
            return Err(ListError::OutOfRange {
                position,
                len: self.items.len(),
            });
        }
        Ok((position - 1) as usize)
    }

    pub fn get(&self, slot: usize) -> Option<&R> {
        self.items.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut R> {
        self.items.get_mut(slot)
    }

    pub fn find_by_id(&self, id: RecordId) -> Option<&R> {
        self.items.iter().find(|record| record.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: RecordId) -> Option<&mut R> {
        self.items.iter_mut().find(|record| record.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, R> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[R] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Renders `find` hits, or the no-matches notice.
pub fn render_matches<R: ListEntity>(matches: &[ListMatch<'_, R>]) -> Vec<String> {
    if matches.is_empty() {
        return vec![NO_MATCHES_NOTICE.to_string()];
    }
    matches
        .iter()
        .map(|hit| format!("{}. {}", hit.position, hit.record.display()))
        .collect()
}

/// Parses 1-based position text; blank is `EmptyDescription`.
pub fn parse_position(position_text: &str) -> ListResult<i64> {
    let trimmed = position_text.trim();
    if trimmed.is_empty() {
        return Err(ListError::EmptyDescription);
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| ListError::InvalidIndex(trimmed.to_string()))
}
