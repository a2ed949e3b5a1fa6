//! Parallel name/membership index with bidirectional consistency.

use crate::list::indexed_list::{IndexedList, ListError};
use crate::model::entity::{ListEntity, RecordId};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rendered by `members_of` callers for a category with no members.
pub const NO_MEMBERS_NOTICE: &str = "No contacts in this category.";
/// Rendered by `view` when no category exists.
pub const NO_CATEGORIES_NOTICE: &str = "No categories defined.";

/// Separator between category names in `edit` payloads.
pub const CATEGORY_SEPARATOR: char = '/';

pub type CategoryResult<T> = Result<T, CategoryError>;

/// Category index errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryError {
    /// Category name (or name list) is blank.
    EmptyDescription,
    /// Category name is already registered.
    DuplicateCategory(String),
    /// Category name is not registered.
    CategoryNotFound(String),
    /// Record position failed to resolve.
    Index(ListError),
}

impl CategoryError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "empty_description",
            Self::DuplicateCategory(_) => "duplicate_category",
            Self::CategoryNotFound(_) => "category_not_found",
            Self::Index(err) => err.code(),
        }
    }
}

impl Display for CategoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "category must not be empty"),
            Self::DuplicateCategory(name) => write!(f, "category already exists: `{name}`"),
            Self::CategoryNotFound(name) => write!(f, "`{name}` is not a category"),
            Self::Index(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CategoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Index(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ListError> for CategoryError {
    fn from(value: ListError) -> Self {
        match value {
            ListError::EmptyDescription => Self::EmptyDescription,
            other => Self::Index(other),
        }
    }
}

/// Category registry plus membership sets, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    names: Vec<String>,
    members: Vec<Vec<RecordId>>,
}

impl CategoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index pre-seeded with `names`, in order.
    pub fn with_categories<I, S>(names: I) -> CategoryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        for name in names {
            index.add_category(name.as_ref())?;
        }
        Ok(index)
    }

    /// Registers a new, empty category.
    pub fn add_category(&mut self, name: &str) -> CategoryResult<()> {
        let name = normalize_name(name)?;
        if self.position_of(name).is_some() {
            return Err(CategoryError::DuplicateCategory(name.to_string()));
        }
        self.names.push(name.to_string());
        self.members.push(Vec::new());
        debug!(
            "event=category_add module=category status=ok count={}",
            self.names.len()
        );
        Ok(())
    }

    /// Drops a category and strips it from every record that referenced it.
    ///
    /// Returns how many records lost the membership.
    pub fn remove_category<R: ListEntity>(
        &mut self,
        name: &str,
        records: &mut IndexedList<R>,
    ) -> CategoryResult<usize> {
        let name = normalize_name(name)?;
        let slot = self.require(name)?;
        self.names.remove(slot);
        let former = self.members.remove(slot);

        let mut stripped = 0;
        for record in records.iter_mut() {
            if record.memberships_mut().remove(name) {
                stripped += 1;
            }
        }
        if stripped != former.len() {
            warn!(
                "event=category_remove module=category status=mismatch members={} stripped={}",
                former.len(),
                stripped
            );
        }
        Ok(stripped)
    }

    /// Renames a category in the registry and in every member record.
    pub fn rename_category<R: ListEntity>(
        &mut self,
        from: &str,
        to: &str,
        records: &mut IndexedList<R>,
    ) -> CategoryResult<()> {
        let from = normalize_name(from)?;
        let to = normalize_name(to)?;
        let slot = self.require(from)?;
        if from == to {
            return Ok(());
        }
        if self.position_of(to).is_some() {
            return Err(CategoryError::DuplicateCategory(to.to_string()));
        }

        self.names[slot] = to.to_string();
        for record in records.iter_mut() {
            record.memberships_mut().rename(from, to);
        }
        Ok(())
    }

    /// Replaces the memberships of the record at `position_text` with `names`.
    ///
    /// The call is atomic: the record and every name are validated before
    /// anything changes. Repeated names collapse to one membership. A
    /// position that names no record is an invalid index, whether or not it
    /// parses. Returns the record's 1-based position.
    pub fn edit_categories_of<R: ListEntity>(
        &mut self,
        records: &mut IndexedList<R>,
        position_text: &str,
        names: &[&str],
    ) -> CategoryResult<usize> {
        let slot = records
            .resolve(position_text)
            .map_err(|err| match err {
                ListError::OutOfRange { .. } => {
                    ListError::InvalidIndex(position_text.trim().to_string())
                }
                other => other,
            })?;

        let mut wanted: Vec<&str> = Vec::new();
        for name in names.iter().map(|name| name.trim()) {
            if name.is_empty() || wanted.contains(&name) {
                continue;
            }
            self.require(name)?;
            wanted.push(name);
        }
        if wanted.is_empty() {
            return Err(CategoryError::EmptyDescription);
        }

        let Some(record) = records.get_mut(slot) else {
            return Err(CategoryError::Index(ListError::InvalidIndex(
                position_text.trim().to_string(),
            )));
        };
        let id = record.id();
        self.forget_record(id);
        record.memberships_mut().clear();
        for name in wanted {
            if let Some(category_slot) = self.position_of(name) {
                self.members[category_slot].push(id);
                record.memberships_mut().insert(name);
            }
        }
        Ok(slot + 1)
    }

    /// Resolves the members of `name` in insertion order.
    pub fn members_of<'a, R: ListEntity>(
        &self,
        name: &str,
        records: &'a IndexedList<R>,
    ) -> CategoryResult<Vec<&'a R>> {
        let name = normalize_name(name)?;
        let slot = self.require(name)?;
        Ok(self.members[slot]
            .iter()
            .filter_map(|id| records.find_by_id(*id))
            .collect())
    }

    /// Drops `id` from every membership set; used when a record is deleted.
    pub fn forget_record(&mut self, id: RecordId) {
        for members in &mut self.members {
            members.retain(|member| *member != id);
        }
    }

    /// Renders `<category>: <member>, <member>` per category.
    pub fn view<R: ListEntity>(&self, records: &IndexedList<R>) -> Vec<String> {
        if self.names.is_empty() {
            return vec![NO_CATEGORIES_NOTICE.to_string()];
        }
        self.names
            .iter()
            .zip(&self.members)
            .enumerate()
            .map(|(slot, (name, members))| {
                let rendered: Vec<String> = members
                    .iter()
                    .filter_map(|id| records.find_by_id(*id))
                    .map(|record| record.display())
                    .collect();
                if rendered.is_empty() {
                    format!("{}. {name}: (none)", slot + 1)
                } else {
                    format!("{}. {name}: {}", slot + 1, rendered.join(", "))
                }
            })
            .collect()
    }

    /// Checks both directions of the membership invariant against `records`.
    pub fn is_consistent_with<R: ListEntity>(&self, records: &IndexedList<R>) -> bool {
        if self.names.len() != self.members.len() {
            return false;
        }
        let index_side = self.names.iter().zip(&self.members).all(|(name, members)| {
            members.iter().all(|id| {
                records
                    .find_by_id(*id)
                    .is_some_and(|record| record.memberships().contains(name))
            })
        });
        let record_side = records.iter().all(|record| {
            record.memberships().as_slice().iter().all(|name| {
                self.position_of(name)
                    .is_some_and(|slot| self.members[slot].contains(&record.id()))
            })
        });
        index_side && record_side
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position_of(name.trim()).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|existing| existing == name)
    }

    fn require(&self, name: &str) -> CategoryResult<usize> {
        self.position_of(name)
            .ok_or_else(|| CategoryError::CategoryNotFound(name.to_string()))
    }
}

/// Splits an `a/b/c` payload into category names.
pub fn split_category_names(payload: &str) -> Vec<&str> {
    payload
        .split(CATEGORY_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

fn normalize_name(name: &str) -> CategoryResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CategoryError::EmptyDescription);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{split_category_names, CategoryError, CategoryIndex, NO_CATEGORIES_NOTICE};
    use crate::list::indexed_list::{IndexedList, ListError};
    use crate::model::contact::Contact;
    use crate::model::entity::ListEntity;

    fn contacts(names: &[&str]) -> IndexedList<Contact> {
        let mut list = IndexedList::new();
        for name in names {
            list.add_description(name).unwrap();
        }
        list
    }

    #[test]
    fn add_category_rejects_blank_and_duplicates() {
        let mut index = CategoryIndex::new();
        assert_eq!(index.add_category("  "), Err(CategoryError::EmptyDescription));
        index.add_category(" friend ").unwrap();
        assert_eq!(
            index.add_category("friend"),
            Err(CategoryError::DuplicateCategory("friend".to_string()))
        );
        assert_eq!(index.names(), ["friend".to_string()]);
    }

    #[test]
    fn edit_is_atomic_when_any_name_is_unknown() {
        let mut list = contacts(&["Alice"]);
        let mut index = CategoryIndex::with_categories(["friend", "family"]).unwrap();
        index
            .edit_categories_of(&mut list, "1", &["friend"])
            .unwrap();

        let err = index
            .edit_categories_of(&mut list, "1", &["family", "coworker"])
            .unwrap_err();
        assert_eq!(err, CategoryError::CategoryNotFound("coworker".to_string()));
        assert_eq!(
            list.get(0).unwrap().memberships().as_slice(),
            ["friend".to_string()]
        );
        assert!(index.is_consistent_with(&list));
    }

    #[test]
    fn edit_replaces_memberships_on_both_sides() {
        let mut list = contacts(&["Alice", "Bob"]);
        let mut index = CategoryIndex::with_categories(["friend", "family"]).unwrap();
        index
            .edit_categories_of(&mut list, "1", &["friend", "family", "friend"])
            .unwrap();
        index.edit_categories_of(&mut list, "1", &["family"]).unwrap();

        let friends = index.members_of("friend", &list).unwrap();
        assert!(friends.is_empty());
        let family: Vec<_> = index
            .members_of("family", &list)
            .unwrap()
            .iter()
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(family, ["Alice"]);
        assert!(index.is_consistent_with(&list));
    }

    #[test]
    fn edit_reports_bad_positions() {
        let mut list = contacts(&["Alice"]);
        let mut index = CategoryIndex::with_categories(["friend"]).unwrap();
        assert!(matches!(
            index.edit_categories_of(&mut list, "x", &["friend"]),
            Err(CategoryError::Index(ListError::InvalidIndex(_)))
        ));
        assert!(matches!(
            index.edit_categories_of(&mut list, "2", &["friend"]),
            Err(CategoryError::Index(ListError::InvalidIndex(text))) if text == "2"
        ));
        assert_eq!(
            index.edit_categories_of(&mut list, "1", &[" "]),
            Err(CategoryError::EmptyDescription)
        );
    }

    #[test]
    fn remove_category_strips_record_memberships() {
        let mut list = contacts(&["Alice", "Bob"]);
        let mut index = CategoryIndex::with_categories(["friend", "family"]).unwrap();
        index
            .edit_categories_of(&mut list, "1", &["friend", "family"])
            .unwrap();
        index.edit_categories_of(&mut list, "2", &["friend"]).unwrap();

        assert_eq!(index.remove_category("friend", &mut list).unwrap(), 2);
        assert_eq!(index.names(), ["family".to_string()]);
        assert!(list.iter().all(|c| !c.categories.contains("friend")));
        assert!(index.is_consistent_with(&list));
        assert_eq!(
            index.remove_category("friend", &mut list),
            Err(CategoryError::CategoryNotFound("friend".to_string()))
        );
    }

    #[test]
    fn rename_updates_members_and_rejects_collisions() {
        let mut list = contacts(&["Alice"]);
        let mut index = CategoryIndex::with_categories(["friend", "family"]).unwrap();
        index.edit_categories_of(&mut list, "1", &["friend"]).unwrap();

        assert_eq!(
            index.rename_category("friend", "family", &mut list),
            Err(CategoryError::DuplicateCategory("family".to_string()))
        );
        index.rename_category("friend", "buddy", &mut list).unwrap();
        assert_eq!(
            list.get(0).unwrap().categories.as_slice(),
            ["buddy".to_string()]
        );
        assert!(index.is_consistent_with(&list));
    }

    #[test]
    fn forget_record_drops_orphans() {
        let mut list = contacts(&["Alice"]);
        let mut index = CategoryIndex::with_categories(["friend"]).unwrap();
        index.edit_categories_of(&mut list, "1", &["friend"]).unwrap();
        let removed = list.delete("1").unwrap();
        index.forget_record(removed.id);
        assert!(index.members_of("friend", &list).unwrap().is_empty());
        assert!(index.is_consistent_with(&list));
    }

    #[test]
    fn view_lists_each_category() {
        let mut list = contacts(&["Alice", "Bob"]);
        let mut index = CategoryIndex::new();
        assert_eq!(index.view(&list), [NO_CATEGORIES_NOTICE]);

        index.add_category("friend").unwrap();
        index.add_category("family").unwrap();
        index.edit_categories_of(&mut list, "2", &["friend"]).unwrap();
        index.edit_categories_of(&mut list, "1", &["friend"]).unwrap();
        assert_eq!(
            index.view(&list),
            ["1. friend: Bob, Alice", "2. family: (none)"]
        );
    }

    #[test]
    fn split_names_skips_blanks() {
        assert_eq!(
            split_category_names(" friend // close friend /"),
            ["friend", "close friend"]
        );
    }
}
