//! Contact record.
//!
//! # Responsibility
//! - Parse contacts from `/`-separated `key:value` descriptions.
//! - Render the display form and the canonical storage form.
//!
//! # Invariants
//! - `name` is never blank.
//! - Field values never contain `/`, so the storage form re-parses losslessly.
//! - Phone/email syntax is not validated here.

use crate::model::entity::{EntityKind, ListEntity, Memberships, RecordError, RecordId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]+)\s*:\s*(.*)$").expect("valid field regex"));

const SEGMENT_SEPARATOR: char = '/';

/// Field keys accepted in contact descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContactField {
    Name,
    Phone,
    Email,
}

impl ContactField {
    fn parse(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "phone" => Some(Self::Phone),
            "email" => Some(Self::Email),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
        }
    }
}

/// Field values extracted from one description or edit payload.
#[derive(Debug, Default, PartialEq, Eq)]
struct ContactPatch {
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

impl ContactPatch {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

/// One entry in the contact list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Stable identity referenced by the category index.
    pub id: RecordId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Category names in assignment order.
    pub categories: Memberships,
}

impl Contact {
    /// Creates a contact with only a name and a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            phone: None,
            email: None,
            categories: Memberships::new(),
        }
    }

    /// Parses a full description such as `name:Alice /phone:123`.
    ///
    /// A leading segment without a known key is taken as the name, so a
    /// bare `Alice` or `Dr: Who` is a valid description.
    pub fn parse(description: &str) -> Result<Self, RecordError> {
        let patch = parse_segments(description, LeadingSegment::NameUnlessKnownKey)?;
        let name = patch.name.ok_or(RecordError::MissingName)?;
        let mut contact = Self::new(name);
        contact.phone = patch.phone;
        contact.email = patch.email;
        Ok(contact)
    }
}

impl ListEntity for Contact {
    const KIND: EntityKind = EntityKind::Contact;

    fn from_description(description: &str) -> Result<Self, RecordError> {
        Self::parse(description)
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn display(&self) -> String {
        let mut out = self.name.clone();
        if let Some(phone) = self.phone.as_deref() {
            out.push_str(" | phone: ");
            out.push_str(phone);
        }
        if let Some(email) = self.email.as_deref() {
            out.push_str(" | email: ");
            out.push_str(email);
        }
        out
    }

    fn storage_description(&self) -> String {
        let mut out = format!("{}:{}", ContactField::Name.as_str(), self.name);
        if let Some(phone) = self.phone.as_deref() {
            out.push_str(&format!(" /{}:{phone}", ContactField::Phone.as_str()));
        }
        if let Some(email) = self.email.as_deref() {
            out.push_str(&format!(" /{}:{email}", ContactField::Email.as_str()));
        }
        out
    }

    /// Also accepts terms written the way they were typed in `add`: pieces
    /// around `/` are tried one by one and field keys match in any case.
    fn matches(&self, terms: &[&str]) -> bool {
        let display = self.display();
        let stored = self.storage_description();
        terms
            .iter()
            .flat_map(|term| term.split(SEGMENT_SEPARATOR))
            .filter(|piece| !piece.is_empty())
            .any(|piece| {
                display.contains(piece)
                    || stored.contains(piece)
                    || canonical_field(piece).is_some_and(|field| stored.contains(&field))
            })
    }

    fn apply_edit(&mut self, fields: &str) -> Result<(), RecordError> {
        let patch = parse_segments(fields, LeadingSegment::NameUnlessKeyed)?;
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        Ok(())
    }

    fn memberships(&self) -> &Memberships {
        &self.categories
    }

    fn memberships_mut(&mut self) -> &mut Memberships {
        &mut self.categories
    }
}

/// `Phone:12` as it appears in the storage form (`phone:12`).
fn canonical_field(piece: &str) -> Option<String> {
    let caps = FIELD_RE.captures(piece)?;
    let field = ContactField::parse(&caps[1])?;
    Some(format!("{}:{}", field.as_str(), caps[2].trim()))
}

/// How the first `/`-separated segment is read when it is not a known field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeadingSegment {
    /// `add`: anything that is not `<known key>:<value>` is the name.
    NameUnlessKnownKey,
    /// `edit`: only key-less text renames; `birthday:x` is a bad field.
    NameUnlessKeyed,
}

fn parse_segments(
    description: &str,
    leading: LeadingSegment,
) -> Result<ContactPatch, RecordError> {
    if description.trim().is_empty() {
        return Err(RecordError::EmptyDescription);
    }

    let mut patch = ContactPatch::default();
    for (position, segment) in description.split(SEGMENT_SEPARATOR).enumerate() {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let Some(caps) = FIELD_RE.captures(segment) else {
            // Only the leading segment may omit its key.
            if position == 0 {
                patch.name = Some(segment.to_string());
                continue;
            }
            return Err(RecordError::UnknownField(segment.to_string()));
        };

        let key = &caps[1];
        let Some(field) = ContactField::parse(key) else {
            if position == 0 && leading == LeadingSegment::NameUnlessKnownKey {
                patch.name = Some(segment.to_string());
                continue;
            }
            return Err(RecordError::UnknownField(key.to_string()));
        };
        let value = caps[2].trim();
        if value.is_empty() {
            return Err(RecordError::EmptyField(field.as_str().to_string()));
        }

        let slot = match field {
            ContactField::Name => &mut patch.name,
            ContactField::Phone => &mut patch.phone,
            ContactField::Email => &mut patch.email,
        };
        *slot = Some(value.to_string());
    }

    if patch.is_empty() {
        return Err(RecordError::EmptyDescription);
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::Contact;
    use crate::model::entity::{ListEntity, RecordError};

    #[test]
    fn bare_text_is_taken_as_name() {
        let contact = Contact::parse("Alice").unwrap();
        assert_eq!(contact.name, "Alice");
        assert_eq!(contact.display(), "Alice");
        assert_eq!(contact.storage_description(), "name:Alice");
    }

    #[test]
    fn keyed_fields_are_case_insensitive() {
        let contact = Contact::parse("Name:Bob Lee / PHONE: 9123 4567 /email:bob@x.io").unwrap();
        assert_eq!(contact.name, "Bob Lee");
        assert_eq!(contact.phone.as_deref(), Some("9123 4567"));
        assert_eq!(contact.email.as_deref(), Some("bob@x.io"));
        assert_eq!(
            contact.display(),
            "Bob Lee | phone: 9123 4567 | email: bob@x.io"
        );
    }

    #[test]
    fn leading_segment_with_unknown_key_is_the_name() {
        let contact = Contact::parse("Dr: Who /phone:1").unwrap();
        assert_eq!(contact.name, "Dr: Who");
        assert_eq!(contact.storage_description(), "name:Dr: Who /phone:1");
        assert_eq!(
            Contact::parse(&contact.storage_description()).unwrap().name,
            "Dr: Who"
        );

        let mut edited = contact.clone();
        assert_eq!(
            edited.apply_edit("Dr: No"),
            Err(RecordError::UnknownField("Dr".to_string()))
        );
        assert_eq!(edited, contact);
    }

    #[test]
    fn keyed_terms_match_in_any_key_case() {
        let contact = Contact::parse("Name:Alice /phone:123").unwrap();
        assert!(contact.matches(&["NAME:Alice"]));
        assert!(contact.matches(&["name:Alice/phone:123"]));
        assert!(contact.matches(&["123"]));
        assert!(!contact.matches(&["alice"]));
        assert!(!contact.matches(&["/"]));
    }

    #[test]
    fn storage_form_reparses_to_itself() {
        let contact = Contact::parse("email:c@d.e /name:Carol").unwrap();
        let stored = contact.storage_description();
        assert_eq!(stored, "name:Carol /email:c@d.e");
        let reparsed = Contact::parse(&stored).unwrap();
        assert_eq!(reparsed.storage_description(), stored);
    }

    #[test]
    fn parse_rejects_unknown_and_empty_fields() {
        assert_eq!(
            Contact::parse("Alice /address:here").unwrap_err(),
            RecordError::UnknownField("address".to_string())
        );
        assert_eq!(
            Contact::parse("Alice /phone:").unwrap_err(),
            RecordError::EmptyField("phone".to_string())
        );
        assert_eq!(
            Contact::parse("phone:123").unwrap_err(),
            RecordError::MissingName
        );
        assert_eq!(Contact::parse("   ").unwrap_err(), RecordError::EmptyDescription);
        assert_eq!(
            Contact::parse("Dr: Who /nick:W").unwrap_err(),
            RecordError::UnknownField("nick".to_string())
        );
        assert_eq!(
            Contact::parse("Alice / Bob").unwrap_err(),
            RecordError::UnknownField("Bob".to_string())
        );
    }

    #[test]
    fn edit_updates_only_named_fields() {
        let mut contact = Contact::parse("Alice /phone:1").unwrap();
        let id = contact.id;
        contact.apply_edit("email:a@b.c").unwrap();
        assert_eq!(contact.name, "Alice");
        assert_eq!(contact.phone.as_deref(), Some("1"));
        assert_eq!(contact.email.as_deref(), Some("a@b.c"));

        contact.apply_edit("Alicia").unwrap();
        assert_eq!(contact.name, "Alicia");
        assert_eq!(contact.id, id);

        assert_eq!(
            contact.apply_edit(" / ").unwrap_err(),
            RecordError::EmptyDescription
        );
    }
}
