//! Record model shared by every manageable list.
//!
//! # Responsibility
//! - Define the capability contract (`ListEntity`) the list engine and
//!   command log are generic over.
//! - Define the concrete `Contact` record.
//!
//! # Invariants
//! - Every record carries a stable `RecordId` for category back-references.
//! - A record's storage form re-parses into an equal storage form.

pub mod contact;
pub mod entity;
