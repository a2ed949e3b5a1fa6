//! Indexed-list engine shared by every entity manager.
//!
//! # Responsibility
//! - Provide add/delete/edit/find/view over an ordered record sequence.
//! - Translate user-facing 1-based positions into storage slots.
//!
//! # Invariants
//! - Delete compacts the sequence; there are no tombstones.
//! - Edit never changes the sequence length.

pub mod indexed_list;
