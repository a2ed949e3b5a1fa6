//! Entity managers.
//!
//! # Responsibility
//! - Bind one indexed list and one category index per entity type.
//! - Persist the command log after every successful list mutation.
//!
//! # See also
//! - `storage` for the log format.

pub mod contact_service;
