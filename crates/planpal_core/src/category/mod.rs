//! Category cross-index over a record list.
//!
//! # Responsibility
//! - Keep the category name registry and per-category membership sets.
//! - Keep record-side memberships and index-side members in agreement.
//!
//! # Invariants
//! - `names[i]` and `members[i]` always describe the same category.
//! - Every id in `members[i]` belongs to a living record of the owning list.
//! - A record lists `names[i]` iff its id is in `members[i]`.

pub mod category_index;
