//! Command interpreter and command-log replay.
//!
//! # Responsibility
//! - Parse one input line into a command token and payload.
//! - Dispatch to the contact manager and shape user-facing replies.
//! - Rebuild state at startup by replaying stored command logs.
//!
//! # Invariants
//! - The interpreter keeps no memory between calls; the caller owns the
//!   category sub-prompt.
//! - `ExecMode::Replay` produces no output and never rewrites the log.

pub mod interpreter;
pub mod replay;
