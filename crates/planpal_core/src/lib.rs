//! Core domain logic for PlanPal.
//! The list engine, category index, command interpreter and command-log
//! persistence live here; the binary only drives the input loop.

pub mod category;
pub mod command;
pub mod config;
pub mod list;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;

pub use category::category_index::{CategoryError, CategoryIndex};
pub use command::interpreter::{
    CommandError, CommandOutcome, ExecMode, Interpreter, Reply, BYE_MESSAGE, CATEGORY_PROMPT,
};
pub use command::replay::{replay_log, restore, ReplayReport, ReplayWarning, SkippedLog};
pub use config::{AppConfig, ConfigError};
pub use list::indexed_list::{IndexedList, ListError, ListMatch};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::contact::Contact;
pub use model::entity::{EntityKind, ListEntity, Memberships, RecordError, RecordId};
pub use service::contact_service::{CategoryReply, ContactManager, ContactServiceError};
pub use storage::{
    render_log, save_records, FileLogStore, LogLines, LogStore, MemoryLogStore, SaveOutcome,
    StorageError, StoredLog,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
