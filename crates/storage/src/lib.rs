#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemorySessionStore, QuestionStateRecord, SessionRecord, SessionStore, StorageError,
    session_storage_key,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
