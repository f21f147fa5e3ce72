//! Repository layer for schedule versions in SQLite

pub mod hydration;
pub mod sqlite_store;

pub use sqlite_store::SqliteScheduleStore;
