//! SQLite database module for the order lifecycle engine.

mod sqlite_impl;

pub mod db;

pub use sqlite_impl::SqliteDatabase;
