//! Helpdesk storage crate - SQLite persistence for conversations and messages.
//!
//! Provides a WAL-mode SQLite database with migrations and repository
//! implementations for the two tables the system owns.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::{ConversationRepository, MessageRepository, NewMessage};
