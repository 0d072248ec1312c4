//! # Storage Module
//!
//! Handles data persistence for the gym backend.
//!
//! The domain layer only sees the [`StudentStorage`] and [`Connection`]
//! traits; the SQLite implementation lives in [`sqlite`].
//!
//! ## Current Implementation
//!
//! - **Primary Storage**: SQLite database through SQLx
//! - **Tables**: `students` (profile and due date), `attendance` and
//!   `payments` (append-only history, ordered by insertion)

pub mod sqlite;
pub mod traits;

pub use sqlite::{DbConnection, StudentRepository};
pub use traits::{Connection, StudentStorage};
