//! Repository layer for reminder records.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from services and the reconciler.
//!
//! # Invariants
//! - Repository writes enforce `Reminder::validate()` before persistence.
//! - Missing rows surface as `RepoError::NotFound`, not as transport errors.

pub mod reminder_repo;
