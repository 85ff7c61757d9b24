//! Reminder and trigger domain model.
//!
//! # Responsibility
//! - Define the reminder record supplied by the external store.
//! - Define derived trigger specifications and notification content.
//!
//! # Invariants
//! - Every reminder is identified by a stable, non-empty string id.
//! - `date_modified` strictly increases on every mutating edit.
//! - Trigger ids follow the `<reminderId>` / `<reminderId>_<day>` grammar.

pub mod notification;
pub mod reminder;
pub mod trigger;
