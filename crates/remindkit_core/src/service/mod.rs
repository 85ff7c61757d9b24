//! Use-case services over repositories.

pub mod reminder_service;
