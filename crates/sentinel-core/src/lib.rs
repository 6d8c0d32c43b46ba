//! Domain layer for Chat Sentinel.
//!
//! Defines the per-owner record model, keyword matching, schedule-time
//! parsing, the error taxonomy, and process settings. This crate performs
//! no I/O of its own.

pub mod error;
pub mod matcher;
pub mod models;
pub mod schedule;
pub mod settings;
