//! trak - Personal Task and Focus Tracking Library
//!
//! This library provides the core functionality for the trak CLI tool:
//! durable, versioned storage of tasks, focus time, and settings, plus a
//! recurring deadline-reminder scheduler.
//!
//! # Core Concepts
//!
//! - **Documents**: versioned key-value persistence units, one JSON file
//!   per storage key, seeded lazily on first run
//! - **Task Store**: ordered task collection with whole-collection
//!   read-modify-write mutations and change-token broadcasting
//! - **Focus Store**: per-day focus-minute ledger with calendar range
//!   queries
//! - **Settings Store**: single-record configuration with shallow-merge
//!   partial updates
//! - **Reminder Scheduler**: recurring deadline checks with at-most-once
//!   reminders per task
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `trak.toml`
//! - `document`: versioned key-value document store
//! - `error`: error types and result aliases
//! - `focus`: focus-time ledger
//! - `notify`: permission-gated notification capability
//! - `output`: CLI output formatting
//! - `reminder`: deadline reminder scheduler
//! - `settings`: user settings store
//! - `task`: task records and store

pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod focus;
pub mod notify;
pub mod output;
pub mod reminder;
pub mod settings;
pub mod task;

pub use error::{Error, Result};
