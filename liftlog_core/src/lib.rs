#![forbid(unsafe_code)]

//! Core domain model and business logic for the Liftlog system.
//!
//! This crate provides:
//! - Domain types (exercises, workouts, logged sets, score rows)
//! - A generic record store with a file-backed implementation
//! - The workout score calculator
//! - Workout log creation and reconciliation
//! - Message board, activity feed, leaderboards, and records
//! - Configuration and CSV export

pub mod types;
pub mod error;
pub mod store;
pub mod jsonstore;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod session;
pub mod scoring;
pub mod logbook;
pub mod board;
pub mod history;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use store::{Filter, Order, Record, RecordStore};
pub use jsonstore::JsonStore;
pub use catalog::{build_default_catalog, get_default_catalog, load_workout_plan};
pub use config::Config;
pub use session::{lookup_or_create_profile, Session};
pub use scoring::compute_score;
pub use logbook::WorkoutLogger;
pub use board::{board_feed, post_message, BoardPost};
pub use history::{exercise_records, leaderboard, recent_activity};
pub use export::export_logs;
