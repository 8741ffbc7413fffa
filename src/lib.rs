//! Pantry Finder - discovery and filtering engine for food pantries
//!
//! This library computes distances to pantries, evaluates their weekly
//! opening hours, and filters and ranks them for a user.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{evaluate, search, distance::distance_miles, PantryError, RankedSearch, SearchOutcome};
pub use models::{Coordinate, Pantry, PantryFilter, PantryStatus, WeeklySchedule};
