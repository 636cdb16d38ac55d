//! # MAESTRO Notifier
//!
//! Background notification service for the MAESTRO online-learning platform.
//!
//! ## Features
//! - 24-hour and 1-hour Telegram reminders for scheduled events
//! - Recording-available notices once a recording link is published
//! - Idempotent delivery backed by per-threshold notification flags
//! - Manual event announcements over an internal HTTP endpoint
//! - Persistent storage with SQLite

/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and the notification store
pub mod database;
/// Outbound message delivery gateways
pub mod delivery;
/// Notification message texts
pub mod messages;
/// Background services and the HTTP surface
pub mod services;
/// Utility functions for datetime, validation, and formatting
pub mod utils;
