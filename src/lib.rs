//! Storekeeper - in-app purchase backend
//!
//! Receipt verification with premium/subscription bookkeeping, App Store
//! notification intake, and a demo catalog seed, over a hosted REST database
//! or a local SQLite store.

pub mod config;
pub mod crypto;
pub mod db;
pub mod envelope;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod receipt;
pub mod reconcile;
pub mod seed;
pub mod util;
