//! # Migrator Shared
//! This crate defines the data structures shared across the migrator crates.
//! It includes schema descriptors, raw and canonical column values, and the
//! report types produced by migration and verification runs.
pub mod types;
