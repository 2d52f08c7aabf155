//! Core data types for depmgmt.
//!
//! This crate defines the value objects a dependency manager works on:
//! artifacts and their properties, dependencies, exclusions, declared
//! management entries, the per-node collection context, and the manager
//! configuration.
//!
//! This crate is intentionally free of traversal logic.

pub mod artifact;
pub mod config;
pub mod context;
pub mod dependency;
