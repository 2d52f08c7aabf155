//! Shared utilities for the depmgmt crates.
//!
//! This crate provides the cross-cutting error type used by the value-object
//! and resolver crates when parsing coordinates or loading configuration.

pub mod errors;
