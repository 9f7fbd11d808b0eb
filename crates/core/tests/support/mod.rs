//! Shared test helpers for `activity-export-core` integration tests.
//!
//! In-memory implementations of the export ports plus activity-log
//! fixtures, so pipeline tests can focus on behaviour.

#![allow(dead_code)]

pub mod fixtures;
pub mod repositories;
