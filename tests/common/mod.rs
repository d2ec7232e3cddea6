#![allow(unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: populated in-memory sources (objects, event and field rows)
//! - `mocks`: object/row builders and a data source that always fails
//! - `assertions`: assertion helpers with readable failure messages

pub mod assertions;
pub mod fixtures;
pub mod mocks;

pub use assertions::{assert_err, assert_error_contains, assert_ok};
pub use fixtures::{event_rows, memory_source, source_with_objects};
pub use mocks::{coin_object, event_row, FailingSource};
