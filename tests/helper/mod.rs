//! Shared fixtures for the integration tests

#![allow(dead_code, unused_imports)]

mod registry;
mod resource;

pub use registry::{SearchFixture, mock_registry};
pub use resource::{CountingSource, get, router, test_config};
