//! Whole-container tests: fixtures are built in memory and decoded through
//! the public entry points.

pub(crate) mod fixtures;

mod enhanced;
