//! Grouped test execution with ordering constraints.
//!
//! Tests are declared with a group and, optionally, the groups that must pass
//! before theirs runs. [`graph::builder::build`] validates the declarations
//! and fixes an execution order, [`runner::execute`] runs every group in that
//! order and skips groups whose dependencies did not pass, and
//! [`emit::render::project`] turns the result into a node/link graph.

pub mod cli;
pub mod declare;
pub mod emit;
pub mod graph;
pub mod logging;
pub mod manifest;
pub mod runner;
