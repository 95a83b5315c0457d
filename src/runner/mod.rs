pub mod action;
pub mod display;
pub mod executor;
pub mod result;

pub use action::{ShellAction, ShellConfig, TestAction};
pub use executor::{RunState, execute, execute_with};
