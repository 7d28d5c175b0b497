//! Integration tests for fixity inventories and drift detection

mod cli_workflow;
mod store_integration;
mod test_utils;
mod xdg_config;

pub use test_utils::{with_xdg_env, Workspace};
