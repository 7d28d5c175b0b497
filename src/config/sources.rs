//! Configuration sources, lowest to highest precedence after defaults.

pub mod global_file;
pub mod local_file;
