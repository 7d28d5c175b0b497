//! Property-based tests for the diff and reconcile laws

mod laws;
