//! # System Module
//!
//! Workflow stages and the capabilities each stage grants.

mod stage;

pub use stage::*;
