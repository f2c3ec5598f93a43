//! # Formats Module
//!
//! Binary encoding of stored rows. File and database I/O live in `storage`.

mod persistence;

pub use persistence::*;
