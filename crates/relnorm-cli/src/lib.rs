//! CLI library components for the relational schema normalizer.

pub mod logging;
pub mod prompt;
