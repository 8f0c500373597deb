//! Console input/output for the interactive calculator.
//!
//! The readers recover from bad input locally by re-prompting; nothing here
//! propagates a parse failure.

pub mod input;

pub use input::Console;
