//! Terminal output helpers

pub mod colors;
pub mod console;
