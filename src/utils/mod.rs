//! Utility modules for cell coercion

pub mod parse;

pub use parse::*;
