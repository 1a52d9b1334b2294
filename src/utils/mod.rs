//! Utility modules for langcensus

pub mod command;
pub mod prerequisites;
pub mod timing;

pub use timing::{format_duration, Timer};
