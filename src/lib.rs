//! langcensus Library
//!
//! This crate lists every repository in a set of Bitbucket projects, clones
//! each one, measures its language breakdown with an external detector and
//! writes per-project and overall tables to an `.xlsx` workbook.

pub mod analysis;
pub mod census;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod providers;
pub mod utils;

pub use cli::exit_codes;
pub use error::CensusError;
