//! Exit codes for the CLI
//!
//! Standard exit codes used by the langcensus CLI so that scheduled runs can
//! tell a clean census from a partial one.
//!
//! # Exit Code Reference
//!
//! | Code | Constant | Meaning | Example |
//! |------|----------|---------|---------|
//! | 0 | `SUCCESS` | Success | Every project listed, every repository analyzed |
//! | 2 | `WARNINGS` | Partial result | A clone failed, a project was empty |
//! | 3 | `ERROR` | Runtime error | Authentication rejected, workbook not writable |
//! | 4 | `INVALID_ARGS` | Invalid configuration | No workspace, no project keys |
//!
//! # Usage
//!
//! ```rust
//! use langcensus::cli::exit_codes;
//!
//! assert_eq!(exit_codes::WARNINGS, 2);
//! ```

/// Success - the workbook was written and nothing failed.
pub const SUCCESS: i32 = 0;

/// The workbook was written, but something is missing from it.
///
/// Used when:
/// - A repository failed to clone or analyze
/// - A project had no repositories or could not be listed
/// - No language data was collected at all
pub const WARNINGS: i32 = 2;

/// Runtime error (authentication failure, network error, etc.).
///
/// Used when:
/// - Configuration file not readable or not valid TOML
/// - Credentials rejected or workspace not found
/// - Prerequisites check failed
/// - The workbook could not be written
pub const ERROR: i32 = 3;

/// Invalid configuration values.
///
/// Used when:
/// - No workspace or no project keys are configured
/// - A URL, timeout or page size is out of range
pub const INVALID_ARGS: i32 = 4;
