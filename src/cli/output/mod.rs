//! Output formatting module for CLI

mod terminal;
pub mod workbook;

pub use terminal::TerminalOutput;
pub use workbook::{sanitize_sheet_name, WorkbookWriter, OVERALL_SHEET, STATUS_SHEET};
