//! Terminal output for procmon.
//!
//! - [`messages`] - Error, warning, and info messages
//! - [`format`] - Byte counts and clock times
//! - [`table`] - The running resource table

pub mod format;
pub mod messages;
pub mod table;

/// ANSI color codes for terminal output.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
}

pub use colors::*;

pub use format::{format_bytes, format_time};
pub use messages::{print_error, print_info, print_interrupted, print_report_written, print_warning};
pub use table::{format_row, write_header, TABLE_HEADER};
