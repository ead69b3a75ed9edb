//! CLI formatting utilities.
//!
//! Consistent colors and visual hierarchy for command output.

mod headers;
mod output;
mod status;
mod tables;

pub use headers::print_section_header;
pub use output::print_key_value;
pub use status::{print_success, print_warning};
pub use tables::print_publish_table;
