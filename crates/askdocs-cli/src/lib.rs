//! Terminal interface for askdocs

mod telemetry;
mod ui;

pub use telemetry::Telemetry;
pub use ui::{display_banner, handle_input_with_history, print_help};

// Re-export core types
pub use askdocs_core::{Error, Result};
