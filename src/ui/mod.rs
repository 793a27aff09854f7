//! The desktop front end.
//!
//! [`ExtractorShell`] holds all user-facing state and knows nothing about the
//! widget toolkit, so it can be driven from tests. The `gui` feature adds the
//! eframe window that renders it.

mod shell;

#[cfg(feature = "gui")]
mod gui;

pub use shell::{ExtractorShell, Notice, START_LABEL, WORKING_LABEL};

#[cfg(feature = "gui")]
pub use gui::run_gui;
