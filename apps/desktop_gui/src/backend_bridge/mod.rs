//! Worker side of the GUI: commands queued by the form and the thread that runs them.

pub mod commands;
pub mod runtime;
