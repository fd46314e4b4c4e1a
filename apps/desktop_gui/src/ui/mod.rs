//! UI layer for the desktop form.

pub mod app;
mod secret_input;

pub use app::SlidegenApp;
