//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use shared::protocol::{GenerateRequest, PlanRequest};

#[derive(Debug)]
pub enum BackendCommand {
    Plan(PlanRequest),
    Generate(GenerateRequest),
    /// Reads a template the user picked on the UI thread.
    LoadTemplate(PathBuf),
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Plan(_) => "plan",
            BackendCommand::Generate(_) => "generate",
            BackendCommand::LoadTemplate(_) => "load_template",
        }
    }
}
