//! Worker -> UI events and error modeling for the desktop form.

use std::path::PathBuf;

use shared::{
    domain::{SlidePlan, TemplateFile},
    error::{ClientError, ErrorKind},
};

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    PlanFinished(Result<SlidePlan, ClientError>),
    GenerateFinished(Result<PathBuf, ClientError>),
    TemplateLoaded(TemplateFile),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    WorkerStartup,
    Template,
}

#[derive(Debug, Clone)]
pub struct UiError {
    context: UiErrorContext,
    kind: Option<ErrorKind>,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            context,
            kind: None,
            message: message.into(),
        }
    }

    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        Self {
            context,
            kind: Some(err.kind()),
            message: err.to_string(),
        }
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The worker is gone and no further request can succeed.
    pub fn is_fatal(&self) -> bool {
        self.context == UiErrorContext::WorkerStartup
    }
}
