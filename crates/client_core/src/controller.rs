//! Form state and the per-request Idle -> Busy -> Idle lifecycle.

use std::{fmt, path::PathBuf};

use shared::{
    domain::{Provider, SlidePlan, TemplateFile},
    error::ClientError,
    protocol::{GenerateRequest, PlanRequest},
};
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::{generate_to_sink, DeckBackend, DownloadSink};

/// Provider API key. Never logged, wiped from memory on drop.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub text: String,
    pub tone: String,
    pub provider: Provider,
    pub api_key: ApiKey,
    pub template: Option<TemplateFile>,
}

impl FormState {
    fn plan_request(&self) -> PlanRequest {
        PlanRequest::new(
            self.text.clone(),
            self.provider,
            self.api_key.expose(),
            Some(self.tone.clone()),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Plan,
    Generate,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Plan => "plan",
            RequestKind::Generate => "generate",
        }
    }
}

/// Owns everything the form shows: inputs, the last plan preview, and the
/// busy/error flags. Network work happens elsewhere; the controller only
/// hands out request snapshots and applies their outcomes.
#[derive(Debug, Default)]
pub struct FormController {
    form: FormState,
    preview: Option<SlidePlan>,
    in_flight: Option<RequestKind>,
    error: Option<String>,
    last_download: Option<PathBuf>,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(provider: Provider) -> Self {
        let mut controller = Self::new();
        controller.form.provider = provider;
        controller
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.form.text = text.into();
    }

    pub fn set_tone(&mut self, tone: impl Into<String>) {
        self.form.tone = tone.into();
    }

    pub fn set_provider(&mut self, provider: Provider) {
        self.form.provider = provider;
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.form.api_key = ApiKey::new(api_key);
    }

    pub fn set_template(&mut self, template: TemplateFile) {
        self.form.template = Some(template);
    }

    pub fn clear_template(&mut self) {
        self.form.template = None;
    }

    pub fn preview(&self) -> Option<&SlidePlan> {
        self.preview.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Records a failure that happened outside a request, e.g. a template that
    /// could not be read.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn last_download(&self) -> Option<&std::path::Path> {
        self.last_download.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<RequestKind> {
        self.in_flight
    }

    /// Whether the plan/generate triggers are enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_busy() && !self.form.text.is_empty() && !self.form.api_key.is_empty()
    }

    pub fn begin_plan(&mut self) -> Option<PlanRequest> {
        self.begin(RequestKind::Plan)?;
        Some(self.form.plan_request())
    }

    pub fn begin_generate(&mut self) -> Option<GenerateRequest> {
        self.begin(RequestKind::Generate)?;
        Some(GenerateRequest {
            plan: self.form.plan_request(),
            template: self.form.template.clone(),
        })
    }

    fn begin(&mut self, kind: RequestKind) -> Option<()> {
        if !self.can_submit() {
            debug!(request = kind.as_str(), busy = self.is_busy(), "form: submit ignored");
            return None;
        }
        self.error = None;
        self.in_flight = Some(kind);
        Some(())
    }

    pub fn complete_plan(&mut self, result: Result<SlidePlan, ClientError>) {
        self.finish(RequestKind::Plan);
        match result {
            Ok(plan) => {
                info!(slides = plan.slides.len(), "form: preview updated");
                self.preview = Some(plan);
            }
            Err(err) => self.fail(RequestKind::Plan, &err),
        }
    }

    pub fn complete_generate(&mut self, result: Result<PathBuf, ClientError>) {
        self.finish(RequestKind::Generate);
        match result {
            Ok(path) => {
                info!(path = %path.display(), "form: presentation saved");
                self.last_download = Some(path);
            }
            Err(err) => self.fail(RequestKind::Generate, &err),
        }
    }

    fn finish(&mut self, kind: RequestKind) {
        if self.in_flight != Some(kind) {
            warn!(
                request = kind.as_str(),
                in_flight = self.in_flight.map(RequestKind::as_str),
                "form: completion does not match the request in flight"
            );
        }
        self.in_flight = None;
    }

    fn fail(&mut self, kind: RequestKind, err: &ClientError) {
        warn!(request = kind.as_str(), kind = ?err.kind(), "form: request failed: {err}");
        self.error = Some(err.to_string());
    }

    /// Runs a whole plan request. Returns `false` when the form was not
    /// submittable and nothing was sent.
    pub async fn request_plan<B>(&mut self, backend: &B) -> bool
    where
        B: DeckBackend + ?Sized,
    {
        let Some(request) = self.begin_plan() else {
            return false;
        };
        let result = backend.plan(&request).await;
        self.complete_plan(result);
        true
    }

    /// Runs a whole generate request and hands the payload to `sink` as
    /// `generated.pptx`.
    pub async fn request_generate<B, D>(&mut self, backend: &B, sink: &D) -> bool
    where
        B: DeckBackend + ?Sized,
        D: DownloadSink + ?Sized,
    {
        let Some(request) = self.begin_generate() else {
            return false;
        };
        let result = generate_to_sink(backend, sink, &request).await;
        self.complete_generate(result);
        true
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
