use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    domain::{SlidePlan, TemplateFile},
    error::ClientError,
    protocol::{
        GenerateRequest, PlanRequest, FIELD_TEMPLATE, GENERATED_FILENAME, GENERATE_PATH,
        PLAN_PATH,
    },
};
use tracing::{info, warn};

pub mod config;
mod controller;
mod download;

pub use controller::{ApiKey, FormController, FormState, RequestKind};
pub use download::{DirectoryDownloadSink, DownloadSink};

/// Remote collaborator that turns text into a slide plan or a presentation.
#[async_trait]
pub trait DeckBackend: Send + Sync {
    async fn plan(&self, request: &PlanRequest) -> Result<SlidePlan, ClientError>;
    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>, ClientError>;
}

#[async_trait]
impl<T> DeckBackend for Arc<T>
where
    T: DeckBackend + ?Sized,
{
    async fn plan(&self, request: &PlanRequest) -> Result<SlidePlan, ClientError> {
        (**self).plan(request).await
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>, ClientError> {
        (**self).generate(request).await
    }
}

pub struct HttpDeckClient {
    http: Client,
    backend_url: String,
}

impl HttpDeckClient {
    /// `backend_url` is expected to be normalized already (see [`config::normalize_backend_url`]).
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            backend_url: backend_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.backend_url)
    }

    async fn post_form(&self, path: &str, form: Form) -> Result<Response, ClientError> {
        let response = self
            .http
            .post(self.endpoint(path))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(transport_error)?;
            warn!(path, status = status.as_u16(), "deck backend rejected request");
            return Err(ClientError::Backend {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl DeckBackend for HttpDeckClient {
    async fn plan(&self, request: &PlanRequest) -> Result<SlidePlan, ClientError> {
        info!(
            provider = request.provider.as_str(),
            text_len = request.text.len(),
            has_tone = request.tone.is_some(),
            "deck: requesting slide plan"
        );
        let response = self.post_form(PLAN_PATH, text_form(request)).await?;
        let body = response.bytes().await.map_err(transport_error)?;
        let plan: SlidePlan = serde_json::from_slice(&body)
            .map_err(|e| ClientError::Parse(format!("invalid slide plan: {e}")))?;
        info!(slides = plan.slides.len(), "deck: slide plan received");
        Ok(plan)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>, ClientError> {
        info!(
            provider = request.plan.provider.as_str(),
            text_len = request.plan.text.len(),
            has_tone = request.plan.tone.is_some(),
            template = request.template.as_ref().map(TemplateFile::filename),
            "deck: requesting presentation"
        );
        let mut form = text_form(&request.plan);
        if let Some(template) = &request.template {
            form = form.part(FIELD_TEMPLATE, template_part(template)?);
        }
        let response = self.post_form(GENERATE_PATH, form).await?;
        let bytes = response.bytes().await.map_err(transport_error)?;
        info!(size_bytes = bytes.len(), "deck: presentation received");
        Ok(bytes.to_vec())
    }
}

fn text_form(request: &PlanRequest) -> Form {
    request
        .text_fields()
        .into_iter()
        .fold(Form::new(), |form, (name, value)| {
            form.text(name, value.to_string())
        })
}

fn template_part(template: &TemplateFile) -> Result<Part, ClientError> {
    let mime = mime_guess::from_path(template.filename()).first_or_octet_stream();
    Part::bytes(template.bytes().to_vec())
        .file_name(template.filename().to_string())
        .mime_str(mime.essence_str())
        .map_err(|e| ClientError::InvalidTemplate(format!("unusable content type: {e}")))
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_decode() {
        ClientError::Parse(err.to_string())
    } else {
        ClientError::Network(err.to_string())
    }
}

/// Fetches the presentation and hands it to `sink` as `generated.pptx`.
pub async fn generate_to_sink<B, D>(
    backend: &B,
    sink: &D,
    request: &GenerateRequest,
) -> Result<PathBuf, ClientError>
where
    B: DeckBackend + ?Sized,
    D: DownloadSink + ?Sized,
{
    let bytes = backend.generate(request).await?;
    sink.present(GENERATED_FILENAME, &bytes).await
}

/// Reads a template from disk, rejecting anything that is not `.pptx`/`.potx`.
pub async fn load_template(path: &std::path::Path) -> Result<TemplateFile, ClientError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            ClientError::InvalidTemplate(format!("'{}' has no file name", path.display()))
        })?
        .to_string();
    if !shared::domain::has_template_extension(&filename) {
        return Err(ClientError::InvalidTemplate(format!(
            "'{filename}' is not a .pptx or .potx file"
        )));
    }
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        ClientError::InvalidTemplate(format!("failed to read '{}': {e}", path.display()))
    })?;
    TemplateFile::new(filename, bytes)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
