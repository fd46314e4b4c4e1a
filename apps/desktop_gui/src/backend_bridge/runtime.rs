//! Runtime bridge between UI command queue and backend event intake.

use std::{path::PathBuf, thread};

use client_core::{
    generate_to_sink, load_template, DeckBackend, DirectoryDownloadSink, HttpDeckClient,
};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub backend_url: String,
    pub download_dir: PathBuf,
}

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, config: WorkerConfig) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::WorkerStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let backend = HttpDeckClient::new(config.backend_url.clone());
            let sink = DirectoryDownloadSink::new(config.download_dir.clone());
            tracing::info!(
                backend_url = %config.backend_url,
                download_dir = %config.download_dir.display(),
                "backend worker ready"
            );
            let _ = ui_tx.try_send(UiEvent::Info("Ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                let event = run_command(&backend, &sink, cmd).await;
                if ui_tx.send(event).is_err() {
                    break;
                }
            }
            tracing::info!("backend worker stopped");
        });
    });
}

/// Every command is answered with exactly one event.
async fn run_command<B>(backend: &B, sink: &DirectoryDownloadSink, cmd: BackendCommand) -> UiEvent
where
    B: DeckBackend + ?Sized,
{
    match cmd {
        BackendCommand::Plan(request) => UiEvent::PlanFinished(backend.plan(&request).await),
        BackendCommand::Generate(request) => {
            UiEvent::GenerateFinished(generate_to_sink(backend, sink, &request).await)
        }
        BackendCommand::LoadTemplate(path) => match load_template(&path).await {
            Ok(template) => UiEvent::TemplateLoaded(template),
            Err(err) => UiEvent::Error(UiError::from_client_error(UiErrorContext::Template, &err)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use shared::{
        domain::{Provider, Slide, SlidePlan},
        error::ClientError,
        protocol::{GenerateRequest, PlanRequest, GENERATED_FILENAME},
    };

    struct FixedBackend;

    #[async_trait]
    impl DeckBackend for FixedBackend {
        async fn plan(&self, _request: &PlanRequest) -> Result<SlidePlan, ClientError> {
            Ok(SlidePlan {
                slides: vec![Slide {
                    title: "Intro".into(),
                    bullets: vec!["a".into()],
                    notes: None,
                }],
            })
        }

        async fn generate(&self, _request: &GenerateRequest) -> Result<Vec<u8>, ClientError> {
            Err(ClientError::Backend {
                status: 502,
                body: "upstream timeout".into(),
            })
        }
    }

    fn request() -> PlanRequest {
        PlanRequest::new("text", Provider::Openai, "key", None)
    }

    #[tokio::test]
    async fn plan_command_reports_finished_plan() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = DirectoryDownloadSink::new(dir.path());

        let event = run_command(&FixedBackend, &sink, BackendCommand::Plan(request())).await;
        match event {
            UiEvent::PlanFinished(Ok(plan)) => assert_eq!(plan.slides[0].title, "Intro"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_command_reports_backend_failure_without_saving() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = DirectoryDownloadSink::new(dir.path());

        let event = run_command(
            &FixedBackend,
            &sink,
            BackendCommand::Generate(GenerateRequest {
                plan: request(),
                template: None,
            }),
        )
        .await;
        match event {
            UiEvent::GenerateFinished(Err(err)) => {
                assert_eq!(err.to_string(), "upstream timeout")
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(!dir.path().join(GENERATED_FILENAME).exists());
    }

    #[tokio::test]
    async fn template_load_always_answers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sink = DirectoryDownloadSink::new(dir.path());

        let missing = dir.path().join("missing.pptx");
        match run_command(&FixedBackend, &sink, BackendCommand::LoadTemplate(missing)).await {
            UiEvent::Error(err) => assert!(!err.is_fatal()),
            other => panic!("unexpected event: {other:?}"),
        }

        let picked = dir.path().join("brand.potx");
        std::fs::write(&picked, [1u8, 2, 3]).expect("write template");
        match run_command(&FixedBackend, &sink, BackendCommand::LoadTemplate(picked)).await {
            UiEvent::TemplateLoaded(template) => {
                assert_eq!(template.filename(), "brand.potx");
                assert_eq!(template.bytes(), &[1, 2, 3]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
