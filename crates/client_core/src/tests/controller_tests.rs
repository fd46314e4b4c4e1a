use super::*;

use std::{
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use shared::{domain::Slide, protocol::GENERATED_FILENAME};

struct CountingBackend {
    calls: AtomicUsize,
    plan: Result<SlidePlan, ClientError>,
    payload: Result<Vec<u8>, ClientError>,
}

impl CountingBackend {
    fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            plan: Ok(intro_plan()),
            payload: Ok(b"deck".to_vec()),
        }
    }

    fn failing(body: &str) -> Self {
        let err = ClientError::Backend {
            status: 500,
            body: body.to_string(),
        };
        Self {
            calls: AtomicUsize::new(0),
            plan: Err(err.clone()),
            payload: Err(err),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeckBackend for CountingBackend {
    async fn plan(&self, _request: &PlanRequest) -> Result<SlidePlan, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.plan.clone()
    }

    async fn generate(&self, _request: &GenerateRequest) -> Result<Vec<u8>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payload.clone()
    }
}

#[derive(Default)]
struct RecordingSink {
    saved: std::sync::Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl DownloadSink for RecordingSink {
    async fn present(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ClientError> {
        self.saved
            .lock()
            .expect("sink lock")
            .push((filename.to_string(), bytes.to_vec()));
        Ok(Path::new("/downloads").join(filename))
    }
}

fn intro_plan() -> SlidePlan {
    SlidePlan {
        slides: vec![Slide {
            title: "Intro".into(),
            bullets: vec!["a".into(), "b".into()],
            notes: Some("n".into()),
        }],
    }
}

fn filled_controller() -> FormController {
    let mut controller = FormController::new();
    controller.set_text("Paste of a long document");
    controller.set_api_key("sk-test");
    controller
}

#[test]
fn empty_text_or_key_disables_submission() {
    let mut controller = FormController::new();
    assert!(!controller.can_submit());
    assert!(controller.begin_plan().is_none());

    controller.set_text("body");
    assert!(!controller.can_submit());
    assert!(controller.begin_generate().is_none());

    controller.set_api_key("key");
    controller.set_text("");
    assert!(!controller.can_submit());
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn empty_inputs_never_reach_the_backend() {
    let backend = CountingBackend::ok();
    let sink = RecordingSink::default();

    let mut controller = FormController::new();
    controller.set_api_key("key");
    assert!(!controller.request_plan(&backend).await);

    let mut controller = FormController::new();
    controller.set_text("body");
    assert!(!controller.request_generate(&backend, &sink).await);

    assert_eq!(backend.calls(), 0);
    assert!(sink.saved.lock().expect("sink lock").is_empty());
}

#[test]
fn busy_flag_blocks_second_submission_until_settled() {
    let mut controller = filled_controller();

    let request = controller.begin_generate().expect("first request");
    assert_eq!(request.plan.text, "Paste of a long document");
    assert!(controller.is_busy());
    assert_eq!(controller.in_flight(), Some(RequestKind::Generate));
    assert!(!controller.can_submit());
    assert!(controller.begin_plan().is_none());
    assert!(controller.begin_generate().is_none());

    controller.complete_generate(Err(ClientError::Network("reset".into())));
    assert!(!controller.is_busy());
    assert!(controller.can_submit());

    controller.begin_generate().expect("second request");
    controller.complete_generate(Ok(PathBuf::from("generated.pptx")));
    assert!(!controller.is_busy());
    assert!(controller.can_submit());
}

#[tokio::test]
async fn plan_success_replaces_preview() {
    let backend = CountingBackend::ok();
    let mut controller = filled_controller();

    assert!(controller.request_plan(&backend).await);

    let preview = controller.preview().expect("preview");
    assert_eq!(preview.slides.len(), 1);
    let slide = &preview.slides[0];
    assert_eq!(slide.title, "Intro");
    assert_eq!(slide.bullets, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(slide.visible_notes(), Some("n"));
    assert!(!controller.is_busy());
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn plan_failure_sets_error_and_leaves_preview_alone() {
    let mut controller = filled_controller();
    assert!(controller.request_plan(&CountingBackend::failing("rate limited")).await);

    assert_eq!(controller.error(), Some("rate limited"));
    assert!(controller.preview().is_none());
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn success_after_failure_clears_error() {
    let mut controller = filled_controller();
    controller
        .request_plan(&CountingBackend::failing("upstream exploded"))
        .await;
    assert!(controller.error().is_some());

    let sink = RecordingSink::default();
    controller
        .request_generate(&CountingBackend::ok(), &sink)
        .await;
    assert_eq!(controller.error(), None);
}

#[tokio::test]
async fn generate_always_presents_generated_pptx() {
    for provider in Provider::ALL {
        for (tone, template) in [
            ("", None),
            ("investor pitch", None),
            (
                "technical",
                Some(TemplateFile::new("corp.potx", vec![7]).expect("template")),
            ),
        ] {
            let backend = CountingBackend::ok();
            let sink = RecordingSink::default();
            let mut controller = filled_controller();
            controller.set_provider(provider);
            controller.set_tone(tone);
            if let Some(template) = template {
                controller.set_template(template);
            }

            assert!(controller.request_generate(&backend, &sink).await);

            let saved = sink.saved.lock().expect("sink lock");
            assert_eq!(saved.len(), 1);
            assert_eq!(saved[0].0, GENERATED_FILENAME);
            assert_eq!(saved[0].1, b"deck".to_vec());
        }
    }
}

#[tokio::test]
async fn generate_failure_skips_download() {
    let sink = RecordingSink::default();
    let mut controller = filled_controller();
    controller
        .request_generate(&CountingBackend::failing("quota exceeded"), &sink)
        .await;

    assert!(sink.saved.lock().expect("sink lock").is_empty());
    assert_eq!(controller.error(), Some("quota exceeded"));
    assert!(controller.last_download().is_none());
}

#[test]
fn request_snapshot_carries_form_inputs() {
    let mut controller = filled_controller();
    controller.set_provider(Provider::Gemini);
    controller.set_tone("research summary");
    controller.set_template(TemplateFile::new("t.pptx", vec![1]).expect("template"));

    let request = controller.begin_generate().expect("request");
    assert_eq!(request.plan.provider, Provider::Gemini);
    assert_eq!(request.plan.api_key, "sk-test");
    assert_eq!(request.plan.tone.as_deref(), Some("research summary"));
    assert_eq!(
        request.template.as_ref().map(TemplateFile::filename),
        Some("t.pptx")
    );

    controller.complete_generate(Ok(PathBuf::from("generated.pptx")));
    controller.clear_template();
    let request = controller.begin_generate().expect("request");
    assert!(request.template.is_none());
}

#[test]
fn api_key_is_redacted_in_debug_output() {
    let controller = filled_controller();
    let rendered = format!("{controller:?}");
    assert!(!rendered.contains("sk-test"));
    assert!(rendered.contains("<redacted>"));
}

#[tokio::test]
async fn shared_backend_handle_is_usable() {
    let backend: Arc<dyn DeckBackend> = Arc::new(CountingBackend::ok());
    let mut controller = filled_controller();
    assert!(controller.request_plan(&backend).await);
    assert!(controller.preview().is_some());
}
