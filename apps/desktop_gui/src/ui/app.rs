use std::{path::PathBuf, time::Duration};

use client_core::FormController;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::{Provider, SlidePlan, TEMPLATE_EXTENSIONS},
    error::ClientError,
};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{UiError, UiEvent},
        orchestration::dispatch_backend_command,
    },
    ui::secret_input::SecretInput,
};

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 20, 60);
const MAX_CONTENT_WIDTH: f32 = 900.0;

pub struct SlidegenApp {
    controller: FormController,
    draft: Draft,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    status: String,
    loading_template: bool,
    worker_failed: bool,
}

/// Widget-side copies of the form fields. Edits are committed to the
/// controller through its setters.
struct Draft {
    text: String,
    tone: String,
    provider: Provider,
    api_key: SecretInput,
}

/// One numbered entry of the slide preview.
#[derive(Debug, PartialEq, Eq)]
pub struct SlideRow<'a> {
    pub heading: String,
    pub bullets: &'a [String],
    pub notes: Option<&'a str>,
}

pub fn slide_rows(plan: &SlidePlan) -> Vec<SlideRow<'_>> {
    plan.slides
        .iter()
        .enumerate()
        .map(|(index, slide)| SlideRow {
            heading: format!("{}. {}", index + 1, slide.title),
            bullets: &slide.bullets,
            notes: slide.visible_notes(),
        })
        .collect()
}

pub fn button_labels(busy: bool) -> (&'static str, &'static str) {
    if busy {
        ("Planning…", "Generating…")
    } else {
        ("Preview Plan", "Generate .pptx")
    }
}

impl SlidegenApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        default_provider: Provider,
    ) -> Self {
        Self {
            controller: FormController::with_provider(default_provider),
            draft: Draft {
                text: String::new(),
                tone: String::new(),
                provider: default_provider,
                api_key: SecretInput::default(),
            },
            cmd_tx,
            ui_rx,
            status: "Starting…".to_string(),
            loading_template: false,
            worker_failed: false,
        }
    }

    #[cfg(test)]
    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    #[cfg(test)]
    pub fn controller_mut(&mut self) -> &mut FormController {
        &mut self.controller
    }

    #[cfg(test)]
    pub fn status(&self) -> &str {
        &self.status
    }

    #[cfg(test)]
    pub fn is_loading_template(&self) -> bool {
        self.loading_template
    }

    pub fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::PlanFinished(result) => {
                    self.status = match &result {
                        Ok(plan) => format!("Plan ready: {} slides", plan.slides.len()),
                        Err(_) => "Planning failed".to_string(),
                    };
                    self.controller.complete_plan(result);
                }
                UiEvent::GenerateFinished(result) => {
                    self.status = match &result {
                        Ok(path) => format!("Saved {}", path.display()),
                        Err(_) => "Generation failed".to_string(),
                    };
                    self.controller.complete_generate(result);
                }
                UiEvent::TemplateLoaded(template) => {
                    self.loading_template = false;
                    self.status = format!("Template selected: {}", template.filename());
                    self.controller.set_template(template);
                }
                UiEvent::Error(err) => self.apply_error(err),
            }
        }
    }

    fn apply_error(&mut self, err: UiError) {
        tracing::warn!(context = ?err.context(), kind = ?err.kind(), "ui error: {}", err.message());
        self.loading_template = false;
        if err.is_fatal() {
            self.worker_failed = true;
        }
        self.status = err.message().to_string();
        self.controller.set_error(err.message());
    }

    pub fn start_plan(&mut self) {
        if self.loading_template {
            return;
        }
        let Some(request) = self.controller.begin_plan() else {
            return;
        };
        if !dispatch_backend_command(&self.cmd_tx, BackendCommand::Plan(request), &mut self.status)
        {
            let reason = self.status.clone();
            self.controller.complete_plan(Err(ClientError::Network(reason)));
        }
    }

    pub fn start_generate(&mut self) {
        if self.loading_template {
            return;
        }
        let Some(request) = self.controller.begin_generate() else {
            return;
        };
        if !dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Generate(request),
            &mut self.status,
        ) {
            let reason = self.status.clone();
            self.controller
                .complete_generate(Err(ClientError::Network(reason)));
        }
    }

    fn pick_template(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Choose a PowerPoint template")
            .add_filter("PowerPoint template", &TEMPLATE_EXTENSIONS)
            .pick_file();
        self.queue_template_load(picked);
    }

    /// Hands the picked file to the worker. `None` means the dialog was
    /// cancelled and the form stays as it was.
    pub fn queue_template_load(&mut self, picked: Option<PathBuf>) {
        let Some(path) = picked else {
            tracing::debug!("template selection cancelled");
            return;
        };
        if dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::LoadTemplate(path),
            &mut self.status,
        ) {
            self.loading_template = true;
            self.status = "Loading template…".to_string();
        }
    }

    fn show_header(&self, ui: &mut egui::Ui) {
        ui.heading(
            egui::RichText::new("Your Text, Your Style – Auto-Generate a Presentation").size(26.0),
        );
        ui.label(
            egui::RichText::new(
                "Paste text, pick an LLM provider, add your API key, optionally upload a .pptx/.potx template, and download the generated slides.",
            )
            .color(egui::Color32::GRAY),
        );
        ui.add_space(12.0);
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        let busy = self.controller.is_busy();

        ui.label("Provider");
        let previous = self.draft.provider;
        egui::ComboBox::from_id_salt("provider")
            .selected_text(self.draft.provider.label())
            .show_ui(ui, |ui| {
                for provider in Provider::ALL {
                    ui.selectable_value(&mut self.draft.provider, provider, provider.label());
                }
            });
        if self.draft.provider != previous {
            self.controller.set_provider(self.draft.provider);
        }
        ui.add_space(6.0);

        ui.label("API Key (never stored)");
        let key_edit = ui.add(
            egui::TextEdit::singleline(&mut self.draft.api_key)
                .password(true)
                .hint_text("Paste your provider API key")
                .desired_width(f32::INFINITY),
        );
        if key_edit.changed() {
            self.controller
                .set_api_key(egui::TextBuffer::as_str(&self.draft.api_key));
        }
        ui.add_space(6.0);

        ui.label("Optional tone / style (e.g., “investor pitch”, “technical”)");
        let tone_edit = ui.add(
            egui::TextEdit::singleline(&mut self.draft.tone)
                .hint_text("professional, investor pitch, research summary…")
                .desired_width(f32::INFINITY),
        );
        if tone_edit.changed() {
            self.controller.set_tone(self.draft.tone.as_str());
        }
        ui.add_space(6.0);

        ui.label("Your text");
        let text_edit = ui.add(
            egui::TextEdit::multiline(&mut self.draft.text)
                .desired_rows(8)
                .hint_text("Paste a large block of text or markdown…")
                .desired_width(f32::INFINITY),
        );
        if text_edit.changed() {
            self.controller.set_text(self.draft.text.as_str());
        }
        ui.add_space(6.0);

        ui.label("PowerPoint template (.pptx / .potx, optional)");
        let template_name = self
            .controller
            .form()
            .template
            .as_ref()
            .map(|t| t.filename().to_string());
        let mut pick = false;
        let mut clear = false;
        ui.horizontal(|ui| {
            let pick_label = if self.loading_template {
                "Loading…"
            } else {
                "Choose file…"
            };
            pick = ui
                .add_enabled(
                    !self.loading_template && !busy && !self.worker_failed,
                    egui::Button::new(pick_label),
                )
                .clicked();
            match &template_name {
                Some(name) => {
                    ui.label(name);
                    clear = ui.add_enabled(!busy, egui::Button::new("Remove")).clicked();
                }
                None => {
                    ui.weak("No file chosen");
                }
            }
        });
        if pick {
            self.pick_template();
        }
        if clear {
            self.controller.clear_template();
        }
        ui.add_space(10.0);

        let enabled =
            self.controller.can_submit() && !self.worker_failed && !self.loading_template;
        let (plan_label, generate_label) = button_labels(busy);
        let mut plan_clicked = false;
        let mut generate_clicked = false;
        ui.horizontal(|ui| {
            plan_clicked = ui
                .add_enabled(enabled, egui::Button::new(plan_label))
                .clicked();
            generate_clicked = ui
                .add_enabled(enabled, egui::Button::new(generate_label))
                .clicked();
            if busy {
                ui.spinner();
            }
        });
        if plan_clicked {
            self.start_plan();
        } else if generate_clicked {
            self.start_generate();
        }

        if let Some(err) = self.controller.error() {
            ui.colored_label(ERROR_COLOR, format!("Error: {err}"));
        } else if let Some(path) = self.controller.last_download() {
            ui.label(format!("Saved {}", path.display()));
        }
    }

    fn show_preview(&self, ui: &mut egui::Ui) {
        let Some(plan) = self.controller.preview() else {
            return;
        };
        ui.add_space(20.0);
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading("Slide Preview");
            if plan.is_empty() {
                ui.weak("The backend returned no slides.");
            }
            for (index, row) in slide_rows(plan).into_iter().enumerate() {
                ui.label(egui::RichText::new(row.heading).strong());
                ui.indent(("slide", index), |ui| {
                    for bullet in row.bullets {
                        ui.label(format!("• {bullet}"));
                    }
                    if let Some(notes) = row.notes {
                        egui::CollapsingHeader::new("Notes")
                            .id_salt(("notes", index))
                            .default_open(false)
                            .show(ui, |ui| {
                                ui.label(notes);
                            });
                    }
                });
                ui.add_space(8.0);
            }
        });
    }

    fn show_footer(&self, ui: &mut egui::Ui) {
        ui.add_space(30.0);
        ui.separator();
        ui.weak("⭐ Optional enhancements supported: speaker notes, tone control, plan preview.");
        ui.weak(&self.status);
    }
}

impl eframe::App for SlidegenApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.set_max_width(MAX_CONTENT_WIDTH);
                    self.show_header(ui);
                    self.show_form(ui);
                    self.show_preview(ui);
                    self.show_footer(ui);
                });
        });

        if self.controller.is_busy() || self.loading_template {
            ctx.request_repaint_after(Duration::from_millis(50));
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
