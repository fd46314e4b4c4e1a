use std::{fmt::Write as _, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    config::{load_settings, normalize_backend_url},
    load_template, DirectoryDownloadSink, FormController, HttpDeckClient,
};
use shared::domain::{Provider, SlidePlan};

const API_KEY_ENV: &str = "SLIDEGEN_API_KEY";

/// Turn a block of text into a slide outline or a generated .pptx.
#[derive(Parser, Debug)]
#[command(name = "slidegen")]
struct Cli {
    /// Overrides the configured backend address.
    #[arg(long, global = true)]
    backend_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preview the slide plan.
    Plan {
        #[command(flatten)]
        form: FormArgs,
    },
    /// Generate the presentation and save it as generated.pptx.
    Generate {
        #[command(flatten)]
        form: FormArgs,
        /// Optional .pptx/.potx template.
        #[arg(long)]
        template: Option<PathBuf>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct FormArgs {
    #[arg(long, conflicts_with = "text_file", required_unless_present = "text_file")]
    text: Option<String>,
    #[arg(long)]
    text_file: Option<PathBuf>,
    /// openai, anthropic or gemini.
    #[arg(long)]
    provider: Option<Provider>,
    /// Falls back to SLIDEGEN_API_KEY.
    #[arg(long)]
    api_key: Option<String>,
    /// e.g. "investor pitch", "technical".
    #[arg(long, default_value = "")]
    tone: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings()?;
    if let Some(url) = &cli.backend_url {
        settings.backend_url = normalize_backend_url(url)?;
    }
    tracing::info!(backend_url = %settings.backend_url, "slidegen starting");
    let backend = HttpDeckClient::new(settings.backend_url.clone());
    let mut controller = FormController::with_provider(settings.default_provider);

    match cli.command {
        Command::Plan { form } => {
            fill_form(&mut controller, form).await?;
            ensure_submittable(&controller)?;
            controller.request_plan(&backend).await;
            surface_error(&controller)?;
            if let Some(plan) = controller.preview() {
                print!("{}", render_plan(plan));
            }
        }
        Command::Generate {
            form,
            template,
            output_dir,
        } => {
            fill_form(&mut controller, form).await?;
            if let Some(path) = template {
                controller.set_template(load_template(&path).await?);
            }
            ensure_submittable(&controller)?;
            let sink = DirectoryDownloadSink::new(output_dir.unwrap_or(settings.download_dir));
            controller.request_generate(&backend, &sink).await;
            surface_error(&controller)?;
            if let Some(path) = controller.last_download() {
                println!("Saved {}", path.display());
            }
        }
    }

    Ok(())
}

async fn fill_form(controller: &mut FormController, form: FormArgs) -> Result<()> {
    let text = match (form.text, form.text_file) {
        (Some(text), _) => text,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read text from '{}'", path.display()))?,
        (None, None) => String::new(),
    };
    controller.set_text(text);
    controller.set_tone(form.tone);
    if let Some(provider) = form.provider {
        controller.set_provider(provider);
    }
    let api_key = form
        .api_key
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .unwrap_or_default();
    controller.set_api_key(api_key);
    Ok(())
}

fn ensure_submittable(controller: &FormController) -> Result<()> {
    if controller.can_submit() {
        return Ok(());
    }
    if controller.form().text.is_empty() {
        return Err(anyhow!("text is empty"));
    }
    Err(anyhow!(
        "an API key is required (pass --api-key or set {API_KEY_ENV})"
    ))
}

fn surface_error(controller: &FormController) -> Result<()> {
    match controller.error() {
        Some(message) => Err(anyhow!(message.to_string())),
        None => Ok(()),
    }
}

fn render_plan(plan: &SlidePlan) -> String {
    let mut out = String::from("Slide Preview\n");
    if plan.is_empty() {
        out.push_str("(no slides)\n");
        return out;
    }
    for (index, slide) in plan.slides.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, slide.title);
        for bullet in &slide.bullets {
            let _ = writeln!(out, "   - {bullet}");
        }
        if let Some(notes) = slide.visible_notes() {
            let _ = writeln!(out, "   Notes: {notes}");
        }
    }
    out
}
