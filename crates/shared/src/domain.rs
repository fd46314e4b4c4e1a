use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

use crate::error::ClientError;

/// File extensions accepted for a presentation template.
pub const TEMPLATE_EXTENSIONS: [&str; 2] = ["pptx", "potx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Provider {
    #[default]
    Openai,
    Anthropic,
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Openai, Provider::Anthropic, Provider::Gemini];

    /// Value sent in the `provider` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Openai => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Provider::Openai => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Gemini => "Google Gemini",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider '{0}' (expected openai, anthropic or gemini)")]
pub struct ParseProviderError(pub String);

impl FromStr for Provider {
    type Err = ParseProviderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::Openai),
            "anthropic" => Ok(Provider::Anthropic),
            "gemini" => Ok(Provider::Gemini),
            _ => Err(ParseProviderError(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Slide {
    pub title: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Slide {
    /// Speaker notes worth showing; an empty string counts as absent.
    pub fn visible_notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|notes| !notes.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SlidePlan {
    pub slides: Vec<Slide>,
}

impl SlidePlan {
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// A user supplied `.pptx`/`.potx` file forwarded as the `template` part.
#[derive(Clone, PartialEq, Eq)]
pub struct TemplateFile {
    filename: String,
    bytes: Vec<u8>,
}

impl TemplateFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ClientError> {
        let filename = filename.into();
        if !has_template_extension(&filename) {
            return Err(ClientError::InvalidTemplate(format!(
                "'{filename}' is not a .pptx or .potx file"
            )));
        }
        Ok(Self { filename, bytes })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for TemplateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateFile")
            .field("filename", &self.filename)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

pub fn has_template_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            TEMPLATE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_round_trips_through_form_value() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>(), Ok(provider));
        }
        assert_eq!(" Gemini ".parse::<Provider>(), Ok(Provider::Gemini));
        assert!("mistral".parse::<Provider>().is_err());
    }

    #[test]
    fn plan_parses_optional_notes() {
        let plan: SlidePlan = serde_json::from_str(
            r#"{"slides":[{"title":"Intro","bullets":["a","b"],"notes":"n"},{"title":"Next","bullets":[]}]}"#,
        )
        .expect("plan");
        assert_eq!(plan.slides.len(), 2);
        assert_eq!(plan.slides[0].visible_notes(), Some("n"));
        assert_eq!(plan.slides[1].visible_notes(), None);
    }

    #[test]
    fn empty_notes_are_hidden() {
        let slide = Slide {
            title: "t".into(),
            bullets: Vec::new(),
            notes: Some(String::new()),
        };
        assert_eq!(slide.visible_notes(), None);
    }

    #[test]
    fn template_extension_is_checked_case_insensitively() {
        assert!(TemplateFile::new("brand.PPTX", vec![1]).is_ok());
        assert!(TemplateFile::new("brand.potx", vec![1]).is_ok());
        assert!(matches!(
            TemplateFile::new("brand.key", vec![1]),
            Err(ClientError::InvalidTemplate(_))
        ));
        assert!(!has_template_extension("pptx"));
    }

    #[test]
    fn template_debug_omits_contents() {
        let template = TemplateFile::new("deck.pptx", vec![0xAB; 4]).expect("template");
        let rendered = format!("{template:?}");
        assert!(rendered.contains("deck.pptx"));
        assert!(rendered.contains("size_bytes: 4"));
    }
}
