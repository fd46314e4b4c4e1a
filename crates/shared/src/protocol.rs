//! Request shapes and multipart field names understood by the deck backend.

use std::fmt;

use zeroize::Zeroize;

use crate::domain::{Provider, TemplateFile};

pub const PLAN_PATH: &str = "/plan";
pub const GENERATE_PATH: &str = "/generate";

pub const FIELD_TEXT: &str = "text";
pub const FIELD_PROVIDER: &str = "provider";
pub const FIELD_API_KEY: &str = "api_key";
pub const FIELD_TONE: &str = "tone";
pub const FIELD_TEMPLATE: &str = "template";

/// Name every generated presentation is saved under.
pub const GENERATED_FILENAME: &str = "generated.pptx";

#[derive(Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub text: String,
    pub provider: Provider,
    pub api_key: String,
    pub tone: Option<String>,
}

impl PlanRequest {
    pub fn new(
        text: impl Into<String>,
        provider: Provider,
        api_key: impl Into<String>,
        tone: Option<String>,
    ) -> Self {
        Self {
            text: text.into(),
            provider,
            api_key: api_key.into(),
            tone: tone.filter(|tone| !tone.is_empty()),
        }
    }

    /// Text form fields in the order they are sent. `tone` is skipped when empty.
    pub fn text_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            (FIELD_TEXT, self.text.as_str()),
            (FIELD_PROVIDER, self.provider.as_str()),
            (FIELD_API_KEY, self.api_key.as_str()),
        ];
        if let Some(tone) = self.tone.as_deref().filter(|tone| !tone.is_empty()) {
            fields.push((FIELD_TONE, tone));
        }
        fields
    }
}

impl fmt::Debug for PlanRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanRequest")
            .field("text_len", &self.text.len())
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("tone", &self.tone)
            .finish()
    }
}

impl Drop for PlanRequest {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub plan: PlanRequest,
    pub template: Option<TemplateFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tone_is_not_sent() {
        let request = PlanRequest::new("body", Provider::Anthropic, "k", Some(String::new()));
        let names: Vec<_> = request.text_fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec![FIELD_TEXT, FIELD_PROVIDER, FIELD_API_KEY]);
    }

    #[test]
    fn tone_is_sent_when_present() {
        let request = PlanRequest::new("body", Provider::Gemini, "k", Some("technical".into()));
        assert_eq!(
            request.text_fields().last().copied(),
            Some((FIELD_TONE, "technical"))
        );
        assert!(request
            .text_fields()
            .contains(&(FIELD_PROVIDER, "gemini")));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let request = PlanRequest::new("body", Provider::Openai, "sk-secret", None);
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
