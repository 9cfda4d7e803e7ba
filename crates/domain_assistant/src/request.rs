//! Suggestion and completion request types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AssistantError;

/// What the caller wants drafted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionKind {
    Description,
    Terms,
    Items,
    BulkItems,
    Receipt,
}

impl SuggestionKind {
    /// Whether the response is structured JSON rather than free text
    pub fn is_structured(&self) -> bool {
        !matches!(self, SuggestionKind::Description | SuggestionKind::Terms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Concise,
    Detailed,
}

impl Tone {
    pub fn instruction(&self) -> &'static str {
        match self {
            Tone::Professional => "Write in a formal, professional register.",
            Tone::Friendly => "Write in a warm, approachable register while staying precise.",
            Tone::Concise => "Be brief. Prefer short sentences and omit filler.",
            Tone::Detailed => "Be thorough. Spell out scope, materials and conditions.",
        }
    }
}

/// Grade of materials and workmanship suggested items are priced at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Quality {
    Economy,
    #[default]
    Standard,
    Premium,
}

impl Quality {
    pub fn instruction(&self) -> &'static str {
        match self {
            Quality::Economy => "Assume economy-grade materials and the lowest reasonable market prices.",
            Quality::Standard => "Assume standard-grade materials and typical market prices.",
            Quality::Premium => "Assume premium-grade materials, careful finishing and upper-range market prices.",
        }
    }
}

/// An inline image sent alongside the prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    pub mime_type: String,
    /// Base64 payload without the `data:` prefix
    pub data: String,
}

impl ImageAttachment {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Splits a `data:<mime>;base64,<payload>` URL
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.trim().strip_prefix("data:")?;
        let (meta, payload) = rest.split_once(',')?;
        let mime_type = meta.strip_suffix(";base64")?;
        if mime_type.is_empty() || payload.is_empty() {
            return None;
        }
        Some(Self::new(mime_type, payload))
    }
}

/// A user's request for drafted content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestionRequest {
    pub prompt: String,
    pub images: Vec<ImageAttachment>,
    pub tone: Tone,
    pub quality: Quality,
}

impl SuggestionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.images.push(image);
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Rejects requests that give the service nothing to work from
    pub fn validate(&self, kind: SuggestionKind) -> Result<(), AssistantError> {
        if kind == SuggestionKind::Receipt {
            if self.images.is_empty() {
                return Err(AssistantError::MissingImage);
            }
            return Ok(());
        }
        if self.prompt.trim().is_empty() && self.images.is_empty() {
            return Err(AssistantError::EmptyPrompt);
        }
        Ok(())
    }
}

/// Provider-neutral call handed to a [`crate::ports::CompletionPort`]
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub kind: SuggestionKind,
    pub system_instruction: String,
    pub prompt: String,
    pub images: Vec<ImageAttachment>,
    /// JSON response schema; `None` asks for plain text
    pub response_schema: Option<Value>,
    pub temperature: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_split() {
        let image = ImageAttachment::from_data_url("data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(image, Some(ImageAttachment::new("image/png", "iVBORw0KGgo=")));
        assert_eq!(ImageAttachment::from_data_url("image/png;base64,abc"), None);
        assert_eq!(ImageAttachment::from_data_url("data:image/png,abc"), None);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            SuggestionRequest::new("  ").validate(SuggestionKind::Items),
            Err(AssistantError::EmptyPrompt)
        ));
        assert!(matches!(
            SuggestionRequest::new("store receipt").validate(SuggestionKind::Receipt),
            Err(AssistantError::MissingImage)
        ));

        let with_photo = SuggestionRequest::default().with_image(ImageAttachment::new("image/jpeg", "abc"));
        assert!(with_photo.validate(SuggestionKind::Items).is_ok());
        assert!(with_photo.validate(SuggestionKind::Receipt).is_ok());
    }

    #[test]
    fn test_request_defaults_deserialize() {
        let request: SuggestionRequest = serde_json::from_str(r#"{"prompt":"paint a wall"}"#)
            .unwrap_or_default();
        assert_eq!(request.tone, Tone::Professional);
        assert_eq!(request.quality, Quality::Standard);
        assert!(request.images.is_empty());
    }
}
