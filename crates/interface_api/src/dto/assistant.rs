//! Drafting assistant DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{CategoryId, ItemId, SubcategoryId, TicketId};
use domain_assistant::{BulkCategory, BulkOutcome, ImageAttachment, Quality, SuggestionRequest, Tone};
use domain_document::{InterpretedReceipt, Item};

use crate::dto::documents::DocumentResponse;
use crate::error::ApiError;

/// Fields shared by every suggestion request. Images are `data:` URLs.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptBody {
    #[validate(length(max = 4000))]
    pub prompt: String,
    #[validate(length(max = 8))]
    pub images: Vec<String>,
    pub tone: Tone,
    pub quality: Quality,
}

impl PromptBody {
    pub fn into_request(self) -> Result<SuggestionRequest, ApiError> {
        let images = self
            .images
            .iter()
            .enumerate()
            .map(|(index, url)| {
                ImageAttachment::from_data_url(url)
                    .ok_or_else(|| ApiError::BadRequest(format!("images[{}] is not a base64 data URL", index)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SuggestionRequest {
            prompt: self.prompt,
            images,
            tone: self.tone,
            quality: self.quality,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextKind {
    Description,
    Terms,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TextSuggestionRequest {
    pub kind: TextKind,
    #[serde(flatten)]
    #[validate(nested)]
    pub body: PromptBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSuggestionResponse {
    pub kind: TextKind,
    pub text: String,
}

/// Where suggested items are inserted in the current document
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemTarget {
    pub category_id: CategoryId,
    pub subcategory_id: SubcategoryId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemSuggestionRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub body: PromptBody,
    /// When set, the items are appended there
    pub target: Option<ItemTarget>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSuggestionResponse {
    pub items: Vec<Item>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inserted: Vec<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentResponse>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkSuggestionRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub body: PromptBody,
    /// Distribute the suggestions over the current document
    #[serde(default)]
    pub apply: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSuggestionResponse {
    pub categories: Vec<BulkCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<BulkOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentResponse>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub body: PromptBody,
    /// Ticket of the current document that receives the interpretation
    pub ticket_id: Option<TicketId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub receipt: InterpretedReceipt,
    pub attached: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_urls_become_attachments() {
        let body = PromptBody {
            prompt: "Paint the lobby".to_string(),
            images: vec!["data:image/png;base64,iVBORw0KGgo=".to_string()],
            ..Default::default()
        };

        let request = body.into_request().unwrap();

        assert_eq!(request.images.len(), 1);
        assert_eq!(request.images[0].mime_type, "image/png");
    }

    #[test]
    fn test_plain_base64_is_rejected() {
        let body = PromptBody {
            images: vec!["iVBORw0KGgo=".to_string()],
            ..Default::default()
        };

        assert!(matches!(body.into_request(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_flattened_body_deserializes() {
        let request: TextSuggestionRequest = serde_json::from_value(serde_json::json!({
            "kind": "terms",
            "prompt": "Net 30",
            "tone": "friendly"
        }))
        .unwrap();

        assert_eq!(request.kind, TextKind::Terms);
        assert_eq!(request.body.prompt, "Net 30");
        assert_eq!(request.body.tone, Tone::Friendly);
    }
}
