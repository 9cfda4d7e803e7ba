//! Third-party ticket DTOs

use base64::Engine;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::TicketId;
use domain_assistant::ImageAttachment;

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TicketCheckRequest {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    /// Either a `data:` URL or bare base64
    #[validate(length(min = 1))]
    pub data: String,
    /// Used when `data` is bare base64
    pub mime_type: Option<String>,
    /// Attach the ticket to the current document and remember its hash
    #[serde(default)]
    pub attach: bool,
}

impl TicketCheckRequest {
    /// Decoded file bytes and their MIME type
    pub fn decode(&self) -> Result<(String, Vec<u8>), ApiError> {
        let (mime_type, payload) = match ImageAttachment::from_data_url(&self.data) {
            Some(attachment) => (attachment.mime_type, attachment.data),
            None => (
                self.mime_type
                    .clone()
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
                self.data.trim().to_string(),
            ),
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| ApiError::BadRequest(format!("Ticket data is not valid base64: {}", e)))?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Ticket file is empty".to_string()));
        }
        Ok((mime_type, bytes))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCheckResponse {
    pub content_hash: String,
    /// The same file was imported before
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<TicketId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(data: &str, mime_type: Option<&str>) -> TicketCheckRequest {
        TicketCheckRequest {
            file_name: "ticket.png".to_string(),
            data: data.to_string(),
            mime_type: mime_type.map(str::to_string),
            attach: false,
        }
    }

    #[test]
    fn test_decodes_data_url() {
        let (mime, bytes) = request("data:image/jpeg;base64,aGVsbG8=", None).decode().unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_decodes_bare_base64_with_mime() {
        let (mime, bytes) = request("aGVsbG8=", Some("image/png")).decode().unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(matches!(request("%%%", None).decode(), Err(ApiError::BadRequest(_))));
    }
}
