//! Suggestion service
//!
//! Composes the request for each kind of suggestion, calls the completion
//! port and validates the reply. Nothing here touches a document; accepted
//! suggestions are applied with [`crate::apply`].

use std::sync::Arc;

use tracing::{debug, warn};

use domain_document::{ColumnRegistry, Company, InterpretedReceipt, Item};

use crate::error::AssistantError;
use crate::parse::{parse_bulk_items, parse_items, parse_receipt, parse_text, BulkCategory};
use crate::ports::CompletionPort;
use crate::prompt::{system_instruction, user_prompt};
use crate::request::{CompletionRequest, SuggestionKind, SuggestionRequest};
use crate::schema::{bulk_schema, items_schema, receipt_schema};

const TEXT_TEMPERATURE: f32 = 0.7;
const STRUCTURED_TEMPERATURE: f32 = 0.2;

#[derive(Clone)]
pub struct SuggestionService {
    port: Arc<dyn CompletionPort>,
}

impl SuggestionService {
    pub fn new(port: Arc<dyn CompletionPort>) -> Self {
        Self { port }
    }

    fn completion(
        &self,
        kind: SuggestionKind,
        request: &SuggestionRequest,
        company: Option<&Company>,
        registry: &ColumnRegistry,
    ) -> CompletionRequest {
        let response_schema = match kind {
            SuggestionKind::Description | SuggestionKind::Terms => None,
            SuggestionKind::Items => Some(items_schema(registry)),
            SuggestionKind::BulkItems => Some(bulk_schema(registry)),
            SuggestionKind::Receipt => Some(receipt_schema()),
        };
        CompletionRequest {
            kind,
            system_instruction: system_instruction(kind, request, company),
            prompt: user_prompt(kind, request, registry),
            images: request.images.clone(),
            response_schema,
            temperature: if kind.is_structured() {
                STRUCTURED_TEMPERATURE
            } else {
                TEXT_TEMPERATURE
            },
        }
    }

    async fn call(
        &self,
        kind: SuggestionKind,
        request: &SuggestionRequest,
        company: Option<&Company>,
        registry: &ColumnRegistry,
    ) -> Result<String, AssistantError> {
        request.validate(kind)?;
        let completion = self.completion(kind, request, company, registry);
        debug!(kind = ?kind, images = completion.images.len(), "Requesting suggestion");
        self.port.complete(completion).await.map_err(|e| {
            warn!(kind = ?kind, error = %e, retry_after_secs = ?e.retry_after_secs(), "Suggestion request failed");
            AssistantError::from(e)
        })
    }

    pub async fn suggest_description(
        &self,
        request: &SuggestionRequest,
        company: Option<&Company>,
    ) -> Result<String, AssistantError> {
        let raw = self
            .call(SuggestionKind::Description, request, company, &ColumnRegistry::seeded())
            .await?;
        parse_text(&raw).inspect_err(|e| warn!(error = %e, "Malformed description suggestion"))
    }

    pub async fn suggest_terms(
        &self,
        request: &SuggestionRequest,
        company: Option<&Company>,
    ) -> Result<String, AssistantError> {
        let raw = self
            .call(SuggestionKind::Terms, request, company, &ColumnRegistry::seeded())
            .await?;
        parse_text(&raw).inspect_err(|e| warn!(error = %e, "Malformed terms suggestion"))
    }

    /// Item records shaped by the given registry
    pub async fn suggest_items(
        &self,
        request: &SuggestionRequest,
        company: Option<&Company>,
        registry: &ColumnRegistry,
    ) -> Result<Vec<Item>, AssistantError> {
        let raw = self.call(SuggestionKind::Items, request, company, registry).await?;
        parse_items(&raw, registry).inspect_err(|e| warn!(error = %e, "Malformed item suggestion"))
    }

    /// Item records grouped by category name
    pub async fn suggest_bulk(
        &self,
        request: &SuggestionRequest,
        company: Option<&Company>,
        registry: &ColumnRegistry,
    ) -> Result<Vec<BulkCategory>, AssistantError> {
        let raw = self.call(SuggestionKind::BulkItems, request, company, registry).await?;
        parse_bulk_items(&raw, registry).inspect_err(|e| warn!(error = %e, "Malformed bulk suggestion"))
    }

    /// Reads a receipt photo into structured lines and totals
    pub async fn interpret_receipt(&self, request: &SuggestionRequest) -> Result<InterpretedReceipt, AssistantError> {
        let raw = self
            .call(SuggestionKind::Receipt, request, None, &ColumnRegistry::seeded())
            .await?;
        parse_receipt(&raw).inspect_err(|e| warn!(error = %e, "Malformed receipt interpretation"))
    }
}
