//! Assistant integration tests
//!
//! Drives the suggestion service through the mock completion port: what is
//! sent, how replies are validated against the column registry, and how
//! accepted suggestions land in a document.

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::PortError;
use domain_assistant::{
    apply_bulk, apply_items, parse_bulk_items, parse_items, parse_receipt, AssistantError,
    BulkCategory, ImageAttachment, MockCompletionPort, Quality, SuggestionKind, SuggestionRequest,
    SuggestionService,
};
use domain_document::{ColumnRegistry, DataType, InputType, ItemValue, NewColumn};
use test_utils::{test_item, CompanyFixtures, TestCategoryBuilder, TestDocumentBuilder};

fn service(replies: &[&str]) -> (SuggestionService, Arc<MockCompletionPort>) {
    let port = Arc::new(MockCompletionPort::with_replies(replies.iter().copied()));
    (SuggestionService::new(port.clone()), port)
}

fn registry_with_finish() -> ColumnRegistry {
    let mut registry = ColumnRegistry::seeded();
    registry
        .add_column(
            NewColumn::new("Finish", DataType::String)
                .with_input(InputType::Select)
                .with_options(["Matte", "Gloss"]),
        )
        .unwrap();
    registry
}

mod requests {
    use super::*;

    #[tokio::test]
    async fn test_items_request_carries_registry_schema() {
        let (service, port) = service(&["[]"]);
        let registry = registry_with_finish();
        let company = CompanyFixtures::acme();

        service
            .suggest_items(
                &SuggestionRequest::new("Paint two bedrooms").with_quality(Quality::Economy),
                Some(&company),
                &registry,
            )
            .await
            .unwrap();

        let sent = port.requests();
        assert_eq!(sent.len(), 1);
        let request = &sent[0];
        assert_eq!(request.kind, SuggestionKind::Items);
        let schema = request.response_schema.as_ref().unwrap();
        assert_eq!(schema["items"]["properties"]["finish"]["enum"][1], "Gloss");
        assert!(schema["items"]["properties"].get("total").is_none());
        assert!(request.system_instruction.contains("Painter (day)"));
        assert!(request.system_instruction.contains("economy-grade"));
        assert!(request.prompt.starts_with("Paint two bedrooms"));
    }

    #[tokio::test]
    async fn test_text_request_has_no_schema() {
        let (service, port) = service(&["Full interior repaint."]);
        let text = service
            .suggest_description(&SuggestionRequest::new("repaint"), None)
            .await
            .unwrap();

        assert_eq!(text, "Full interior repaint.");
        assert!(port.requests()[0].response_schema.is_none());
    }

    #[tokio::test]
    async fn test_empty_prompt_never_reaches_the_port() {
        let (service, port) = service(&["unused"]);
        let result = service.suggest_terms(&SuggestionRequest::new(""), None).await;

        assert!(matches!(result, Err(AssistantError::EmptyPrompt)));
        assert!(port.requests().is_empty());
    }

    #[tokio::test]
    async fn test_receipt_sends_images() {
        let reply = r#"{"storeName":"Hardware Depot","date":"2024-03-05","items":[],"subtotal":0,"tax":0,"total":0}"#;
        let (service, port) = service(&[reply]);
        let request = SuggestionRequest::default().with_image(ImageAttachment::new("image/jpeg", "/9j/4AAQ"));

        let receipt = service.interpret_receipt(&request).await.unwrap();

        assert_eq!(receipt.store_name, "Hardware Depot");
        assert_eq!(port.requests()[0].images.len(), 1);
        assert_eq!(port.requests()[0].prompt, "Interpret this receipt.");
    }

    #[tokio::test]
    async fn test_port_failure_is_recoverable() {
        let port = Arc::new(MockCompletionPort::new());
        port.push_error(PortError::RateLimited { retry_after_secs: 5 });
        let service = SuggestionService::new(port);

        let error = service
            .suggest_items(&SuggestionRequest::new("tile a floor"), None, &ColumnRegistry::seeded())
            .await
            .unwrap_err();

        assert!(matches!(error, AssistantError::Port(PortError::RateLimited { .. })));
        assert!(error.is_retryable());
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_items_are_validated_against_registry() {
        let registry = registry_with_finish();
        let raw = r#"```json
        [
          {"description": "Wall paint", "quantity": "3", "unitPrice": 420.5, "finish": "Gloss",
           "total": 9999, "colour": "white"},
          {"description": "Primer", "quantity": 1, "unitPrice": "$180", "finish": "Satin"}
        ]
        ```"#;

        let items = parse_items(raw, &registry).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity(), dec!(3));
        assert_eq!(items[0].unit_price(), dec!(420.5));
        assert_eq!(items[0].get("finish"), Some(&ItemValue::Text("Gloss".to_string())));
        assert!(items[0].get("total").is_none());
        assert!(items[0].get("colour").is_none());
        // an option the column doesn't offer keeps the default
        assert_eq!(items[1].get("finish"), Some(&ItemValue::Text("Matte".to_string())));
        assert_eq!(items[1].unit_price(), dec!(180));
    }

    #[test]
    fn test_type_mismatch_is_malformed() {
        let registry = ColumnRegistry::seeded();
        let raw = r#"[{"description": "Nails", "quantity": "a handful"}]"#;
        assert!(matches!(
            parse_items(raw, &registry),
            Err(AssistantError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_items("not json at all", &registry),
            Err(AssistantError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_items(r#"{"description": "lonely"}"#, &registry),
            Err(AssistantError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_bulk_accepts_schema_and_map_forms() {
        let registry = ColumnRegistry::seeded();
        let schema_form = r#"{"categories":[{"name":"Labor","items":[{"description":"Painter","quantity":2,"unitPrice":950}]}]}"#;
        let map_form = r#"{"Labor":[{"description":"Painter","quantity":2,"unitPrice":950}]}"#;

        let from_schema = parse_bulk_items(schema_form, &registry).unwrap();
        let from_map = parse_bulk_items(map_form, &registry).unwrap();

        assert_eq!(from_schema.len(), 1);
        assert_eq!(from_schema[0].name, "Labor");
        assert_eq!(from_map[0].name, "Labor");
        assert_eq!(from_schema[0].items[0].subtotal(), from_map[0].items[0].subtotal());
        assert!(matches!(
            parse_bulk_items(r#"{"Labor": "Painter"}"#, &registry),
            Err(AssistantError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_receipt_coerces_amounts() {
        let raw = r#"{"storeName":"Hardware Depot","date":"2024-03-05",
            "items":[{"description":"Screws","quantity":2,"unitPrice":"45.50"},
                     {"description":"Drill bit","quantity":1,"unitPrice":120,"total":120}],
            "subtotal":211,"tax":"33.76","total":244.76}"#;

        let receipt = parse_receipt(raw).unwrap();

        assert_eq!(receipt.items[0].total, dec!(91));
        assert_eq!(receipt.tax, dec!(33.76));
        assert_eq!(receipt.total, dec!(244.76));
        assert!(matches!(parse_receipt("[]"), Err(AssistantError::MalformedResponse(_))));
    }
}

mod applying {
    use super::*;

    #[test]
    fn test_apply_items_appends_to_subcategory() {
        let registry = ColumnRegistry::seeded();
        let mut document = TestDocumentBuilder::new().build();
        let category = &document.categories[0];
        let (category_id, subcategory_id) = (category.id, category.subcategories[0].id);

        let items = vec![
            test_item("Paint", dec!(3), dec!(420)),
            test_item("Brushes", dec!(2), dec!(60)),
        ];
        let ids = apply_items(&mut document, category_id, subcategory_id, items, &registry).unwrap();

        assert_eq!(ids.len(), 2);
        assert_eq!(document.items().count(), 2);
    }

    #[test]
    fn test_apply_items_to_missing_category_changes_nothing() {
        let registry = ColumnRegistry::seeded();
        let mut document = TestDocumentBuilder::new().build();
        let before = document.clone();
        let stray = TestCategoryBuilder::new("Elsewhere").build();

        let result = apply_items(
            &mut document,
            stray.id,
            stray.subcategories[0].id,
            vec![test_item("Paint", dec!(1), dec!(1))],
            &registry,
        );

        assert!(matches!(result, Err(AssistantError::Document(_))));
        assert_eq!(document, before);
    }

    #[test]
    fn test_apply_bulk_matches_names_case_insensitively() {
        let registry = ColumnRegistry::seeded();
        let mut document = TestDocumentBuilder::new()
            .with_category(TestCategoryBuilder::new("Labor").build())
            .build();

        let groups = vec![
            BulkCategory {
                name: "LABOR".to_string(),
                items: vec![test_item("Painter", dec!(2), dec!(950))],
            },
            BulkCategory {
                name: "Materials".to_string(),
                items: vec![
                    test_item("Paint", dec!(3), dec!(420)),
                    test_item("Tape", dec!(4), dec!(35)),
                ],
            },
        ];
        let outcome = apply_bulk(&mut document, groups, &registry).unwrap();

        assert_eq!(outcome.created_categories.len(), 1);
        assert_eq!(outcome.inserted_items, 3);
        assert_eq!(document.categories.len(), 2);
        assert_eq!(document.category_by_name("labor").unwrap().items().count(), 1);
        assert_eq!(document.category_by_name("materials").unwrap().items().count(), 2);
    }

    #[test]
    fn test_apply_bulk_with_blank_name_is_atomic() {
        let registry = ColumnRegistry::seeded();
        let mut document = TestDocumentBuilder::new().build();
        let before = document.clone();

        let groups = vec![
            BulkCategory {
                name: "Materials".to_string(),
                items: vec![test_item("Paint", dec!(3), dec!(420))],
            },
            BulkCategory {
                name: "   ".to_string(),
                items: vec![test_item("Tape", dec!(4), dec!(35))],
            },
        ];

        assert!(apply_bulk(&mut document, groups, &registry).is_err());
        assert_eq!(document, before);
    }
}
