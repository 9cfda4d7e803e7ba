//! Workspace tests: companies, saving documents, clients and column propagation

use chrono::NaiveDate;

use domain_document::{
    ClientInfo, ColumnUpdate, Company, DataType, DocType, DocumentError, InputType, ItemValue,
    NewColumn, Workspace,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
}

mod companies {
    use super::*;

    #[test]
    fn test_active_company_cannot_be_removed() {
        let mut workspace = Workspace::default();
        let active = workspace.active_company().unwrap().id;
        workspace.add_company(Company::new("Second"));

        assert!(matches!(
            workspace.remove_company(active),
            Err(DocumentError::ActiveCompanyRemoval)
        ));
    }

    #[test]
    fn test_last_company_cannot_be_removed() {
        let mut workspace = Workspace::default();
        let other = workspace.add_company(Company::new("Second"));
        workspace.set_active_company(other).unwrap();
        let first = workspace.companies[0].id;
        workspace.remove_company(first).unwrap();

        workspace.active_company_id = None;
        assert!(matches!(
            workspace.remove_company(other),
            Err(DocumentError::LastCompany)
        ));
    }

    #[test]
    fn test_new_document_uses_active_company() {
        let mut workspace = Workspace::default();
        let other = workspace.add_company(Company::new("Other Co").with_prefix(DocType::Quote, "Q-"));
        workspace.set_active_company(other).unwrap();

        let document = workspace.new_document(DocType::Quote, today()).unwrap();
        assert_eq!(document.issuer_name, "Other Co");
        assert_eq!(document.doc_number, "Q-000001-24065");
    }

    #[test]
    fn test_update_unknown_company_fails() {
        let mut workspace = Workspace::default();
        assert!(matches!(
            workspace.update_company(Company::new("Ghost")),
            Err(DocumentError::CompanyNotFound(_))
        ));
    }
}

mod saving {
    use super::*;

    #[test]
    fn test_save_advances_counter() {
        let mut workspace = Workspace::default();
        let document = workspace.new_document(DocType::Quote, today()).unwrap().clone();
        workspace.save_document(document).unwrap();

        let company = workspace.active_company().unwrap();
        assert_eq!(company.counter_for(DocType::Quote), 1);

        let next = workspace.new_document(DocType::Quote, today()).unwrap();
        assert_eq!(next.doc_number, "COT-000002-24065");
    }

    #[test]
    fn test_save_never_lowers_counter() {
        let mut workspace = Workspace::default();
        let id = workspace.active_company().unwrap().id;
        workspace.company_mut(id).unwrap().advance_counter(DocType::Quote, 50);

        let mut document = workspace.new_document(DocType::Quote, today()).unwrap().clone();
        document.doc_number = "COT-000003-24065".to_string();
        workspace.save_document(document).unwrap();

        assert_eq!(workspace.active_company().unwrap().counter_for(DocType::Quote), 50);
    }

    #[test]
    fn test_save_is_an_upsert() {
        let mut workspace = Workspace::default();
        let mut document = workspace.new_document(DocType::Quote, today()).unwrap().clone();
        workspace.save_document(document.clone()).unwrap();
        document.title = "Kitchen remodel".to_string();
        workspace.save_document(document.clone()).unwrap();

        assert_eq!(workspace.saved_documents.len(), 1);
        assert_eq!(workspace.document(document.id).unwrap().title, "Kitchen remodel");
    }

    #[test]
    fn test_unparseable_folio_still_saves() {
        let mut workspace = Workspace::default();
        let mut document = workspace.new_document(DocType::Quote, today()).unwrap().clone();
        document.doc_number = "custom".to_string();
        workspace.save_document(document).unwrap();

        assert_eq!(workspace.saved_documents.len(), 1);
        assert_eq!(workspace.active_company().unwrap().counter_for(DocType::Quote), 0);
    }

    #[test]
    fn test_delete_document() {
        let mut workspace = Workspace::default();
        let document = workspace.new_document(DocType::Quote, today()).unwrap().clone();
        workspace.save_document(document.clone()).unwrap();
        workspace.delete_document(document.id).unwrap();
        assert!(matches!(
            workspace.document(document.id),
            Err(DocumentError::DocumentNotFound(_))
        ));
    }
}

mod clients {
    use super::*;

    #[test]
    fn test_document_client_is_a_snapshot() {
        let mut workspace = Workspace::default();
        let client = ClientInfo::new("Jordan Client");
        workspace.save_client(client.clone()).unwrap();

        let mut document = workspace.new_document(DocType::Quote, today()).unwrap().clone();
        document.client = client.clone();
        document.client.email = "changed@example.com".to_string();

        assert_eq!(document.client.email, "changed@example.com");
        assert_eq!(workspace.saved_clients[0].email, "");
    }

    #[test]
    fn test_save_client_requires_name() {
        let mut workspace = Workspace::default();
        assert!(workspace.save_client(ClientInfo::default()).is_err());
    }

    #[test]
    fn test_delete_client() {
        let mut workspace = Workspace::default();
        let id = workspace.save_client(ClientInfo::new("Sam")).unwrap();
        workspace.delete_client(id).unwrap();
        assert!(workspace.saved_clients.is_empty());
    }
}

mod columns {
    use super::*;

    #[test]
    fn test_new_column_is_seeded_into_open_document() {
        let mut workspace = Workspace::default();
        workspace.new_document(DocType::Quote, today()).unwrap();
        let registry = workspace.column_registry.clone();
        {
            let document = workspace.current_document_mut().unwrap();
            let cat = document.categories[0].id;
            let sub = document.categories[0].subcategories[0].id;
            document.add_item(cat, sub, &registry).unwrap();
        }

        let key = workspace
            .add_column(NewColumn::new("In stock", DataType::Boolean))
            .unwrap();
        assert_eq!(key, "in_stock");

        let document = workspace.current_document().unwrap();
        let item = document.items().next().unwrap();
        assert_eq!(item.get("in_stock"), Some(&ItemValue::Bool(false)));
        assert!(document.categories[0].is_column_visible("in_stock"));
    }

    #[test]
    fn test_removed_column_is_stripped() {
        let mut workspace = Workspace::default();
        workspace.new_document(DocType::Quote, today()).unwrap();
        let registry = workspace.column_registry.clone();
        {
            let document = workspace.current_document_mut().unwrap();
            let cat = document.categories[0].id;
            let sub = document.categories[0].subcategories[0].id;
            document.add_item(cat, sub, &registry).unwrap();
        }
        workspace
            .add_column(NewColumn::new("Brand", DataType::String))
            .unwrap();
        workspace.remove_column("brand").unwrap();

        let document = workspace.current_document().unwrap();
        assert!(document.items().next().unwrap().get("brand").is_none());
        assert!(!document.categories[0].visible_columns.contains_key("brand"));
    }

    #[test]
    fn test_update_column_through_workspace() {
        let mut workspace = Workspace::default();
        workspace
            .add_column(NewColumn::new("Finish", DataType::String))
            .unwrap();
        let definition = workspace
            .update_column(
                "finish",
                ColumnUpdate {
                    input_type: Some(InputType::Select),
                    options: Some(vec!["Matte".into(), "Gloss".into()]),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(definition.input_type, InputType::Select);
        assert_eq!(definition.default_value(), ItemValue::Text("Matte".into()));
    }

    #[test]
    fn test_seed_columns_are_protected() {
        let mut workspace = Workspace::default();
        assert!(matches!(
            workspace.remove_column("quantity"),
            Err(DocumentError::Column(_))
        ));
    }
}
