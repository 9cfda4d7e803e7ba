//! Workspace store tests
//!
//! File-backed tests run in a fresh temp directory each.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use domain_document::item::UNIT_PRICE;
use domain_document::{ClientInfo, DataType, DocType, ItemValue, NewColumn, Workspace};
use infra_store::{InMemoryStore, JsonFileStore, StoreError, StoreKey, WorkspaceStore};
use test_utils::{test_item, CompanyFixtures, DateFixtures};

async fn file_store() -> (JsonFileStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(dir.path().join("data")).await.unwrap();
    (store, dir)
}

fn populated_workspace() -> Workspace {
    let mut workspace = Workspace::new(CompanyFixtures::acme());
    workspace
        .add_column(NewColumn::new("Brand", DataType::String))
        .unwrap();
    workspace.new_document(DocType::Quote, DateFixtures::issue_date()).unwrap();
    {
        let document = workspace.current_document_mut().unwrap();
        let category = &document.categories[0];
        let (category_id, subcategory_id) = (category.id, category.subcategories[0].id);
        let registry = domain_document::ColumnRegistry::seeded();
        document
            .insert_item(category_id, subcategory_id, test_item("Paint", dec!(3), dec!(420)), &registry)
            .unwrap();
    }
    workspace.save_client(ClientInfo::new("Jordan Reyes")).unwrap();
    workspace.register_ticket_hash("abc123");
    workspace
}

mod file_store {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_preserves_workspace() {
        let (store, _dir) = file_store().await;
        let workspace = populated_workspace();

        store.save_workspace(&workspace).await.unwrap();
        let loaded = store.load_workspace().await.unwrap();

        assert_eq!(loaded, workspace);
    }

    #[tokio::test]
    async fn test_high_precision_prices_survive_reload() {
        let (store, _dir) = file_store().await;
        let mut workspace = Workspace::new(CompanyFixtures::acme());
        workspace.new_document(DocType::Quote, DateFixtures::issue_date()).unwrap();
        let price: Decimal = dec!(0.333333333333333333333333333);
        {
            let document = workspace.current_document_mut().unwrap();
            let category = &document.categories[0];
            let (category_id, subcategory_id) = (category.id, category.subcategories[0].id);
            let registry = domain_document::ColumnRegistry::seeded();
            document
                .insert_item(category_id, subcategory_id, test_item("Sealant", dec!(1), price), &registry)
                .unwrap();
        }

        store.save_parts(&workspace, &[StoreKey::CurrentDocument]).await.unwrap();
        let loaded = store.load_workspace().await.unwrap();

        let items = &loaded.current_document().unwrap().categories[0].subcategories[0].items;
        assert_eq!(items.last().unwrap().get(UNIT_PRICE), Some(&ItemValue::Number(price)));
    }

    #[tokio::test]
    async fn test_each_part_has_its_own_file() {
        let (store, _dir) = file_store().await;
        store.save_workspace(&populated_workspace()).await.unwrap();

        for key in StoreKey::ALL {
            assert!(store.path_of(key).exists(), "{key} was not written");
        }
        let leftovers: Vec<_> = std::fs::read_dir(store.root())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_empty_directory_loads_defaults() {
        let (store, _dir) = file_store().await;
        let workspace = store.load_workspace().await.unwrap();

        assert_eq!(workspace.companies.len(), 1);
        assert_eq!(workspace.active_company_id, Some(workspace.companies[0].id));
        assert!(workspace.current_document.is_none());
        assert!(workspace.column_registry.contains("unitPrice"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let (store, _dir) = file_store().await;
        std::fs::write(store.path_of(StoreKey::Clients), "{ not json").unwrap();

        let error = store.load_workspace().await.unwrap_err();

        assert!(error.is_corrupt());
        assert!(matches!(error, StoreError::Corrupt { file, .. } if file == "clients.json"));
    }

    #[tokio::test]
    async fn test_saving_one_part_leaves_others() {
        let (store, _dir) = file_store().await;
        let mut workspace = populated_workspace();
        store.save_workspace(&workspace).await.unwrap();

        workspace.save_client(ClientInfo::new("Sam Ortega")).unwrap();
        workspace.ticket_hashes.clear();
        store.save_parts(&workspace, &[StoreKey::Clients]).await.unwrap();

        let loaded = store.load_workspace().await.unwrap();
        assert_eq!(loaded.saved_clients.len(), 2);
        assert_eq!(loaded.ticket_hashes, vec!["abc123".to_string()]);
    }
}

mod memory_store {
    use super::*;

    #[tokio::test]
    async fn test_stale_active_company_falls_back_to_first() {
        let company = CompanyFixtures::acme();
        let companies = serde_json::to_string(&vec![company.clone()]).unwrap();
        let stale = serde_json::to_string(&Some(core_kernel::CompanyId::new())).unwrap();
        let store = InMemoryStore::new()
            .with_raw(StoreKey::Companies, companies)
            .await
            .with_raw(StoreKey::ActiveCompany, stale)
            .await;

        let workspace = store.load_workspace().await.unwrap();

        assert_eq!(workspace.active_company_id, Some(company.id));
    }

    #[tokio::test]
    async fn test_empty_registry_is_reseeded() {
        let store = InMemoryStore::new().with_raw(StoreKey::Columns, "[]").await;
        let workspace = store.load_workspace().await.unwrap();
        assert!(!workspace.column_registry.is_empty());
    }
}
