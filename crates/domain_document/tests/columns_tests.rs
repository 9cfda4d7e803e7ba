//! Column registry tests

use domain_document::{
    derive_key, ColumnError, ColumnRegistry, ColumnUpdate, DataType, InputType, ItemValue,
    NewColumn, SEED_KEYS,
};

mod registration {
    use super::*;

    #[test]
    fn test_incompatible_input_is_rejected() {
        let mut registry = ColumnRegistry::seeded();
        let before = registry.clone();
        let result = registry.add_column(
            NewColumn::new("Delivered", DataType::Boolean).with_input(InputType::Text),
        );
        assert!(matches!(result, Err(ColumnError::IncompatibleInput { .. })));
        assert_eq!(registry, before);
    }

    #[test]
    fn test_select_requires_options() {
        let mut registry = ColumnRegistry::seeded();
        let result = registry
            .add_column(NewColumn::new("Grade", DataType::String).with_input(InputType::Select));
        assert_eq!(result, Err(ColumnError::MissingOptions("grade".to_string())));
    }

    #[test]
    fn test_select_default_is_first_option() {
        let mut registry = ColumnRegistry::seeded();
        let key = registry
            .add_column(
                NewColumn::new("Grade", DataType::String)
                    .with_input(InputType::Select)
                    .with_options(["A", "B"]),
            )
            .unwrap();
        let item = registry.new_item();
        assert_eq!(item.get(&key), Some(&ItemValue::Text("A".to_string())));
    }

    #[test]
    fn test_collision_with_seed_key() {
        let mut registry = ColumnRegistry::seeded();
        let result = registry.add_column(NewColumn::new("Total", DataType::Number));
        assert_eq!(result, Err(ColumnError::DuplicateKey("total".to_string())));
    }

    #[test]
    fn test_new_columns_keep_insertion_order() {
        let mut registry = ColumnRegistry::seeded();
        registry.add_column(NewColumn::new("Zeta", DataType::String)).unwrap();
        registry.add_column(NewColumn::new("Alpha", DataType::String)).unwrap();
        let keys: Vec<&str> = registry.keys().collect();
        assert_eq!(&keys[keys.len() - 2..], &["zeta", "alpha"]);
    }
}

mod updates {
    use super::*;

    #[test]
    fn test_pricing_columns_cannot_change_type() {
        let mut registry = ColumnRegistry::seeded();
        let result = registry.update_column(
            "quantity",
            ColumnUpdate {
                data_type: Some(DataType::String),
                ..Default::default()
            },
        );
        assert_eq!(result, Err(ColumnError::FixedColumn("quantity".to_string())));
    }

    #[test]
    fn test_derived_columns_can_be_relabelled() {
        let mut registry = ColumnRegistry::seeded();
        let updated = registry
            .update_column(
                "total",
                ColumnUpdate {
                    label: Some("Amount".to_string()),
                    default_visible: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.label, "Amount");
        assert!(!updated.is_editable);
    }

    #[test]
    fn test_explicit_incompatible_input_is_rejected() {
        let mut registry = ColumnRegistry::seeded();
        let key = registry.add_column(NewColumn::new("Due", DataType::Date)).unwrap();
        let result = registry.update_column(
            &key,
            ColumnUpdate {
                input_type: Some(InputType::Checkbox),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(ColumnError::IncompatibleInput { .. })));
    }

    #[test]
    fn test_unknown_column() {
        let mut registry = ColumnRegistry::seeded();
        let result = registry.update_column("ghost", ColumnUpdate::default());
        assert_eq!(result, Err(ColumnError::NotFound("ghost".to_string())));
    }
}

mod removal {
    use super::*;

    #[test]
    fn test_every_seed_key_is_protected() {
        let mut registry = ColumnRegistry::seeded();
        for key in SEED_KEYS {
            assert_eq!(
                registry.remove_column(key),
                Err(ColumnError::Protected(key.to_string()))
            );
        }
    }

    #[test]
    fn test_user_column_can_be_removed() {
        let mut registry = ColumnRegistry::seeded();
        let key = registry.add_column(NewColumn::new("Brand", DataType::String)).unwrap();
        registry.remove_column(&key).unwrap();
        assert!(!registry.contains(&key));
    }

    #[test]
    fn test_generation_columns_exclude_derived_and_images() {
        let mut registry = ColumnRegistry::seeded();
        registry.add_column(NewColumn::new("Photo", DataType::Image)).unwrap();
        let keys: Vec<&str> = registry.generation_columns().map(|c| c.key.as_str()).collect();
        assert!(keys.contains(&"description"));
        assert!(!keys.contains(&"total"));
        assert!(!keys.contains(&"markup"));
        assert!(!keys.contains(&"vat"));
        assert!(!keys.contains(&"photo"));
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_registry_round_trip_forces_derived_read_only() {
        let json = serde_json::json!([
            {"key": "description", "label": "Description", "dataType": "string",
             "inputType": "textarea", "default": true, "isEditable": true},
            {"key": "total", "label": "Total", "dataType": "number",
             "inputType": "number", "default": true, "isEditable": true},
            {"key": "done", "label": "Done", "dataType": "boolean",
             "inputType": "text", "default": false, "isEditable": true}
        ]);
        let registry: ColumnRegistry = serde_json::from_value(json).unwrap();
        assert!(!registry.get("total").unwrap().is_editable);
        assert_eq!(registry.get("done").unwrap().input_type, InputType::Checkbox);
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn derived_keys_are_lowercase_ascii(label in "\\PC{1,24}") {
            if let Ok(key) = derive_key(&label) {
                prop_assert!(key.chars().all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit()));
                prop_assert!(key.chars().any(|c| c.is_ascii_alphanumeric()));
                prop_assert_eq!(key.chars().count(), label.trim().chars().count());
            }
        }

        #[test]
        fn data_type_change_always_leaves_compatible_input(
            target in prop::sample::select(vec![
                DataType::String, DataType::Number, DataType::Date,
                DataType::Time, DataType::Boolean, DataType::Image,
            ])
        ) {
            let mut registry = ColumnRegistry::seeded();
            let key = registry.add_column(NewColumn::new("Custom", DataType::String)).unwrap();
            let updated = registry
                .update_column(&key, ColumnUpdate { data_type: Some(target), ..Default::default() })
                .unwrap();
            prop_assert!(target.accepts(updated.input_type));
        }
    }
}
