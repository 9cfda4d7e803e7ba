//! Response schemas handed to the completion service
//!
//! Schemas use the uppercase OpenAPI subset the service accepts in JSON
//! response mode. The item schema is rebuilt from the column registry on every
//! call, so user-defined columns are requested too while derived and image
//! columns never are.

use serde_json::{json, Map, Value};

use domain_document::{ColumnDefinition, ColumnRegistry, DataType, InputType};

fn column_type(definition: &ColumnDefinition) -> &'static str {
    if definition.input_type == InputType::Select {
        return "STRING";
    }
    match definition.data_type {
        DataType::Number => "NUMBER",
        DataType::Boolean => "BOOLEAN",
        _ => "STRING",
    }
}

fn column_property(definition: &ColumnDefinition) -> Value {
    let mut property = Map::new();
    property.insert("type".into(), json!(column_type(definition)));
    property.insert("description".into(), json!(definition.label));
    if definition.input_type == InputType::Select && !definition.options.is_empty() {
        property.insert("enum".into(), json!(definition.options));
    }
    if definition.data_type == DataType::Date {
        property.insert("format".into(), json!("date"));
    }
    Value::Object(property)
}

/// Object schema of a single item record
pub fn item_schema(registry: &ColumnRegistry) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for column in registry.generation_columns() {
        properties.insert(column.key.clone(), column_property(&column.definition));
        required.push(column.key.clone());
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

/// Flat list of item records
pub fn items_schema(registry: &ColumnRegistry) -> Value {
    json!({
        "type": "ARRAY",
        "items": item_schema(registry),
    })
}

/// Item lists grouped under category names
pub fn bulk_schema(registry: &ColumnRegistry) -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "categories": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Category name" },
                        "items": items_schema(registry),
                    },
                    "required": ["name", "items"],
                },
            },
        },
        "required": ["categories"],
    })
}

/// Fixed shape of an interpreted receipt
pub fn receipt_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "storeName": { "type": "STRING" },
            "date": { "type": "STRING" },
            "items": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "description": { "type": "STRING" },
                        "quantity": { "type": "NUMBER" },
                        "unitPrice": { "type": "NUMBER" },
                        "total": { "type": "NUMBER" },
                    },
                    "required": ["description", "quantity", "unitPrice", "total"],
                },
            },
            "subtotal": { "type": "NUMBER" },
            "tax": { "type": "NUMBER" },
            "total": { "type": "NUMBER" },
        },
        "required": ["storeName", "date", "items", "subtotal", "tax", "total"],
    })
}
