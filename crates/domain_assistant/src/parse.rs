//! Validation of completion output
//!
//! The service is asked for JSON matching a schema, but nothing guarantees it
//! complies. Output is unwrapped from markdown fences, parsed and checked
//! against the live column registry:
//!
//! - keys the registry doesn't know, derived keys and image columns are dropped
//! - numeric strings are accepted for number columns, "true"/"false" for booleans
//! - select values outside the option list fall back to the column default
//! - anything else that doesn't fit its column is a `MalformedResponse`

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use domain_document::{
    is_derived_key, ColumnDefinition, ColumnRegistry, DataType, InputType, InterpretedReceipt, Item,
    ItemValue, ReceiptLine,
};

use crate::error::AssistantError;

/// Items suggested for one named category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCategory {
    pub name: String,
    pub items: Vec<Item>,
}

/// Removes a surrounding markdown code fence, with or without a language tag
pub fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn parse_json(raw: &str) -> Result<Value, AssistantError> {
    let body = strip_fences(raw);
    serde_json::from_str(body).map_err(|e| AssistantError::malformed(format!("invalid JSON: {e}")))
}

/// Plain-text suggestion (description or terms)
pub fn parse_text(raw: &str) -> Result<String, AssistantError> {
    let body = strip_fences(raw);
    // Some replies wrap the text in a JSON string literal
    let text = match serde_json::from_str::<Value>(body) {
        Ok(Value::String(s)) => s,
        _ => body.to_string(),
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(AssistantError::malformed("empty text"));
    }
    Ok(text.to_string())
}

/// A flat list of item records. A top-level `{"items": [...]}` wrapper is
/// also accepted.
pub fn parse_items(raw: &str, registry: &ColumnRegistry) -> Result<Vec<Item>, AssistantError> {
    let value = parse_json(raw)?;
    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(records)) => records,
            _ => return Err(AssistantError::malformed("expected a list of items")),
        },
        _ => return Err(AssistantError::malformed("expected a list of items")),
    };
    items_from_records(records, registry)
}

/// Item lists grouped by category. Accepts the schema form
/// `{"categories": [{"name", "items"}]}`, a bare list of such groups, or a
/// map from category name to item list.
pub fn parse_bulk_items(raw: &str, registry: &ColumnRegistry) -> Result<Vec<BulkCategory>, AssistantError> {
    let value = parse_json(raw)?;
    let groups = match value {
        Value::Object(mut map) => match map.remove("categories") {
            Some(Value::Array(groups)) => groups,
            Some(_) => return Err(AssistantError::malformed("\"categories\" must be a list")),
            None => return bulk_from_map(map, registry),
        },
        Value::Array(groups) => groups,
        _ => return Err(AssistantError::malformed("expected categories of items")),
    };

    groups
        .into_iter()
        .map(|group| {
            let Value::Object(mut group) = group else {
                return Err(AssistantError::malformed("category entry must be an object"));
            };
            let name = match group.remove("name") {
                Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
                _ => return Err(AssistantError::malformed("category entry without a name")),
            };
            let records = match group.remove("items") {
                Some(Value::Array(records)) => records,
                None | Some(Value::Null) => Vec::new(),
                Some(_) => {
                    return Err(AssistantError::malformed(format!(
                        "items of category '{name}' must be a list"
                    )))
                }
            };
            Ok(BulkCategory {
                items: items_from_records(records, registry)?,
                name,
            })
        })
        .collect()
}

fn bulk_from_map(map: Map<String, Value>, registry: &ColumnRegistry) -> Result<Vec<BulkCategory>, AssistantError> {
    map.into_iter()
        .map(|(name, records)| {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AssistantError::malformed("category without a name"));
            }
            let Value::Array(records) = records else {
                return Err(AssistantError::malformed(format!(
                    "items of category '{name}' must be a list"
                )));
            };
            Ok(BulkCategory {
                items: items_from_records(records, registry)?,
                name,
            })
        })
        .collect()
}

fn items_from_records(records: Vec<Value>, registry: &ColumnRegistry) -> Result<Vec<Item>, AssistantError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| match record {
            Value::Object(fields) => item_from_fields(fields, registry),
            _ => Err(AssistantError::malformed(format!("item {index} is not an object"))),
        })
        .collect()
}

fn item_from_fields(fields: Map<String, Value>, registry: &ColumnRegistry) -> Result<Item, AssistantError> {
    let mut item = registry.new_item();
    for (key, value) in fields {
        let Some(definition) = registry.get(&key) else {
            debug!(key = %key, "Dropping unknown suggested column");
            continue;
        };
        if is_derived_key(&key) || definition.data_type == DataType::Image {
            continue;
        }
        if let Some(value) = coerce(&key, value, definition)? {
            item.set(&key, value)?;
        }
    }
    Ok(item)
}

/// Converts a JSON value to the column's type. `None` keeps the default.
fn coerce(key: &str, value: Value, definition: &ColumnDefinition) -> Result<Option<ItemValue>, AssistantError> {
    let mismatch = |value: &Value| {
        AssistantError::malformed(format!(
            "value {value} does not fit column '{key}' ({})",
            definition.data_type
        ))
    };

    if value.is_null() {
        return Ok(None);
    }

    if definition.input_type == InputType::Select {
        let choice = match &value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            other => return Err(mismatch(other)),
        };
        if definition.options.iter().any(|o| *o == choice) {
            return Ok(Some(ItemValue::Text(choice)));
        }
        debug!(key = %key, value = %choice, "Suggested option not offered; keeping default");
        return Ok(None);
    }

    match definition.data_type {
        DataType::Number => match &value {
            Value::Number(n) => decimal(&n.to_string()).map(ItemValue::Number).map(Some).ok_or_else(|| mismatch(&value)),
            Value::String(s) => decimal(s).map(ItemValue::Number).map(Some).ok_or_else(|| mismatch(&value)),
            other => Err(mismatch(other)),
        },
        DataType::Boolean => match &value {
            Value::Bool(b) => Ok(Some(ItemValue::Bool(*b))),
            Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(Some(ItemValue::Bool(true))),
            Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(Some(ItemValue::Bool(false))),
            other => Err(mismatch(other)),
        },
        DataType::Date => match &value {
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(|d| Some(ItemValue::Date(d)))
                .map_err(|_| mismatch(&value)),
            other => Err(mismatch(other)),
        },
        DataType::String | DataType::Time | DataType::Image => match value {
            Value::String(s) => Ok(Some(ItemValue::Text(s.trim().to_string()))),
            Value::Number(n) => Ok(Some(ItemValue::Text(n.to_string()))),
            Value::Bool(b) => Ok(Some(ItemValue::Text(b.to_string()))),
            other => Err(mismatch(&other)),
        },
    }
}

/// Parses a decimal from JSON number text or a loosely formatted string
/// such as "1,250.00" or "$80"
fn decimal(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .ok()
        .or_else(|| Decimal::from_scientific(&cleaned).ok())
}

fn receipt_amount(fields: &Map<String, Value>, key: &str) -> Result<Decimal, AssistantError> {
    let amount = match fields.get(key) {
        None | Some(Value::Null) => return Ok(Decimal::ZERO),
        Some(Value::Number(n)) => decimal(&n.to_string()),
        Some(Value::String(s)) => decimal(s),
        Some(_) => None,
    };
    amount.ok_or_else(|| AssistantError::malformed(format!("receipt field '{key}' is not a number")))
}

fn receipt_text(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Interpreted receipt in the fixed `{storeName, date, items, subtotal, tax,
/// total}` shape. Missing amounts read as zero; a line total that is absent
/// is recomputed from quantity and unit price.
pub fn parse_receipt(raw: &str) -> Result<InterpretedReceipt, AssistantError> {
    let Value::Object(fields) = parse_json(raw)? else {
        return Err(AssistantError::malformed("expected a receipt object"));
    };

    let lines = match fields.get("items") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(lines)) => lines.clone(),
        Some(_) => return Err(AssistantError::malformed("receipt items must be a list")),
    };

    let items = lines
        .into_iter()
        .map(|line| {
            let Value::Object(line) = line else {
                return Err(AssistantError::malformed("receipt line is not an object"));
            };
            let quantity = receipt_amount(&line, "quantity")?;
            let unit_price = receipt_amount(&line, "unitPrice")?;
            let total = match line.get("total") {
                None | Some(Value::Null) => quantity.checked_mul(unit_price).unwrap_or(Decimal::ZERO),
                Some(_) => receipt_amount(&line, "total")?,
            };
            Ok(ReceiptLine {
                description: receipt_text(&line, "description"),
                quantity,
                unit_price,
                total,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InterpretedReceipt {
        store_name: receipt_text(&fields, "storeName"),
        date: receipt_text(&fields, "date"),
        items,
        subtotal: receipt_amount(&fields, "subtotal")?,
        tax: receipt_amount(&fields, "tax")?,
        total: receipt_amount(&fields, "total")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_fences("```\n{}\n```  "), "{}");
        assert_eq!(strip_fences("  [2] "), "[2]");
    }

    #[test]
    fn test_decimal_accepts_loose_formats() {
        assert_eq!(decimal("1,250.50"), Some(dec!(1250.50)));
        assert_eq!(decimal("$80"), Some(dec!(80)));
        assert_eq!(decimal("1e3"), Some(dec!(1000)));
        assert_eq!(decimal("ten"), None);
        assert_eq!(decimal(""), None);
    }

    #[test]
    fn test_parse_text_unwraps_json_string() {
        assert_eq!(parse_text("\"Interior painting\"").unwrap(), "Interior painting");
        assert_eq!(parse_text("  Two coats.  ").unwrap(), "Two coats.");
        assert!(matches!(parse_text("``` ```"), Err(AssistantError::MalformedResponse(_))));
    }
}
