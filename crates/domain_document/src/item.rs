//! Line items as dynamic value maps
//!
//! The set of keys an item carries is governed by the runtime column registry,
//! so an item is an id plus a map of typed values rather than a fixed struct.
//! Two keys are load-bearing for pricing (`quantity`, `unitPrice`); three are
//! derived (`total`, `markup`, `vat`) and are never stored on the item.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use core_kernel::ItemId;

use crate::error::DocumentError;

pub const DESCRIPTION: &str = "description";
pub const UNIT: &str = "unit";
pub const QUANTITY: &str = "quantity";
pub const UNIT_PRICE: &str = "unitPrice";
pub const TOTAL: &str = "total";
pub const MARKUP: &str = "markup";
pub const VAT: &str = "vat";

/// Keys computed by the pricing engine
pub const DERIVED_KEYS: [&str; 3] = [TOTAL, MARKUP, VAT];

/// Returns true for keys that are computed and never stored
pub fn is_derived_key(key: &str) -> bool {
    DERIVED_KEYS.contains(&key)
}

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValue {
    Text(String),
    Number(Decimal),
    Bool(bool),
    Date(NaiveDate),
}

impl ItemValue {
    /// Numeric view of the value; anything that is not a finite number reads as zero
    pub fn as_number(&self) -> Decimal {
        match self {
            ItemValue::Number(n) => *n,
            ItemValue::Text(s) => parse_decimal(s.trim()).unwrap_or(Decimal::ZERO),
            ItemValue::Bool(_) | ItemValue::Date(_) => Decimal::ZERO,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            ItemValue::Bool(b) => *b,
            ItemValue::Number(n) => !n.is_zero(),
            ItemValue::Text(s) => !s.is_empty(),
            ItemValue::Date(_) => true,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, ItemValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemValue::Text(s) => f.write_str(s),
            ItemValue::Number(n) => write!(f, "{}", n.normalize()),
            ItemValue::Bool(true) => f.write_str("Yes"),
            ItemValue::Bool(false) => f.write_str("No"),
            ItemValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for ItemValue {
    fn from(value: &str) -> Self {
        ItemValue::Text(value.to_string())
    }
}

impl From<String> for ItemValue {
    fn from(value: String) -> Self {
        ItemValue::Text(value)
    }
}

impl From<Decimal> for ItemValue {
    fn from(value: Decimal) -> Self {
        ItemValue::Number(value)
    }
}

impl From<bool> for ItemValue {
    fn from(value: bool) -> Self {
        ItemValue::Bool(value)
    }
}

impl From<NaiveDate> for ItemValue {
    fn from(value: NaiveDate) -> Self {
        ItemValue::Date(value)
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

impl Serialize for ItemValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ItemValue::Text(s) => serializer.serialize_str(s),
            // Written as a bare JSON number with every stored digit
            ItemValue::Number(n) => match serde_json::Number::from_str(&n.to_string()) {
                Ok(number) => number.serialize(serializer),
                Err(_) => serializer.serialize_str(&n.to_string()),
            },
            ItemValue::Bool(b) => serializer.serialize_bool(*b),
            ItemValue::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ItemValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Bool(b) => ItemValue::Bool(b),
            serde_json::Value::Number(n) => {
                ItemValue::Number(parse_decimal(&n.to_string()).unwrap_or(Decimal::ZERO))
            }
            serde_json::Value::String(s) => {
                match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
                    Ok(date) if s.len() == 10 => ItemValue::Date(date),
                    _ => ItemValue::Text(s),
                }
            }
            serde_json::Value::Null => ItemValue::Text(String::new()),
            other => ItemValue::Text(other.to_string()),
        })
    }
}

/// A line item: a stable id plus one value per registered column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ItemRepr")]
pub struct Item {
    pub id: ItemId,
    #[serde(flatten)]
    values: BTreeMap<String, ItemValue>,
}

#[derive(Deserialize)]
struct ItemRepr {
    #[serde(default)]
    id: ItemId,
    #[serde(flatten)]
    values: BTreeMap<String, ItemValue>,
}

impl From<ItemRepr> for Item {
    fn from(repr: ItemRepr) -> Self {
        let values = repr
            .values
            .into_iter()
            .filter(|(key, _)| !is_derived_key(key))
            .collect();
        Self { id: repr.id, values }
    }
}

impl Item {
    /// Creates an empty item with a fresh id
    pub fn new() -> Self {
        Self {
            id: ItemId::new(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter used when seeding items; derived keys are ignored
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ItemValue>) -> Self {
        let key = key.into();
        if !is_derived_key(&key) {
            self.values.insert(key, value.into());
        }
        self
    }

    /// Stores a value, rejecting computed keys
    pub fn set(&mut self, key: &str, value: ItemValue) -> Result<(), DocumentError> {
        if is_derived_key(key) {
            return Err(DocumentError::DerivedField(key.to_string()));
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Inserts a value only when the key is absent
    pub(crate) fn seed(&mut self, key: &str, value: ItemValue) {
        if !is_derived_key(key) {
            self.values.entry(key.to_string()).or_insert(value);
        }
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<ItemValue> {
        self.values.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ItemValue> {
        self.values.get(key)
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &ItemValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Numeric value of a key; missing or non-numeric values read as zero
    pub fn number(&self, key: &str) -> Decimal {
        self.values
            .get(key)
            .map(ItemValue::as_number)
            .unwrap_or(Decimal::ZERO)
    }

    /// Display text of a key; missing values read as empty
    pub fn text(&self, key: &str) -> String {
        self.values
            .get(key)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn quantity(&self) -> Decimal {
        self.number(QUANTITY)
    }

    pub fn unit_price(&self) -> Decimal {
        self.number(UNIT_PRICE)
    }

    /// `quantity × unitPrice`; an overflowing product reads as zero
    pub fn subtotal(&self) -> Decimal {
        self.quantity()
            .checked_mul(self.unit_price())
            .unwrap_or(Decimal::ZERO)
    }
}

impl Default for Item {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_subtotal_coerces_missing_and_text() {
        let item = Item::new().with(QUANTITY, "3").with(UNIT_PRICE, dec!(2.5));
        assert_eq!(item.subtotal(), dec!(7.5));

        let item = Item::new().with(QUANTITY, "abc").with(UNIT_PRICE, dec!(10));
        assert_eq!(item.subtotal(), Decimal::ZERO);

        assert_eq!(Item::new().subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_bool_reads_as_zero() {
        let item = Item::new().with(QUANTITY, true).with(UNIT_PRICE, dec!(10));
        assert_eq!(item.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_derived_keys_rejected() {
        let mut item = Item::new();
        let result = item.set(TOTAL, ItemValue::Number(dec!(1)));
        assert!(matches!(result, Err(DocumentError::DerivedField(_))));
        assert!(item.get(TOTAL).is_none());
    }

    #[test]
    fn test_deserialize_strips_derived_keys() {
        let json = r#"{"id":"7f1b5c2e-9a4e-4a53-8c63-3f2f7d9c1a10","description":"Paint","quantity":2,"unitPrice":"15.5","total":31,"vat":4.96}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(item.get(TOTAL).is_none());
        assert!(item.get(VAT).is_none());
        assert_eq!(item.subtotal(), dec!(31));
        assert_eq!(item.text(DESCRIPTION), "Paint");
    }

    #[test]
    fn test_value_json_shapes() {
        let item = Item::new()
            .with(QUANTITY, dec!(2))
            .with(UNIT_PRICE, dec!(9.75))
            .with("urgent", true)
            .with("due", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["quantity"], serde_json::json!(2));
        assert_eq!(json["unitPrice"], serde_json::json!(9.75));
        assert_eq!(json["urgent"], serde_json::json!(true));
        assert_eq!(json["due"], serde_json::json!("2024-05-01"));
    }

    #[test]
    fn test_high_precision_numbers_survive_json() {
        let price = dec!(1234567890.123456789012345678);
        let item = Item::new().with(UNIT_PRICE, price).with(QUANTITY, dec!(0.1));

        let text = serde_json::to_string(&item).unwrap();
        assert!(text.contains("\"unitPrice\":1234567890.123456789012345678"));

        let back: Item = serde_json::from_str(&text).unwrap();
        assert_eq!(back.get(UNIT_PRICE), Some(&ItemValue::Number(price)));
        assert_eq!(back.get(QUANTITY), Some(&ItemValue::Number(dec!(0.1))));
    }
}
