//! Column registry
//!
//! A user-extensible, ordered set of column definitions. Both the pricing
//! engine and the layout engine read it at run time: items carry one value per
//! registered key, and each category toggles column visibility independently.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ColumnError;
use crate::item::{
    is_derived_key, Item, ItemValue, DESCRIPTION, MARKUP, QUANTITY, TOTAL, UNIT, UNIT_PRICE, VAT,
};

/// Value type stored in a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Date,
    Time,
    Boolean,
    Image,
}

impl DataType {
    /// Input widgets able to edit this data type, preferred first
    pub fn compatible_inputs(&self) -> &'static [InputType] {
        match self {
            DataType::String => &[InputType::Text, InputType::Textarea, InputType::Select],
            DataType::Number => &[InputType::Number, InputType::Select],
            DataType::Date => &[InputType::Date],
            DataType::Time => &[InputType::Time],
            DataType::Boolean => &[InputType::Checkbox],
            DataType::Image => &[InputType::File],
        }
    }

    pub fn accepts(&self, input: InputType) -> bool {
        self.compatible_inputs().contains(&input)
    }

    /// The preferred input widget for this data type
    pub fn default_input(&self) -> InputType {
        self.compatible_inputs()[0]
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Date => "date",
            DataType::Time => "time",
            DataType::Boolean => "boolean",
            DataType::Image => "image",
        };
        f.write_str(name)
    }
}

/// Input widget used to edit a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Textarea,
    Number,
    Select,
    Date,
    Time,
    Checkbox,
    File,
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputType::Text => "text",
            InputType::Textarea => "textarea",
            InputType::Number => "number",
            InputType::Select => "select",
            InputType::Date => "date",
            InputType::Time => "time",
            InputType::Checkbox => "checkbox",
            InputType::File => "file",
        };
        f.write_str(name)
    }
}

/// Definition of a single column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub label: String,
    pub data_type: DataType,
    pub input_type: InputType,
    /// Initial visibility when a new category is created
    #[serde(rename = "default")]
    pub default_visible: bool,
    pub is_editable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl ColumnDefinition {
    pub fn new(label: impl Into<String>, data_type: DataType) -> Self {
        Self {
            label: label.into(),
            data_type,
            input_type: data_type.default_input(),
            default_visible: true,
            is_editable: true,
            options: Vec::new(),
        }
    }

    fn hidden(mut self) -> Self {
        self.default_visible = false;
        self
    }

    fn computed(mut self) -> Self {
        self.is_editable = false;
        self
    }

    fn with_input(mut self, input: InputType) -> Self {
        self.input_type = input;
        self
    }

    /// Initial cell value for a new item or a newly added column
    pub fn default_value(&self) -> ItemValue {
        match self.data_type {
            DataType::Number if self.input_type == InputType::Select => self
                .options
                .first()
                .map(|o| ItemValue::Text(o.clone()))
                .unwrap_or(ItemValue::Number(rust_decimal::Decimal::ZERO)),
            DataType::Number => ItemValue::Number(rust_decimal::Decimal::ZERO),
            DataType::Boolean => ItemValue::Bool(false),
            _ if self.input_type == InputType::Select => self
                .options
                .first()
                .map(|o| ItemValue::Text(o.clone()))
                .unwrap_or_else(|| ItemValue::Text(String::new())),
            _ => ItemValue::Text(String::new()),
        }
    }

    /// Forces the invariants every definition must satisfy
    fn normalize(&mut self, key: &str) {
        if !self.data_type.accepts(self.input_type) {
            self.input_type = self.data_type.default_input();
        }
        self.is_editable = !is_derived_key(key);
    }
}

/// A column definition together with its registry key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    #[serde(flatten)]
    pub definition: ColumnDefinition,
}

/// Request to register a new column
#[derive(Debug, Clone)]
pub struct NewColumn {
    pub label: String,
    pub data_type: DataType,
    pub input_type: Option<InputType>,
    pub options: Vec<String>,
    pub default_visible: bool,
}

impl NewColumn {
    pub fn new(label: impl Into<String>, data_type: DataType) -> Self {
        Self {
            label: label.into(),
            data_type,
            input_type: None,
            options: Vec::new(),
            default_visible: true,
        }
    }

    pub fn with_input(mut self, input: InputType) -> Self {
        self.input_type = Some(input);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn hidden_by_default(mut self) -> Self {
        self.default_visible = false;
        self
    }
}

/// Partial update of an existing column
#[derive(Debug, Clone, Default)]
pub struct ColumnUpdate {
    pub label: Option<String>,
    pub data_type: Option<DataType>,
    pub input_type: Option<InputType>,
    pub options: Option<Vec<String>>,
    pub default_visible: Option<bool>,
}

/// Keys shipped with every registry; they cannot be deleted
pub const SEED_KEYS: [&str; 7] = [DESCRIPTION, UNIT, QUANTITY, UNIT_PRICE, MARKUP, VAT, TOTAL];

/// Keys whose data type the pricing engine depends on
const PRICING_KEYS: [&str; 2] = [QUANTITY, UNIT_PRICE];

/// Derives a machine key from a user label: ASCII lowercase, every other
/// character replaced with `_`
pub fn derive_key(label: &str) -> Result<String, ColumnError> {
    let key: String = label
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();

    if !key.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(ColumnError::EmptyLabel);
    }
    Ok(key)
}

/// Ordered registry of column definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Column>", into = "Vec<Column>")]
pub struct ColumnRegistry {
    columns: Vec<Column>,
}

impl From<Vec<Column>> for ColumnRegistry {
    fn from(mut columns: Vec<Column>) -> Self {
        for column in &mut columns {
            column.definition.normalize(&column.key);
        }
        Self { columns }
    }
}

impl From<ColumnRegistry> for Vec<Column> {
    fn from(registry: ColumnRegistry) -> Self {
        registry.columns
    }
}

impl Default for ColumnRegistry {
    fn default() -> Self {
        Self::seeded()
    }
}

impl ColumnRegistry {
    /// The built-in column set
    pub fn seeded() -> Self {
        let seed = |key: &str, definition: ColumnDefinition| Column {
            key: key.to_string(),
            definition,
        };

        Self::from(vec![
            seed(
                DESCRIPTION,
                ColumnDefinition::new("Description", DataType::String).with_input(InputType::Textarea),
            ),
            seed(UNIT, ColumnDefinition::new("Unit", DataType::String).hidden()),
            seed(QUANTITY, ColumnDefinition::new("Qty", DataType::Number)),
            seed(UNIT_PRICE, ColumnDefinition::new("Unit price", DataType::Number)),
            seed(
                MARKUP,
                ColumnDefinition::new("Markup", DataType::Number).hidden().computed(),
            ),
            seed(VAT, ColumnDefinition::new("VAT", DataType::Number).hidden().computed()),
            seed(TOTAL, ColumnDefinition::new("Total", DataType::Number).computed()),
        ])
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&ColumnDefinition> {
        self.columns
            .iter()
            .find(|c| c.key == key)
            .map(|c| &c.definition)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Columns a user may type into
    pub fn editable_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.definition.is_editable)
    }

    /// Columns the content-suggestion service may fill in. Derived keys never
    /// appear; image columns are excluded because suggestions are text.
    pub fn generation_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| !is_derived_key(&c.key) && c.definition.data_type != DataType::Image)
    }

    /// Visibility map seeded into a newly created category
    pub fn default_visibility(&self) -> BTreeMap<String, bool> {
        self.columns
            .iter()
            .map(|c| (c.key.clone(), c.definition.default_visible))
            .collect()
    }

    /// A new item with every stored column at its default value
    pub fn new_item(&self) -> Item {
        let mut item = Item::new();
        for column in self.editable_columns() {
            item.seed(&column.key, column.definition.default_value());
        }
        item
    }

    /// Registers a new column and returns its derived key
    pub fn add_column(&mut self, request: NewColumn) -> Result<String, ColumnError> {
        let key = derive_key(&request.label)?;
        if self.contains(&key) {
            return Err(ColumnError::DuplicateKey(key));
        }

        let input_type = match request.input_type {
            Some(input) if !request.data_type.accepts(input) => {
                return Err(ColumnError::IncompatibleInput {
                    data_type: request.data_type.to_string(),
                    input: input.to_string(),
                });
            }
            Some(input) => input,
            None => request.data_type.default_input(),
        };
        if input_type == InputType::Select && request.options.is_empty() {
            return Err(ColumnError::MissingOptions(key));
        }

        let mut definition = ColumnDefinition {
            label: request.label.trim().to_string(),
            data_type: request.data_type,
            input_type,
            default_visible: request.default_visible,
            is_editable: true,
            options: request.options,
        };
        definition.normalize(&key);

        debug!(key = %key, data_type = %definition.data_type, "Column registered");
        self.columns.push(Column {
            key: key.clone(),
            definition,
        });
        Ok(key)
    }

    /// Applies a partial update. A data-type change that leaves the current
    /// input widget incompatible switches it to the first compatible widget.
    pub fn update_column(
        &mut self,
        key: &str,
        update: ColumnUpdate,
    ) -> Result<&ColumnDefinition, ColumnError> {
        let index = self
            .columns
            .iter()
            .position(|c| c.key == key)
            .ok_or_else(|| ColumnError::NotFound(key.to_string()))?;

        let mut definition = self.columns[index].definition.clone();
        let structural = update.data_type.is_some_and(|t| t != definition.data_type)
            || update.input_type.is_some_and(|i| i != definition.input_type);
        if structural && (is_derived_key(key) || PRICING_KEYS.contains(&key)) {
            return Err(ColumnError::FixedColumn(key.to_string()));
        }

        if let Some(label) = update.label {
            if derive_key(&label).is_err() {
                return Err(ColumnError::EmptyLabel);
            }
            definition.label = label.trim().to_string();
        }
        if let Some(data_type) = update.data_type {
            definition.data_type = data_type;
            if !data_type.accepts(definition.input_type) {
                definition.input_type = data_type.default_input();
            }
        }
        if let Some(input) = update.input_type {
            if !definition.data_type.accepts(input) {
                return Err(ColumnError::IncompatibleInput {
                    data_type: definition.data_type.to_string(),
                    input: input.to_string(),
                });
            }
            definition.input_type = input;
        }
        if let Some(options) = update.options {
            definition.options = options;
        }
        if let Some(visible) = update.default_visible {
            definition.default_visible = visible;
        }
        if definition.input_type == InputType::Select && definition.options.is_empty() {
            return Err(ColumnError::MissingOptions(key.to_string()));
        }

        definition.normalize(key);
        self.columns[index].definition = definition;
        Ok(&self.columns[index].definition)
    }

    /// Removes a user-defined column
    pub fn remove_column(&mut self, key: &str) -> Result<Column, ColumnError> {
        let index = self
            .columns
            .iter()
            .position(|c| c.key == key)
            .ok_or_else(|| ColumnError::NotFound(key.to_string()))?;
        if SEED_KEYS.contains(&key) {
            return Err(ColumnError::Protected(key.to_string()));
        }
        if self.columns.len() <= 1 {
            return Err(ColumnError::LastColumn);
        }
        debug!(key = %key, "Column removed");
        Ok(self.columns.remove(index))
    }
}
