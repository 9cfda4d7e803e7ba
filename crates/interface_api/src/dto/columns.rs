//! Column registry DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_document::{Column, ColumnUpdate, DataType, InputType, NewColumn};

fn visible() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumnRequest {
    #[validate(length(min = 1, max = 80, message = "label is required"))]
    pub label: String,
    pub data_type: DataType,
    pub input_type: Option<InputType>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub options: Vec<String>,
    #[serde(default = "visible")]
    pub default_visible: bool,
}

impl From<CreateColumnRequest> for NewColumn {
    fn from(request: CreateColumnRequest) -> Self {
        NewColumn {
            label: request.label,
            data_type: request.data_type,
            input_type: request.input_type,
            options: request.options,
            default_visible: request.default_visible,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateColumnRequest {
    #[validate(length(min = 1, max = 80))]
    pub label: Option<String>,
    pub data_type: Option<DataType>,
    pub input_type: Option<InputType>,
    pub options: Option<Vec<String>>,
    pub default_visible: Option<bool>,
}

impl From<UpdateColumnRequest> for ColumnUpdate {
    fn from(request: UpdateColumnRequest) -> Self {
        ColumnUpdate {
            label: request.label,
            data_type: request.data_type,
            input_type: request.input_type,
            options: request.options,
            default_visible: request.default_visible,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumnResponse {
    pub key: String,
    pub columns: Vec<Column>,
}
