//! MySQL row decoding.
//!
//! Rows come back from the driver as typed columns. This module turns each
//! row into an ordered JSON map so the formatter can render any result set
//! without knowing its schema.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies the MySQL column type into a logical category
//! 2. A per-category decoder extracts the value
//!
//! Statements run over the text protocol, so every decoder falls back to
//! reading the raw column text when the typed decode is not possible.

use crate::models::Row;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::{Column, Decode, Row as _, Type, TypeInfo};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for MySQL column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Text,
    Binary,
    Json,
    Date,
    DateTime,
    Time,
    Unknown,
}

/// Classify a MySQL type name (as reported by the driver) into a category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal first: "numeric" would otherwise look like a float
    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }

    // TINYINT(1) is reported as BOOLEAN; show it the way the server stores it
    if lower.contains("int") || lower == "boolean" || lower == "year" {
        return TypeCategory::Integer;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower == "json" {
        return TypeCategory::Json;
    }

    if lower.contains("blob") || lower.contains("binary") {
        return TypeCategory::Binary;
    }

    if lower.contains("char") || lower.contains("text") || lower == "enum" || lower == "set" {
        return TypeCategory::Text;
    }

    if lower == "datetime" || lower == "timestamp" {
        return TypeCategory::DateTime;
    }

    if lower == "date" {
        return TypeCategory::Date;
    }

    if lower == "time" {
        return TypeCategory::Time;
    }

    TypeCategory::Unknown
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw DECIMAL/NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Binary Encoding
// =============================================================================

/// Show binary data as text when it is valid UTF-8, base64 otherwise.
///
/// MySQL 8 reports several INFORMATION_SCHEMA text columns with a binary
/// collation, so UTF-8 decoding is tried first.
pub fn decode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    match std::str::from_utf8(bytes) {
        Ok(s) => JsonValue::String(s.to_string()),
        Err(_) => JsonValue::String(STANDARD.encode(bytes)),
    }
}

// =============================================================================
// Row to JSON Trait
// =============================================================================

/// Trait for converting database rows to ordered JSON maps.
pub trait RowToJson {
    fn to_json_map(&self) -> Row;
    fn column_names(&self) -> Vec<String>;
}

impl RowToJson for MySqlRow {
    fn to_json_map(&self) -> Row {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let category = categorize_type(col.type_info().name());
                (col.name().to_string(), decode_column(self, idx, category))
            })
            .collect()
    }

    fn column_names(&self) -> Vec<String> {
        self.columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect()
    }
}

// =============================================================================
// Decoders
// =============================================================================

fn decode_column(row: &MySqlRow, idx: usize, category: TypeCategory) -> JsonValue {
    if is_null(row, idx) {
        return JsonValue::Null;
    }
    match category {
        TypeCategory::Decimal => decode_decimal(row, idx),
        TypeCategory::Integer => decode_integer(row, idx),
        TypeCategory::Float => decode_float(row, idx),
        TypeCategory::Binary => decode_binary_col(row, idx),
        TypeCategory::Json => decode_json(row, idx),
        TypeCategory::Date => decode_temporal::<NaiveDate>(row, idx),
        TypeCategory::DateTime => decode_temporal::<NaiveDateTime>(row, idx),
        TypeCategory::Time => decode_temporal::<NaiveTime>(row, idx),
        TypeCategory::Text | TypeCategory::Unknown => decode_text(row, idx),
    }
}

fn is_null(row: &MySqlRow, idx: usize) -> bool {
    use sqlx::ValueRef;
    row.try_get_raw(idx).map(|v| v.is_null()).unwrap_or(false)
}

fn decode_decimal(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get::<RawDecimal, _>(idx) {
        Ok(v) => JsonValue::String(v.0),
        Err(e) => {
            tracing::debug!(error = %e, "Falling back to raw text for DECIMAL");
            decode_text(row, idx)
        }
    }
}

fn decode_integer(row: &MySqlRow, idx: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(v) = row.try_get::<u64, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(v) = row.try_get::<i8, _>(idx) {
        return JsonValue::Number(v.into());
    }
    if let Ok(v) = row.try_get::<u8, _>(idx) {
        return JsonValue::Number(v.into());
    }
    decode_text(row, idx)
}

fn decode_float(row: &MySqlRow, idx: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return serde_json::Number::from_f64(v)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string()));
    }
    if let Ok(v) = row.try_get::<f32, _>(idx) {
        return serde_json::Number::from_f64(v as f64)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(v.to_string()));
    }
    decode_text(row, idx)
}

fn decode_binary_col(row: &MySqlRow, idx: usize) -> JsonValue {
    row.try_get::<Vec<u8>, _>(idx)
        .map(|v| decode_binary_value(&v))
        .unwrap_or_else(|_| decode_text(row, idx))
}

fn decode_json(row: &MySqlRow, idx: usize) -> JsonValue {
    row.try_get::<JsonValue, _>(idx)
        .unwrap_or_else(|_| decode_text(row, idx))
}

fn decode_temporal<T>(row: &MySqlRow, idx: usize) -> JsonValue
where
    T: for<'r> Decode<'r, sqlx::MySql> + Type<sqlx::MySql> + ToString,
{
    row.try_get::<T, _>(idx)
        .map(|v| JsonValue::String(v.to_string()))
        // Zero dates and TIME values outside 00:00..24:00 have no chrono form
        .unwrap_or_else(|_| decode_text(row, idx))
}

fn decode_text(row: &MySqlRow, idx: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<String, _>(idx) {
        return JsonValue::String(v);
    }
    if let Ok(v) = row.try_get_unchecked::<String, _>(idx) {
        return JsonValue::String(v);
    }
    match row.try_get_unchecked::<Vec<u8>, _>(idx) {
        Ok(bytes) => decode_binary_value(&bytes),
        Err(e) => {
            tracing::warn!(column = idx, error = %e, "Failed to decode column");
            JsonValue::Null
        }
    }
}
