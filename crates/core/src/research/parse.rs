//! Parsing the agent's advisory JSON into reviewable rows
//!
//! The agent is asked for an object mapping category names to item lists,
//! but field names drift between runs (`item_name` vs `item_service`,
//! `price` vs `cost_per_unit`). Everything here is lenient; only a
//! non-JSON or non-object document is an error.

use serde_json::{Map, Value};

use super::model::{ApprovalStatus, ResearchCategory, ResearchData, ReviewRow};
use crate::error::ResultParseError;
use crate::text::title_case;

/// Display label for a category key
pub fn category_label(key: &str) -> String {
    match key {
        "research_items" => "Recommendations".to_string(),
        "durable_medical_equipment" => "Durable Medical Equipment".to_string(),
        "home_modifications" => "Home Modifications".to_string(),
        "medications" => "Medications".to_string(),
        "therapeutic_modalities" => "Therapeutic Modalities".to_string(),
        other => title_case(other),
    }
}

/// Parse the final workflow text.
///
/// Array-valued keys become categories; empty arrays and non-array values
/// are skipped.
pub fn parse_research_result(text: &str) -> Result<ResearchData, ResultParseError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(object) = value else {
        return Err(ResultParseError::NotAnObject);
    };

    let categories = object
        .iter()
        .filter_map(|(key, value)| {
            let items = value.as_array()?;
            let rows: Vec<ReviewRow> = items
                .iter()
                .filter_map(Value::as_object)
                .map(normalize_row)
                .collect();
            if rows.is_empty() {
                return None;
            }
            Some(ResearchCategory {
                key: key.clone(),
                label: category_label(key),
                rows,
            })
        })
        .collect();

    Ok(ResearchData { categories })
}

/// Normalize one item record
pub fn normalize_row(item: &Map<String, Value>) -> ReviewRow {
    ReviewRow {
        item_service: first_text(item, &["item_service", "item_name", "name"]),
        cost: parse_cost(item),
        frequency: first_text(item, &["frequency", "replacement_frequency"]),
        cpt_code: first_text(item, &["cpt_code"]),
        comment: first_text(item, &["comment"]),
        sources: join_sources(item.get("sources")),
        doctor_approval: ApprovalStatus::Pending,
        doctor_notes: String::new(),
    }
}

/// First key whose value renders to non-empty text
fn first_text(item: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| item.get(*key))
        .map(value_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `cost_per_unit` wins over `price` whenever the key is present
fn parse_cost(item: &Map<String, Value>) -> f64 {
    let raw = item.get("cost_per_unit").or_else(|| item.get("price"));
    let cost = match raw {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
                .collect();
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
        _ => 0.0,
    };
    if cost.is_finite() && cost > 0.0 {
        cost
    } else {
        0.0
    }
}

fn join_sources(sources: Option<&Value>) -> String {
    match sources {
        Some(Value::Array(list)) => list.iter().map(value_text).collect::<Vec<_>>().join("\n"),
        Some(value) if is_blank(value) => String::new(),
        Some(other) => value_text(other),
        None => String::new(),
    }
}

/// Empty or zero values carry no source
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(list) => list.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(true) => false,
    }
}
