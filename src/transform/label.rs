use serde_json::Value;

use crate::entities::label::{NormalizedLabel, RawLabel};

pub(crate) const UNKNOWN: &str = "Unknown";

/// Flattens one label field: strings pass through, string lists are joined with a
/// single space. Anything else, including an empty list, becomes `"Unknown"`.
fn label_text(value: Option<&Value>) -> String {
    let text = match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(Value::as_str)
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(" ")),
        _ => None,
    };
    text.unwrap_or_else(|| UNKNOWN.to_string())
}

pub(crate) fn normalize(raw: &RawLabel) -> NormalizedLabel {
    let openfda = raw.get("openfda").and_then(Value::as_object);
    let openfda_field = |key: &str| label_text(openfda.and_then(|o| o.get(key)));

    NormalizedLabel {
        brand_name: openfda_field("brand_name"),
        generic_name: openfda_field("generic_name"),
        purpose: label_text(raw.get("purpose")),
        indications: label_text(raw.get("indications_and_usage")),
        warnings: label_text(raw.get("warnings")),
        interactions: label_text(raw.get("drug_interactions")),
    }
}
