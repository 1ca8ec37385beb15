use serde::Serialize;

use crate::error::LabelGateError;

pub fn to_pretty<T: Serialize>(value: &T) -> Result<String, LabelGateError> {
    Ok(serde_json::to_string_pretty(value)?)
}
