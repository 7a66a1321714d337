//! JSON parsing workload.

use serde_json::Value;

use super::WorkloadError;

/// Parse `doc` and extract `field` as an integer.
pub fn extract_integer(doc: &str, field: &'static str) -> Result<i64, WorkloadError> {
    let parsed: Value = serde_json::from_str(doc)?;
    parsed
        .get(field)
        .and_then(Value::as_i64)
        .ok_or(WorkloadError::JsonField(field))
}
