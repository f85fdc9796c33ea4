//! Related objects may be referenced by primary key or by url.

use crate::error::{StorefrontError, StorefrontResult};
use regex::Regex;
use serde_json::Value;

fn url_pattern(collection: &str) -> StorefrontResult<Regex> {
    let pattern = format!(r"/{}/(\d+)/?$", regex::escape(collection));
    Regex::new(&pattern).map_err(|e| {
        StorefrontError::Config(format!("Bad hyperlink pattern for {}: {}", collection, e))
    })
}

/// Primary key named by `7`, `"7"` or `"http://host/api/<collection>/7/"`.
pub fn resolve_pk(value: &Value, collection: &str) -> StorefrontResult<u64> {
    let invalid = || {
        StorefrontError::Validation(format!("Invalid hyperlink to {}: {}", collection, value))
    };
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(invalid),
        Value::String(s) => {
            if let Ok(pk) = s.trim().parse() {
                return Ok(pk);
            }
            url_pattern(collection)?
                .captures(s.trim())
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

/// Replace url references in `body` with primary keys, in place.
pub fn resolve_fields(body: &mut Value, fields: &[(&str, &str)]) -> StorefrontResult<()> {
    let Value::Object(map) = body else {
        return Err(StorefrontError::Validation(
            "Expected a JSON object".to_string(),
        ));
    };
    for (field, collection) in fields {
        if let Some(value) = map.get_mut(*field) {
            if !value.is_null() {
                *value = Value::from(resolve_pk(value, collection)?);
            }
        }
    }
    Ok(())
}
