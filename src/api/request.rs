use serde::de::DeserializeOwned;

use crate::domain::RuleId;
use crate::error::RegistryError;

/// Parse a rule id taken from the request path.
pub fn parse_rule_id(raw: &str) -> Result<RuleId, RegistryError> {
    raw.trim()
        .parse::<RuleId>()
        .map_err(|e| RegistryError::MalformedRequest(format!("invalid rule id {:?}: {}", raw, e)))
}

/// Decode a JSON request body.
///
/// Used instead of the `Json` extractor so malformed bodies come back in
/// the same envelope as every other error.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, RegistryError> {
    if body.is_empty() {
        return Err(RegistryError::MalformedRequest(
            "request body is empty".to_string(),
        ));
    }

    serde_json::from_slice(body)
        .map_err(|e| RegistryError::MalformedRequest(format!("invalid JSON body: {}", e)))
}
