//! Key Generation Module
//!
//! Deterministic cache keys for structured lookups, so identical logical
//! requests collide on the same entry.

use serde_json::Value;

// == Generate Key ==
/// Produces a cache key of the form `"{kind}_{params}"`, where `params` is
/// the canonical JSON serialization of the lookup parameters.
///
/// An empty parameter object (or null) yields the bare `kind` with no suffix.
/// serde_json serializes object keys in sorted order, so equal parameters
/// produce equal keys regardless of how the object was assembled.
pub fn generate_key(kind: &str, params: &Value) -> String {
    match params {
        Value::Null => kind.to_string(),
        Value::Object(map) if map.is_empty() => kind.to_string(),
        _ => format!(
            "{}_{}",
            kind,
            serde_json::to_string(params).unwrap_or_default()
        ),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn test_empty_params_yield_bare_kind() {
        assert_eq!(generate_key("dashboard", &json!({})), "dashboard");
        assert_eq!(generate_key("dashboard", &Value::Null), "dashboard");
    }

    #[test]
    fn test_params_are_appended() {
        let key = generate_key("reports", &json!({"page": 2, "site": "main"}));
        assert_eq!(key, r#"reports_{"page":2,"site":"main"}"#);
    }

    #[test]
    fn test_key_is_order_independent() {
        let mut forward = Map::new();
        forward.insert("site".to_string(), json!("main"));
        forward.insert("page".to_string(), json!(2));

        let mut reverse = Map::new();
        reverse.insert("page".to_string(), json!(2));
        reverse.insert("site".to_string(), json!("main"));

        assert_eq!(
            generate_key("reports", &Value::Object(forward)),
            generate_key("reports", &Value::Object(reverse)),
        );
    }

    #[test]
    fn test_distinct_params_yield_distinct_keys() {
        let a = generate_key("reports", &json!({"page": 1}));
        let b = generate_key("reports", &json!({"page": 2}));
        assert_ne!(a, b);
    }
}
