use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A behavior/criteria option bag. `BTreeMap` keeps iteration (and therefore
/// serialization and test output) deterministic.
pub type OptionBag = BTreeMap<String, OptionValue>;

// ---------------------------------------------------------------------------
// OptionValue
// ---------------------------------------------------------------------------

/// A single option value as the remote API understands it.
///
/// Serialized untagged, so bags round-trip as plain JSON scalars/arrays.
/// `Map` exists for the handful of behaviors whose options nest (the
/// standard `cpCode` behavior wraps its numeric id in an object); the
/// normalizer never produces it from declarative input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<OptionValue>),
    Map(OptionBag),
}

impl OptionValue {
    pub fn text(value: impl Into<String>) -> Self {
        OptionValue::Text(value.into())
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Recover a typed value from a declarative option string.
///
/// Parses are attempted strictly in this order: float, signed integer,
/// boolean (`true`/`false` literals only), then the original string. The
/// first hit wins, so `"1"` comes back as `Float(1.0)` rather than `Int(1)`
/// — the integer arm is only reachable for strings the float parser rejects.
/// This ordering is load-bearing for compatibility with what the remote API
/// already stores; do not reorder.
///
/// Never fails: every input has at least itself as a representation.
pub fn normalize(raw: &str) -> OptionValue {
    if let Ok(f) = raw.parse::<f64>() {
        return OptionValue::Float(f);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return OptionValue::Int(i);
    }
    if let Ok(b) = raw.parse::<bool>() {
        return OptionValue::Bool(b);
    }
    OptionValue::Text(raw.to_string())
}

/// Build a multi-valued option from declarative value strings, normalizing
/// each element independently.
pub fn normalize_values(raw: &[String]) -> OptionValue {
    OptionValue::List(raw.iter().map(|v| normalize(v)).collect())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_strings_become_floats_first() {
        assert_eq!(normalize("1"), OptionValue::Float(1.0));
        assert_eq!(normalize("80"), OptionValue::Float(80.0));
        assert_eq!(normalize("1.5"), OptionValue::Float(1.5));
        assert_eq!(normalize("-3"), OptionValue::Float(-3.0));
    }

    #[test]
    fn boolean_literals_parse_after_numbers() {
        assert_eq!(normalize("true"), OptionValue::Bool(true));
        assert_eq!(normalize("false"), OptionValue::Bool(false));
        // Only the literal forms; anything else stays text.
        assert_eq!(normalize("TRUE"), OptionValue::text("TRUE"));
        assert_eq!(normalize("yes"), OptionValue::text("yes"));
    }

    #[test]
    fn everything_else_is_text() {
        assert_eq!(normalize("abc"), OptionValue::text("abc"));
        assert_eq!(
            normalize("ORIGIN_HOSTNAME"),
            OptionValue::text("ORIGIN_HOSTNAME")
        );
        assert_eq!(normalize(""), OptionValue::text(""));
    }

    #[test]
    fn normalize_is_a_fixed_point_of_the_parse_order() {
        // Rendering a normalized value back to a string and normalizing again
        // must not change its shape.
        for raw in ["1", "2.75", "true", "abc"] {
            let first = normalize(raw);
            let rendered = match &first {
                OptionValue::Float(f) => f.to_string(),
                OptionValue::Bool(b) => b.to_string(),
                OptionValue::Text(t) => t.clone(),
                other => panic!("unexpected shape for {raw}: {other:?}"),
            };
            assert_eq!(normalize(&rendered), first, "input {raw}");
        }
    }

    #[test]
    fn multi_values_normalize_element_wise() {
        let values = vec!["1".to_string(), "true".to_string(), "x".to_string()];
        assert_eq!(
            normalize_values(&values),
            OptionValue::List(vec![
                OptionValue::Float(1.0),
                OptionValue::Bool(true),
                OptionValue::text("x"),
            ])
        );
    }

    #[test]
    fn option_values_serialize_untagged() {
        let mut bag = OptionBag::new();
        bag.insert("enabled".to_string(), OptionValue::Bool(false));
        bag.insert("httpPort".to_string(), OptionValue::Int(80));
        bag.insert("hostname".to_string(), OptionValue::text("example.com"));

        let json = serde_json::to_value(&bag).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "enabled": false,
                "httpPort": 80,
                "hostname": "example.com",
            })
        );
    }
}
