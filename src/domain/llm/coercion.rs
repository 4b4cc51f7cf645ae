//! Best-effort coercion of operator-supplied parameter values.
//!
//! Profile `extra_params` and per-call extras often arrive as strings
//! (`"0.7"`, `"true"`) from config files or environment variables. Known keys
//! are converted to their semantic type before they are placed in a payload;
//! anything that fails to convert is dropped, never raised.

use serde_json::Value;
use tracing::debug;

/// Semantic type of a payload parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Float { min: f64, max: f64 },
    PositiveInt,
    Integer,
    Bool,
    Text,
    Any,
}

/// Look up the declared kind of a parameter key
pub fn param_kind(key: &str) -> ParamKind {
    match key {
        "temperature" => ParamKind::Float { min: 0.0, max: 2.0 },
        "top_p" => ParamKind::Float { min: 0.0, max: 1.0 },
        "presence_penalty" | "frequency_penalty" => ParamKind::Float { min: -2.0, max: 2.0 },
        "max_tokens" => ParamKind::PositiveInt,
        "n" | "seed" | "sessionId" => ParamKind::Integer,
        "stream" | "enableMix" | "enableImage" => ParamKind::Bool,
        "lang" | "thirdPartyUid" | "engineType" => ParamKind::Text,
        _ => ParamKind::Any,
    }
}

/// Coerce a value for `key`, returning `None` when it cannot be used
pub fn coerce_param(key: &str, value: &Value) -> Option<Value> {
    let coerced = coerce_as(param_kind(key), value);
    if coerced.is_none() {
        debug!(key = %key, value = %value, "Dropping parameter that failed coercion");
    }
    coerced
}

fn coerce_as(kind: ParamKind, value: &Value) -> Option<Value> {
    if value.is_null() {
        return None;
    }

    match kind {
        ParamKind::Float { min, max } => as_f64(value)
            .filter(|v| v.is_finite() && *v >= min && *v <= max)
            .map(Value::from),
        ParamKind::PositiveInt => as_i64(value).filter(|v| *v > 0).map(Value::from),
        ParamKind::Integer => as_i64(value).map(Value::from),
        ParamKind::Bool => as_bool(value).map(Value::Bool),
        ParamKind::Text => match value {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        ParamKind::Any => Some(value.clone()),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_float_from_string() {
        assert_eq!(coerce_param("temperature", &json!(" 0.3 ")), Some(json!(0.3)));
        assert_eq!(coerce_param("temperature", &json!(1)), Some(json!(1.0)));
    }

    #[test]
    fn test_float_out_of_range_dropped() {
        assert_eq!(coerce_param("temperature", &json!(2.5)), None);
        assert_eq!(coerce_param("top_p", &json!("1.5")), None);
        assert_eq!(coerce_param("temperature", &json!("warm")), None);
    }

    #[test]
    fn test_positive_int() {
        assert_eq!(coerce_param("max_tokens", &json!("256")), Some(json!(256)));
        assert_eq!(coerce_param("max_tokens", &json!(128.0)), Some(json!(128)));
        assert_eq!(coerce_param("max_tokens", &json!(0)), None);
        assert_eq!(coerce_param("max_tokens", &json!("-5")), None);
        assert_eq!(coerce_param("max_tokens", &json!("lots")), None);
    }

    #[test]
    fn test_bool_spellings() {
        assert_eq!(coerce_param("enableMix", &json!("Yes")), Some(json!(true)));
        assert_eq!(coerce_param("enableMix", &json!("0")), Some(json!(false)));
        assert_eq!(coerce_param("stream", &json!(1)), Some(json!(true)));
        assert_eq!(coerce_param("enableImage", &json!("maybe")), None);
    }

    #[test]
    fn test_session_id_integer() {
        assert_eq!(coerce_param("sessionId", &json!("42")), Some(json!(42)));
        assert_eq!(coerce_param("sessionId", &json!("abc")), None);
    }

    #[test]
    fn test_text_from_scalar() {
        assert_eq!(coerce_param("lang", &json!("en")), Some(json!("en")));
        assert_eq!(coerce_param("thirdPartyUid", &json!(7)), Some(json!("7")));
        assert_eq!(coerce_param("lang", &json!(["en"])), None);
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        assert_eq!(
            coerce_param("response_format", &json!({"type": "text"})),
            Some(json!({"type": "text"}))
        );
        assert_eq!(coerce_param("custom", &Value::Null), None);
    }
}
