use crate::state::input::Input;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static VAR_RE: Lazy<Regex> = Lazy::new(|| {
    // %senderID%, %thread_id%
    Regex::new(r"%(?P<name>[A-Za-z_][A-Za-z0-9_]*)%").expect("valid regex")
});

/// Replaces every `%name%` with the matching input field: strings verbatim, other values
/// as compact JSON. Absent and falsy fields (`null`, `false`, `0`, `""`) give `undefined`.
/// Substituted text is not scanned again.
pub fn interpolate(script: &str, input: &Input) -> String {
    VAR_RE
        .replace_all(script, |caps: &regex::Captures| render_field(input.field(&caps["name"])))
        .into_owned()
}

fn render_field(value: Option<Value>) -> String {
    match value.filter(is_truthy) {
        Some(Value::String(s)) => s,
        Some(other) => serde_json::to_string(&other).unwrap_or_else(|_| "undefined".to_string()),
        None => "undefined".to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
