//! JSON helpers shared by the commands: JavaScript-style number output, nested path access
//! and a Node-style inspection rendering for non-JSON output.

use serde_json::{Map, Number, Value};

/// Widest line `inspect` keeps on one line before breaking members onto their own lines.
const INSPECT_BREAK_WIDTH: usize = 72;

/// Default depth of `inspect` when no `--depth` is given.
pub const INSPECT_DEPTH: usize = 2;

/// Pretty JSON with two-space indentation.
pub fn json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

/// Formats a number the way JavaScript's `String(n)` does.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        // Rust writes "1.5e21" / "1e-7", JavaScript "1.5e+21" / "1e-7"
        let s = format!("{n:e}");
        return match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => s,
        };
    }
    if n.fract() == 0.0 {
        return format!("{n:.0}");
    }
    format!("{n}")
}

/// Integral values become JSON integers so they do not print as `100500.0`.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

/// Splits keys given as separate arguments and/or dotted paths into path segments.
pub fn path_keys<'a, I>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    parts
        .into_iter()
        .flat_map(|p| p.split(['.', ' ']))
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Walks `keys` through objects (by name) and arrays (by index).
pub fn get_nested<'a>(value: &'a Value, keys: &[String]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |acc, key| match acc {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Sets `keys` inside `value`. Arrays are indexed by position (an index one past the end
/// appends); any other intermediate value that cannot hold the key becomes an object.
pub fn set_nested(value: &mut Value, keys: &[String], new: Value) {
    let Some((key, rest)) = keys.split_first() else {
        *value = new;
        return;
    };

    if let Value::Array(items) = value {
        match key.parse::<usize>() {
            Ok(i) if i < items.len() => return set_nested(&mut items[i], rest, new),
            Ok(i) if i == items.len() => {
                let mut slot = Value::Object(Map::new());
                set_nested(&mut slot, rest, new);
                items.push(slot);
                return;
            }
            _ => {}
        }
    }

    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    let Value::Object(map) = value else {
        return;
    };
    let slot = map
        .entry(key.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    set_nested(slot, rest, new);
}

/// Renders a value like Node's `util.inspect`, nesting up to `depth` levels.
pub fn inspect(value: &Value, depth: usize) -> String {
    render(value, 0, depth)
}

fn render(value: &Value, level: usize, depth: usize) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format_number(f),
            _ => n.to_string(),
        },
        Value::String(s) => quote(s),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Array(_) if level > depth => "[Array]".to_string(),
        Value::Object(_) if level > depth => "[Object]".to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(|v| render(v, level + 1, depth)).collect();
            group('[', ']', parts, level)
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", key(k), render(v, level + 1, depth)))
                .collect();
            group('{', '}', parts, level)
        }
    }
}

fn group(open: char, close: char, parts: Vec<String>, level: usize) -> String {
    let single = format!("{open} {} {close}", parts.join(", "));
    if single.len() <= INSPECT_BREAK_WIDTH && !single.contains('\n') {
        return single;
    }
    let pad = "  ".repeat(level + 1);
    let body = parts
        .iter()
        .map(|p| format!("{pad}{p}"))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{open}\n{body}\n{}{close}", "  ".repeat(level))
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'").replace('\n', "\\n"))
}

fn key(k: &str) -> String {
    let mut chars = k.chars();
    let ident = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if ident { k.to_string() } else { quote(k) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_print_like_javascript() {
        assert_eq!(format_number(100500.0), "100500");
        assert_eq!(format_number(5e12), "5000000000000");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn integral_numbers_stay_integers_in_json() {
        assert_eq!(number_value(100500.0), json!(100500));
        assert_eq!(number_value(0.5), json!(0.5));
        assert_eq!(json(&json!({"money": number_value(3.0)})), "{\n  \"money\": 3\n}");
    }

    #[test]
    fn nested_paths() {
        let v = json!({"settings": {"theme": "dark"}, "list": [1, 2]});
        let keys = path_keys(["settings.theme"]);
        assert_eq!(get_nested(&v, &keys), Some(&json!("dark")));
        assert_eq!(get_nested(&v, &path_keys(["list", "1"])), Some(&json!(2)));
        assert_eq!(get_nested(&v, &path_keys(["settings", "nope"])), None);
    }

    #[test]
    fn set_nested_creates_parents() {
        let mut v = json!({"a": 1});
        set_nested(&mut v, &path_keys(["a.b.c"]), json!(true));
        assert_eq!(v, json!({"a": {"b": {"c": true}}}));
    }

    #[test]
    fn set_nested_indexes_arrays() {
        let mut v = json!({"o": {"a": [5]}, "list": [1, 2]});
        set_nested(&mut v, &path_keys(["o.a.0"]), json!(9));
        set_nested(&mut v, &path_keys(["list", "2"]), json!(3));
        assert_eq!(v, json!({"o": {"a": [9]}, "list": [1, 2, 3]}));

        set_nested(&mut v, &path_keys(["list.x"]), json!(0));
        assert_eq!(v["list"], json!({"x": 0}));
    }

    #[test]
    fn inspect_respects_depth() {
        let v = json!({"money": 5, "settings": {"theme": "dark"}});
        assert_eq!(inspect(&v, 0), "{ money: 5, settings: [Object] }");
        assert_eq!(inspect(&v, 2), "{ money: 5, settings: { theme: 'dark' } }");
        assert_eq!(inspect(&json!({"my-key": []}), 2), "{ 'my-key': [] }");
    }

    #[test]
    fn inspect_breaks_long_lines() {
        let long = "x".repeat(80);
        let v = json!({ "a": long });
        let out = inspect(&v, 2);
        assert!(out.starts_with("{\n  a: 'x"));
        assert!(out.ends_with("\n}"));
    }
}
