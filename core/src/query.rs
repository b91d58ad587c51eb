//! Query string formatting.
//!
//! Values are rendered the way a browser stringifies them before handing them
//! to the form-urlencoded serializer. `null` entries are skipped entirely.

use serde_json::{Map, Number, Value};
use url::form_urlencoded;

/// Serialize `params` into an `application/x-www-form-urlencoded` string.
pub fn format_query(params: &Map<String, Value>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if value.is_null() {
            continue;
        }
        serializer.append_pair(key, &render(value));
    }
    serializer.finish()
}

/// Append the formatted query to `url`, joining with `&` when `url` already
/// has a query component.
pub fn append_query(url: &str, params: &Map<String, Value>) -> String {
    let query = format_query(params);
    if query.is_empty() {
        return url.to_string();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{query}")
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => render_number(n),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Integral floats print without a fraction (`1.0` → `1`), as JS numbers do.
fn render_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{f:.0}")
            }
        }
        _ => n.to_string(),
    }
}
