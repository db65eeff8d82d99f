//! XML Request Bodies
//!
//! Renders a JSON-shaped object as the XML document the appliance control
//! channel expects: the object name is the root element, object keys become
//! child elements and lists are wrapped in their plural element with one
//! singular child per entry.

use serde_json::Value;
use std::collections::HashMap;

/// Render `value` under a root element named `object_name`.
///
/// `plurals` maps a list element name to the name of its entries. Lists
/// without an entry fall back to the name minus a trailing `s`.
pub fn render(object_name: &str, value: &Value, plurals: &HashMap<String, String>) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    write_element(&mut out, object_name, value, plurals);
    out
}

fn write_element(out: &mut String, name: &str, value: &Value, plurals: &HashMap<String, String>) {
    match value {
        Value::Null => {
            out.push('<');
            out.push_str(name);
            out.push_str("/>");
        }
        Value::Object(map) => {
            open(out, name);
            for (key, child) in map {
                write_element(out, key, child, plurals);
            }
            close(out, name);
        }
        Value::Array(items) => {
            let singular = singular_of(name, plurals);
            open(out, name);
            for item in items {
                write_element(out, &singular, item, plurals);
            }
            close(out, name);
        }
        Value::String(s) => {
            open(out, name);
            out.push_str(&escape(s));
            close(out, name);
        }
        Value::Bool(_) | Value::Number(_) => {
            open(out, name);
            out.push_str(&value.to_string());
            close(out, name);
        }
    }
}

fn singular_of(name: &str, plurals: &HashMap<String, String>) -> String {
    match plurals.get(name) {
        Some(singular) => singular.clone(),
        None => name.strip_suffix('s').unwrap_or(name).to_string(),
    }
}

fn open(out: &mut String, name: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
}

fn close(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PROLOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

    #[test]
    fn test_render_flat_object() {
        let body = render("vip", &json!({"name": "web", "port": 80}), &HashMap::new());

        assert_eq!(
            body,
            format!("{}<vip><name>web</name><port>80</port></vip>", PROLOG)
        );
    }

    #[test]
    fn test_render_list_with_plural_table() {
        let mut plurals = HashMap::new();
        plurals.insert("members".to_string(), "member".to_string());

        let body = render(
            "pool",
            &json!({"members": [{"address": "10.0.0.1"}, {"address": "10.0.0.2"}]}),
            &plurals,
        );

        assert_eq!(
            body,
            format!(
                "{}<pool><members><member><address>10.0.0.1</address></member>\
                 <member><address>10.0.0.2</address></member></members></pool>",
                PROLOG
            )
        );
    }

    #[test]
    fn test_render_list_default_singular() {
        let body = render("pool", &json!({"monitors": ["hm-1"]}), &HashMap::new());
        assert!(body.contains("<monitors><monitor>hm-1</monitor></monitors>"));
    }

    #[test]
    fn test_render_escapes_text() {
        let body = render("vip", &json!({"name": "a<b&c"}), &HashMap::new());
        assert!(body.contains("<name>a&lt;b&amp;c</name>"));
    }

    #[test]
    fn test_render_null_and_bool() {
        let body = render(
            "port",
            &json!({"device_id": null, "admin_state_up": false}),
            &HashMap::new(),
        );
        assert!(body.contains("<device_id/>"));
        assert!(body.contains("<admin_state_up>false</admin_state_up>"));
    }
}
