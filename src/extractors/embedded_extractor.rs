//! Embedded data blob extraction
//!
//! Reader pages ship their page list inside a serialized data blob, either
//! as a plain object literal (`"images": [...]`) or, in streamed framework
//! payloads, as a JSON string with escaped quotes (`\"images\":[...]`).
//! Elements are plain URL strings or objects carrying a `url` field.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use super::{resolve_url, PageSource};

static IMAGES_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""images"\s*:\s*\["#).unwrap());
static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").unwrap());
static UNQUOTED_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([{,]\s*)([A-Za-z_$][\w$]*)\s*:"#).unwrap());

/// Image URLs from the first `images` array that yields any.
pub fn extract_embedded_images(source: &PageSource<'_>) -> Option<Vec<String>> {
    let mut candidates = vec![source.raw.to_string()];
    if source.raw.contains(r#"\"images\""#) {
        candidates.push(unescape_json_string(source.raw));
    }

    for text in &candidates {
        for key in IMAGES_KEY_RE.find_iter(text) {
            let Some(array) = slice_json_array(text, key.end() - 1) else {
                continue;
            };
            let Some(values) = parse_js_array(array) else {
                continue;
            };

            let urls: Vec<String> = values
                .iter()
                .filter_map(image_url)
                .filter_map(|raw| resolve_url(source.base, raw))
                .map(String::from)
                .collect();

            if !urls.is_empty() {
                return Some(urls);
            }
        }
    }

    None
}

fn image_url(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj.get("url").and_then(Value::as_str),
        _ => None,
    }
}

/// Undo one level of JSON string escaping (`\"` and `\/`)
fn unescape_json_string(text: &str) -> String {
    text.replace(r#"\""#, "\"").replace(r"\/", "/")
}

/// The balanced `[...]` starting at byte `start`, honouring quoted strings.
fn slice_json_array(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'[') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }

        match b {
            b'"' | b'\'' => quote = Some(b),
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return text.get(start..=start + offset);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse an array literal as JSON, falling back to relaxed JavaScript
/// syntax: single quotes, trailing commas, unquoted keys.
fn parse_js_array(js: &str) -> Option<Vec<Value>> {
    if let Ok(values) = serde_json::from_str::<Vec<Value>>(js) {
        return Some(values);
    }

    let json = js.replace('\'', "\"");
    let json = TRAILING_COMMA_RE.replace_all(&json, "$1");
    let json = UNQUOTED_KEY_RE.replace_all(&json, r#"$1"$2":"#);

    serde_json::from_str(&json).ok()
}
