//! Textual repair of SYSTM workout payloads.
//!
//! The `GetWorkouts` response is not valid JSON: free-text fields carry raw
//! quotes, the whole body is over-escaped, and `triggers` holds its interval
//! tree as a quoted string. Each known defect has its own rule so that drift
//! in the source format can be pinned to a single step.

use std::sync::LazyLock;

use regex::Regex;

/// `"details"` up to the next `"l…` key. `shortDescription` sits between the
/// two in the query, so it is dropped as well.
static DETAILS_FIELD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?s)"details".*?,("l)"#).ok());

const TRIPLE_ESCAPED_QUOTE: &str = r#"\\\""#;
const TRIGGERS_KEY: &str = r#""triggers":""#;

/// Applies every repair rule in order.
///
/// The result is meant for a strict JSON parser; whether it actually parses is
/// left to the caller so a failure can be reported with the parser's error.
pub fn repair(raw: &str) -> String {
    let payload = strip_details(raw);
    let payload = strip_triple_escaped_quotes(&payload);
    let payload = strip_backslashes(&payload);
    unquote_triggers(&payload)
}

/// Rule 1: drop the unused free-text `details` value.
pub fn strip_details(payload: &str) -> String {
    match DETAILS_FIELD.as_ref() {
        Some(re) => re.replace_all(payload, "$1").into_owned(),
        None => payload.to_owned(),
    }
}

/// Rule 2: remove `\\\"` sequences (quotes nested inside the triggers string).
pub fn strip_triple_escaped_quotes(payload: &str) -> String {
    payload.replace(TRIPLE_ESCAPED_QUOTE, "")
}

/// Rule 3: remove every remaining backslash.
pub fn strip_backslashes(payload: &str) -> String {
    payload.replace('\\', "")
}

/// Rule 4: turn `"triggers":"[...]"` into `"triggers":[...]`.
///
/// An empty string becomes `null`. A value that is not a balanced array or
/// object is left untouched and will surface as a parse error.
pub fn unquote_triggers(payload: &str) -> String {
    let Some(key_pos) = payload.find(TRIGGERS_KEY) else {
        return payload.to_owned();
    };

    // Keep everything up to and including the colon.
    let head = &payload[..key_pos + TRIGGERS_KEY.len() - 1];
    let value = &payload[key_pos + TRIGGERS_KEY.len()..];

    if let Some(rest) = value.strip_prefix('"') {
        return format!("{head}null{rest}");
    }

    if !value.starts_with(['[', '{']) {
        return payload.to_owned();
    }

    match balanced_end(value) {
        Some(end) if value[end..].starts_with('"') => {
            format!("{head}{}{}", &value[..end], &value[end + 1..])
        }
        _ => payload.to_owned(),
    }
}

/// Byte offset just past the bracket that closes the one `text` starts with.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;

    for (idx, ch) in text.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '[' | '{' if !in_string => depth += 1,
            ']' | '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}
