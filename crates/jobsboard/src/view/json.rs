use serde_json::Value;

/// Pretty-print `text` as JSON with two-space indentation, or hand it back
/// unchanged when it does not parse. Never fails.
pub fn try_pretty_print(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| text.to_string())
}
