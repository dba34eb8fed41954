//! Supervisor event token parsing.

use std::collections::HashMap;

/// Parse one supervisor token line into key/value headers.
///
/// Tokens are space-separated `key:value` pairs split on the first colon;
/// keys and values are trimmed. Tokens without a colon, or whose trimmed
/// key is empty, are skipped rather than rejected. Duplicate keys keep
/// the last occurrence.
pub fn parse_token(line: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for pair in line.split(' ') {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        headers.insert(key.to_string(), value.trim().to_string());
    }
    headers
}
