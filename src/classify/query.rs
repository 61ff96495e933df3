// Query string helpers for request classification
// Author: kelexine (https://github.com/kelexine)

use url::form_urlencoded;

/// Parse a boolean using the conventional string forms.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
/// Anything else is `None`.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Return the first decoded value of `name` in a raw query string.
///
/// Pairs containing `;` are skipped, as are empty pairs.
pub fn query_value(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .filter(|pair| !pair.contains(';'))
        .flat_map(|pair| form_urlencoded::parse(pair.as_bytes()))
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
