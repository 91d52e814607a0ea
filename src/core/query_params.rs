use std::collections::HashMap;

/// Parse query parameters from a URI string
///
/// Values are URL-decoded. A repeated key keeps its last value; a key
/// without `=` maps to an empty string.
///
/// # Example
/// ```
/// use chatter::core::query_params::parse_query_params;
///
/// let params = parse_query_params("/posts?user=4f1c&page=2");
/// assert_eq!(params.get("user"), Some(&"4f1c".to_string()));
/// assert_eq!(params.get("page"), Some(&"2".to_string()));
/// ```
pub fn parse_query_params(uri: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    let Some((_, query)) = uri.split_once('?') else {
        return params;
    };

    for param in query.split('&').filter(|p| !p.is_empty()) {
        match param.split_once('=') {
            Some((key, encoded_value)) => {
                let decoded = urlencoding::decode(encoded_value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| encoded_value.to_string());
                params.insert(key.to_string(), decoded);
            }
            None => {
                params.insert(param.to_string(), String::new());
            }
        }
    }

    params
}

/// Get a non-empty string parameter
pub fn get_string(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).filter(|v| !v.is_empty()).cloned()
}

/// Path of a request URI without its query string
pub fn path_of(uri: &str) -> &str {
    let path = uri.split_once('?').map_or(uri, |(path, _)| path);
    // absolute-form URIs carry scheme and authority
    match path.find("://") {
        Some(scheme_end) => {
            let rest = &path[scheme_end + 3..];
            rest.find('/').map_or("/", |i| &rest[i..])
        }
        None => path,
    }
}
