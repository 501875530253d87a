use regex::Regex;

/// Unique postal codes matched in `source`, in first-seen order.
///
/// The whole page source is scanned, markup included, since store pages often
/// keep addresses in data attributes or inline scripts.
pub fn extract_postal_codes(pattern: &Regex, source: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for found in pattern.find_iter(source) {
        let code = found.as_str();
        if !codes.iter().any(|c| c == code) {
            codes.push(code.to_string());
        }
    }
    codes
}
