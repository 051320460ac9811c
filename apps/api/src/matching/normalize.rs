/// Canonical comparison key: trimmed, lower-cased, ASCII alphanumerics only.
///
/// Two labels are "equal" for matching purposes iff their keys are equal.
pub fn normalize(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}
