/// Edit distance between two strings, counted in chars.
///
/// Inputs are compared as given; callers lower-case or normalize first.
pub fn distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// `distance / max(len)` in chars. 0.0 for two empty strings.
pub fn distance_ratio(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    distance(a, b) as f64 / longest as f64
}

/// True when the two words are closer than `threshold` (a ratio in 0.0..=1.0).
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    distance_ratio(a, b) < threshold
}
