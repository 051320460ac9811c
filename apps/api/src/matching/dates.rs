use chrono::NaiveDate;

/// Accepted input layouts, most specific first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"];

/// Rewrites a date answer as `YYYY-MM-DD` when it parses as a real calendar
/// date in one of the accepted layouts; anything else is returned as given.
pub fn normalize_date(answer: &str) -> String {
    let trimmed = answer.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| answer.to_string())
}
