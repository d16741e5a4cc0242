//! Utility functions for rounding and text matching

/// Round to 2 decimal places (half away from zero)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to the nearest integer, ties to even
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Round to the nearest 100 currency units, ties to even
/// e.g. 15234.7 -> 15200, 15250.0 -> 15200, 15350.0 -> 15400
pub fn round_to_hundred(value: f64) -> i64 {
    round_half_even(value / 100.0) * 100
}

/// Case-insensitive substring test, the in-process twin of SQL `ILIKE '%needle%'`
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Build an `ILIKE` pattern matching `value` anywhere, with wildcards in the input escaped
pub fn ilike_contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Normalize free text for use as a categorical model feature
pub fn normalize_feature_text(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(45.454545), 45.45);
        assert_eq!(round2(11000.0), 11000.0);
        assert_eq!(round2(-12.345678), -12.35);
    }

    #[test]
    fn test_round_to_hundred() {
        assert_eq!(round_to_hundred(15234.7), 15200);
        assert_eq!(round_to_hundred(15250.0), 15200); // tie goes to even
        assert_eq!(round_to_hundred(15350.0), 15400);
        assert_eq!(round_to_hundred(15251.0), 15300);
        assert_eq!(round_to_hundred(49.0), 0);
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(13680.0), 13680);
        assert_eq!(round_half_even(2.5), 2);
        assert_eq!(round_half_even(3.5), 4);
        assert_eq!(round_half_even(-2.5), -2);
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Hitech City", "hitech"));
        assert!(contains_ignore_case("Bangalore", "BANGALORE"));
        assert!(contains_ignore_case("Anna Nagar", "nagar"));
        assert!(!contains_ignore_case("Kondapur", "madhapur"));
    }

    #[test]
    fn test_ilike_pattern_escapes_wildcards() {
        assert_eq!(ilike_contains_pattern("Powai"), "%Powai%");
        assert_eq!(ilike_contains_pattern("100%_a\\b"), "%100\\%\\_a\\\\b%");
    }

    #[test]
    fn test_normalize_feature_text() {
        assert_eq!(normalize_feature_text("  Hitech City "), "hitech city");
    }
}
