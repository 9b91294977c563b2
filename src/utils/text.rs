// src/utils/text.rs
//! Small string predicates shared by the field extractors.

/// Lowercases and drops every whitespace character, so that
/// "HDFC Equity  Growth" and "hdfcequitygrowth" compare equal.
pub fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn has_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

/// Bidirectional containment over normalized names. Empty operands never match.
pub fn names_overlap(a: &str, b: &str) -> bool {
    let a = normalize_name(a);
    let b = normalize_name(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_name("  HDFC Equity\n Growth "), "hdfcequitygrowth");
    }

    #[test]
    fn overlap_is_bidirectional() {
        assert!(names_overlap("HDFC Equity Growth Fund - Direct Plan", "HDFC Equity Growth"));
        assert!(names_overlap("HDFC Equity Growth", "HDFC Equity Growth Fund - Direct Plan"));
        assert!(!names_overlap("Axis Bluechip", "HDFC Equity Growth"));
        assert!(!names_overlap("", "HDFC"));
    }

    #[test]
    fn digit_and_ci_checks() {
        assert!(has_digit("₹5,234.56 Cr"));
        assert!(!has_digit("--"));
        assert!(contains_ci("Fund Size (Cr)", "fund size"));
    }
}
