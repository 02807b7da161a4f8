use super::patterns::{contains_any, NOISE_MARKERS};

/// Collapse every whitespace run to one space and trim both ends.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized, lower-cased text; the form every phrase table is matched against.
pub fn normalize_lower(text: &str) -> String {
    normalize(text).to_lowercase()
}

/// Boilerplate such as copyright lines, scale bars and drawing disclaimers.
pub fn is_noise(text: &str) -> bool {
    contains_any(&text.to_lowercase(), NOISE_MARKERS)
}

/// At least 8 letters, more than 80% of them upper-case.
pub fn looks_allcaps(text: &str) -> bool {
    let (letters, upper) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(letters, upper), c| {
            (letters + 1, upper + usize::from(c.is_uppercase()))
        });
    if letters < 8 {
        return false;
    }
    upper as f32 / letters as f32 > 0.8
}

/// Normalized text after the first `:`, if the text has one. May be empty.
pub fn colon_value(text: &str) -> Option<String> {
    text.split_once(':').map(|(_, tail)| normalize(tail))
}

/// Normalized text cut to at most `max_chars` characters.
pub fn snippet(text: &str, max_chars: usize) -> String {
    normalize(text).chars().take(max_chars).collect()
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize("  Site \n\t Location  "), "Site Location");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n "), "");
    }

    #[test]
    fn noise_markers_case_insensitive() {
        assert!(is_noise("© Crown Copyright 2024"));
        assert!(is_noise("SCALE 1:1250 @ A3"));
        assert!(is_noise("This drawing is not to be scaled"));
        assert!(!is_noise("12 Example Street"));
    }

    #[test]
    fn allcaps_needs_eight_letters() {
        assert!(looks_allcaps("PROPOSED LOFT CONVERSION"));
        assert!(!looks_allcaps("HMO USE"));
        assert!(!looks_allcaps("Proposed loft conversion"));
    }

    #[test]
    fn allcaps_tolerates_some_lowercase() {
        // 10 letters, 9 upper: 90%
        assert!(looks_allcaps("ABCDEFGHIj"));
        // 10 letters, 8 upper: exactly 80% is not enough
        assert!(!looks_allcaps("ABCDEFGHij"));
    }

    #[test]
    fn colon_value_splits_once() {
        assert_eq!(colon_value("Postcode:  B12 3CD ").as_deref(), Some("B12 3CD"));
        assert_eq!(colon_value("Time: 10:30").as_deref(), Some("10:30"));
        assert_eq!(colon_value("Town/City:").as_deref(), Some(""));
        assert_eq!(colon_value("No colon here"), None);
    }

    #[test]
    fn snippet_counts_chars_not_bytes() {
        let text = "é".repeat(300);
        let s = snippet(&text, 240);
        assert_eq!(s.chars().count(), 240);
    }
}
