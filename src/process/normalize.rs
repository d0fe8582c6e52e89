// src/process/normalize.rs

/// Cleans one cell: trimmed, blank becomes `None`, decimal comma becomes a point.
/// No range check is applied; odd values pass through unchanged.
pub fn normalize_score(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.replacen(',', ".", 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_becomes_point() {
        assert_eq!(normalize_score("8,5").as_deref(), Some("8.5"));
        assert_eq!(normalize_score(" 6,25 ").as_deref(), Some("6.25"));
        assert_eq!(normalize_score("7").as_deref(), Some("7"));
    }

    #[test]
    fn blank_is_absent() {
        assert_eq!(normalize_score(""), None);
        assert_eq!(normalize_score(" \t\n"), None);
        assert_eq!(normalize_score("\u{a0}"), None);
    }

    #[test]
    fn only_first_comma_is_replaced() {
        assert_eq!(normalize_score("1,2,3").as_deref(), Some("1.2,3"));
    }

    #[test]
    fn out_of_range_passes_through() {
        assert_eq!(normalize_score("12,75").as_deref(), Some("12.75"));
        assert_eq!(normalize_score("vắng").as_deref(), Some("vắng"));
    }

    #[test]
    fn idempotent_on_point_decimals() {
        for raw in ["8.5", " 7.25", "10", "0.0", "  "] {
            let once = normalize_score(raw);
            let twice = once.as_deref().and_then(normalize_score);
            assert_eq!(once, twice, "input {:?}", raw);
        }
    }
}
