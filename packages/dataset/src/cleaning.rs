//! Field-level cleaning rules.
//!
//! None of these functions fail: a value that cannot be interpreted becomes
//! `None`.

use sasv_incident_models::RawCell;

/// Phrase introducing an upper bound in age text ("menos de 1" = under 1).
const LESS_THAN: &str = "menos de";

/// Parses a numeric cell. Text is trimmed before parsing; NaN and
/// unparseable text yield `None`.
#[must_use]
pub fn parse_number(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Missing => None,
        RawCell::Number(value) => Some(*value).filter(|v| !v.is_nan()),
        RawCell::Text(text) => parse_f64(text),
    }
}

/// Normalizes the victim age field into years.
///
/// * numbers are kept as they are
/// * `"X-Y"` ranges become the midpoint
/// * `"menos de N"` becomes `N / 2`
/// * plain digit strings become their integer value
/// * anything else is `None`
#[must_use]
pub fn normalize_age(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Missing => None,
        RawCell::Number(value) => Some(*value).filter(|v| !v.is_nan()),
        RawCell::Text(text) => normalize_age_text(text),
    }
}

fn normalize_age_text(text: &str) -> Option<f64> {
    let value = text.trim().to_lowercase();

    if value.contains('-') {
        let mut parts = value.split('-');
        let low = parse_f64(parts.next()?)?;
        let high = parse_f64(parts.next()?)?;
        return Some(f64::midpoint(low, high));
    }

    if value.contains(LESS_THAN) {
        let bound = parse_f64(&value.replace(LESS_THAN, ""))?;
        return Some(bound / 2.0);
    }

    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return parse_f64(&value);
    }

    None
}

fn parse_f64(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    #[test]
    fn age_range_becomes_midpoint() {
        assert_eq!(normalize_age(&text("20-30")), Some(25.0));
        assert_eq!(normalize_age(&text(" 18 - 19 ")), Some(18.5));
        assert_eq!(normalize_age(&text("0-0")), Some(0.0));
    }

    #[test]
    fn age_range_with_unparseable_side_is_missing() {
        assert_eq!(normalize_age(&text("20-")), None);
        assert_eq!(normalize_age(&text("-5")), None);
        assert_eq!(normalize_age(&text("veinte-treinta")), None);
    }

    #[test]
    fn less_than_halves_the_bound() {
        assert_eq!(normalize_age(&text("menos de 1")), Some(0.5));
        assert_eq!(normalize_age(&text("Menos de 10")), Some(5.0));
        assert_eq!(normalize_age(&text("menos de un año")), None);
    }

    #[test]
    fn digit_strings_become_numbers() {
        assert_eq!(normalize_age(&text("42")), Some(42.0));
        assert_eq!(normalize_age(&text("  7 ")), Some(7.0));
        assert_eq!(normalize_age(&text("007")), Some(7.0));
    }

    #[test]
    fn decimal_text_is_not_an_age() {
        assert_eq!(normalize_age(&text("42.5")), None);
        assert_eq!(normalize_age(&RawCell::Number(42.5)), Some(42.5));
    }

    #[test]
    fn other_text_is_missing() {
        assert_eq!(normalize_age(&text("sin determinar")), None);
        assert_eq!(normalize_age(&text("42.5")), None);
        assert_eq!(normalize_age(&text("")), None);
        assert_eq!(normalize_age(&RawCell::Missing), None);
    }

    #[test]
    fn numeric_age_passes_through() {
        assert_eq!(normalize_age(&RawCell::Number(33.5)), Some(33.5));
        assert_eq!(normalize_age(&RawCell::Number(f64::NAN)), None);
    }

    #[test]
    fn every_range_midpoint_holds() {
        for low in 0..60_u32 {
            for high in low..low + 5 {
                let age = normalize_age(&text(&format!("{low}-{high}")));
                assert_eq!(age, Some(f64::from(low + high) / 2.0));
            }
        }
    }

    #[test]
    fn numbers_parse_with_whitespace() {
        assert_eq!(parse_number(&text(" -34.6 ")), Some(-34.6));
        assert_eq!(parse_number(&text("1e2")), Some(100.0));
        assert_eq!(parse_number(&text("-34,6")), None);
        assert_eq!(parse_number(&text("abc")), None);
        assert_eq!(parse_number(&RawCell::Missing), None);
        assert_eq!(parse_number(&RawCell::Number(2019.0)), Some(2019.0));
    }
}
