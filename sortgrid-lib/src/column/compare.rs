//! Built-in comparators.
//!
//! Both comparators define a total order, so `Direction::Descending` can be
//! the plain reversal of the ascending result.

use std::cmp::Ordering;

use unicode_normalization::char::{decompose_canonical, is_combining_mark};
use unicode_script::{Script, UnicodeScript};

use crate::model::Value;

/// Primary ordering group: digits and punctuation, then Cyrillic, then every
/// other script.
fn script_group(c: char) -> u8 {
    match c.script() {
        Script::Common | Script::Inherited => 0,
        Script::Cyrillic => 1,
        _ => 2,
    }
}

#[derive(Debug, Default)]
struct CollationKey {
    primary: Vec<(u8, char)>,
    secondary: Vec<u32>,
}

/// Splits a string into case-folded base letters and accent weights.
///
/// Accents are dropped from the primary level, so `é` sorts with `e` and
/// `ё` with `е`. `й` keeps its own letter, right after `и`.
fn collation_key(s: &str) -> CollationKey {
    let mut key = CollationKey::default();
    let mut push = |c: char| {
        if is_combining_mark(c) {
            key.secondary.push(c as u32);
        } else {
            key.primary.push((script_group(c), c));
            key.secondary.push(0);
        }
    };

    for c in s.chars().flat_map(char::to_lowercase) {
        if c == 'й' {
            push(c);
        } else {
            decompose_canonical(c, &mut push);
        }
    }
    key
}

fn case_rank(c: char) -> u8 {
    if c.is_uppercase() { 0 } else { 1 }
}

/// Compares two strings with Russian-first collation.
///
/// Levels, in order: case-folded base letters (Cyrillic before Latin),
/// accents, case (uppercase first at the first differing position), raw
/// code points. Only identical strings compare equal.
pub fn compare_strings(a: &str, b: &str) -> Ordering {
    let (ka, kb) = (collation_key(a), collation_key(b));
    ka.primary
        .cmp(&kb.primary)
        .then_with(|| ka.secondary.cmp(&kb.secondary))
        .then_with(|| a.chars().map(case_rank).cmp(b.chars().map(case_rank)))
        .then_with(|| a.cmp(b))
}

/// Compares two numbers. NaN is greater than every number and equal to NaN.
pub fn compare_numbers(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// `string` sort type over cell values.
///
/// Non-string values compare by their display form; null is the empty string.
pub fn compare_text(a: &Value, b: &Value) -> Ordering {
    match (a.as_str(), b.as_str()) {
        (Some(a), Some(b)) => compare_strings(a, b),
        _ => compare_strings(&a.to_string(), &b.to_string()),
    }
}

/// `number` sort type over cell values. Non-numeric values act as NaN.
pub fn compare_numeric(a: &Value, b: &Value) -> Ordering {
    compare_numbers(
        a.as_f64().unwrap_or(f64::NAN),
        b.as_f64().unwrap_or(f64::NAN),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut words: Vec<&str>) -> Vec<&str> {
        words.sort_by(|a, b| compare_strings(a, b));
        words
    }

    #[test]
    fn test_uppercase_first() {
        assert_eq!(
            sorted(vec!["абрикос", "Абрикос", "яблоко", "Яблоко"]),
            vec!["Абрикос", "абрикос", "Яблоко", "яблоко"]
        );
    }

    #[test]
    fn test_case_insensitive_primary() {
        assert_eq!(sorted(vec!["banana", "Apple", "cherry"]), vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn test_yo_follows_ye() {
        assert_eq!(sorted(vec!["всё", "жук", "все"]), vec!["все", "всё", "жук"]);
        assert_eq!(sorted(vec!["жук", "ёж"]), vec!["ёж", "жук"]);
    }

    #[test]
    fn test_cyrillic_before_latin() {
        assert_eq!(
            sorted(vec!["apple", "яблоко", "zebra", "éclair"]),
            vec!["яблоко", "apple", "éclair", "zebra"]
        );
    }

    #[test]
    fn test_accents_are_secondary() {
        assert_eq!(
            sorted(vec!["ecrin", "éclair", "eclair"]),
            vec!["eclair", "éclair", "ecrin"]
        );
        assert_eq!(sorted(vec!["ель", "ёлка"]), vec!["ёлка", "ель"]);
    }

    #[test]
    fn test_short_i_is_own_letter() {
        assert_eq!(sorted(vec!["йод", "квас", "иней"]), vec!["иней", "йод", "квас"]);
    }

    #[test]
    fn test_digits_before_letters() {
        assert_eq!(sorted(vec!["b2", "Яна", "10"]), vec!["10", "Яна", "b2"]);
    }

    #[test]
    fn test_only_identical_strings_equal() {
        assert_eq!(compare_strings("Sofa", "Sofa"), Ordering::Equal);
        assert_ne!(compare_strings("Sofa", "sofa"), Ordering::Equal);
    }

    #[test]
    fn test_nan_greatest() {
        assert_eq!(compare_numbers(f64::NAN, 1e300), Ordering::Greater);
        assert_eq!(compare_numbers(f64::NEG_INFINITY, f64::NAN), Ordering::Less);
        assert_eq!(compare_numbers(f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(compare_numbers(2.0, 10.0), Ordering::Less);
    }

    #[test]
    fn test_numeric_values() {
        assert_eq!(compare_numeric(&Value::from(9i64), &Value::from("10")), Ordering::Less);
        assert_eq!(compare_numeric(&Value::Null, &Value::from(0.5)), Ordering::Greater);
    }
}
