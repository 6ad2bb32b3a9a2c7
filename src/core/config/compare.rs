// ─── Comparators ───
// Orderings used by `when` tests: single-integer parameters and dotted versions.

use std::cmp::Ordering;

/// Compares two parameters as base-10 integers.
///
/// A string that does not parse is treated as `i32::MIN`, so non-numeric
/// values sort below every number and compare equal to each other.
pub fn param_compare(a: &str, b: &str) -> Ordering {
    let x = a.parse::<i32>().unwrap_or(i32::MIN);
    let y = b.parse::<i32>().unwrap_or(i32::MIN);
    x.cmp(&y)
}

/// One run of a version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSegment {
    Number(u64),
    Text(String),
}

impl VersionSegment {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Numbers always sort before text, whatever the contents.
            (VersionSegment::Number(_), VersionSegment::Text(_)) => Ordering::Less,
            (VersionSegment::Text(_), VersionSegment::Number(_)) => Ordering::Greater,
            (VersionSegment::Number(a), VersionSegment::Number(b)) => a.cmp(b),
            (VersionSegment::Text(a), VersionSegment::Text(b)) => a.cmp(b),
        }
    }
}

/// Splits a version string into maximal digit runs and maximal non-digit runs.
pub fn parse_version_segments(ver: &str) -> Vec<VersionSegment> {
    let mut segments = Vec::new();
    let mut chars = ver.chars().peekable();

    while let Some(&first) = chars.peek() {
        if first.is_ascii_digit() {
            let mut n: u64 = 0;
            while let Some(&c) = chars.peek() {
                let Some(digit) = c.to_digit(10) else {
                    break;
                };
                n = n.saturating_mul(10).saturating_add(u64::from(digit));
                chars.next();
            }
            segments.push(VersionSegment::Number(n));
        } else {
            let mut text = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() {
                    break;
                }
                text.push(c);
                chars.next();
            }
            segments.push(VersionSegment::Text(text));
        }
    }

    segments
}

/// Compares two version strings segment by segment.
///
/// The first unequal segment decides. When one sequence is a prefix of the
/// other, the longer one is greater.
pub fn version_compare(a: &str, b: &str) -> Ordering {
    let x = parse_version_segments(a);
    let y = parse_version_segments(b);

    for (j, k) in x.iter().zip(y.iter()) {
        match j.compare(k) {
            Ordering::Equal => continue,
            non_eq => return non_eq,
        }
    }

    x.len().cmp(&y.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_compare_numerically() {
        assert_eq!(param_compare("9", "10"), Ordering::Less);
        assert_eq!(param_compare("-3", "-3"), Ordering::Equal);
        assert_eq!(param_compare("42", "+7"), Ordering::Greater);
    }

    #[test]
    fn non_numeric_params_are_minimal() {
        assert_eq!(param_compare("abc", "abc"), Ordering::Equal);
        assert_eq!(param_compare("abc", "xyz"), Ordering::Equal);
        assert_eq!(param_compare("abc", "5"), Ordering::Less);
        assert_eq!(param_compare("-2147483647", ""), Ordering::Greater);
        assert_eq!(param_compare("", "-2147483648"), Ordering::Equal);
    }

    #[test]
    fn segments_alternate_between_digits_and_text() {
        assert_eq!(
            parse_version_segments("1.10-rc2"),
            vec![
                VersionSegment::Number(1),
                VersionSegment::Text(".".into()),
                VersionSegment::Number(10),
                VersionSegment::Text("-rc".into()),
                VersionSegment::Number(2),
            ]
        );
        assert!(parse_version_segments("").is_empty());
    }

    #[test]
    fn versions_compare_numeric_segments_by_value() {
        assert_eq!(version_compare("1.2", "1.10"), Ordering::Less);
        assert_eq!(version_compare("1.10", "1.9"), Ordering::Greater);
        assert_eq!(version_compare("1.2.0", "1.2.0"), Ordering::Equal);
    }

    #[test]
    fn number_sorts_before_text_at_same_position() {
        assert_eq!(version_compare("1a", "12"), Ordering::Greater);
        assert_eq!(version_compare("12", "1a"), Ordering::Less);
        assert_eq!(version_compare("1.0", "1a"), Ordering::Less);
    }

    #[test]
    fn longer_version_wins_on_common_prefix() {
        assert_eq!(version_compare("1.2", "1.2.1"), Ordering::Less);
        assert_eq!(version_compare("1.2.", "1.2"), Ordering::Greater);
        assert_eq!(version_compare("", "0"), Ordering::Less);
    }

    #[test]
    fn version_compare_is_antisymmetric() {
        let samples = ["", "1", "1.2", "1.10", "1a", "12", "1.2b", "beta", "2.0-rc1", "2.0-rc10"];
        for a in samples {
            assert_eq!(version_compare(a, a), Ordering::Equal, "{a}");
            for b in samples {
                assert_eq!(version_compare(a, b), version_compare(b, a).reverse(), "{a} vs {b}");
            }
        }
    }
}
