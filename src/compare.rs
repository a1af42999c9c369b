//! Natural ordering for allele and serology strings
//!
//! Alleles sort by numeric field value, not lexicographically: `A*9:1`
//! sorts before `A*10:1`, and `A*01:01:01N` sorts with `A*01:01:01`.
//! The order is total and transitive (ties fall back to byte order), which
//! the recombiner relies on for deterministic, idempotent output.

use std::cmp::Ordering;

/// Expression suffixes carried by allele names; ignored when ordering.
pub const EXPRESSION_CHARS: [char; 4] = ['N', 'Q', 'L', 'S'];

/// Compare two allele/serology strings in natural order.
///
/// Primary key is the numeric value of the first field (between `*`, or the
/// start of the string, and the first `:`); secondary key is the numeric
/// value of the remainder. Non-numeric inputs and exact ties fall back to
/// byte order so the result is a total order.
///
/// # Example
///
/// ```
/// use ferro_hla::compare::natural_cmp;
/// use std::cmp::Ordering;
///
/// assert_eq!(natural_cmp("A*9:01", "A*10:01"), Ordering::Less);
/// assert_eq!(natural_cmp("A*01:01", "A*01:01"), Ordering::Equal);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    // comparing extracted keys (with byte order as the final tiebreak)
    // keeps the order total and transitive even when numeric fields are
    // missing on one side
    sort_key(a).cmp(&sort_key(b)).then_with(|| a.cmp(b))
}

/// Numeric sort key: first and second field values, `None` when a field
/// carries no digits
fn sort_key(s: &str) -> (Option<u64>, Option<u64>) {
    let bare = strip_expression_suffix(s);
    let (first, rest) = split_first_field(bare);
    (field_number(first), field_number(rest))
}

/// Remove trailing expression characters (`N`, `Q`, `L`, `S`).
fn strip_expression_suffix(s: &str) -> &str {
    s.trim_end_matches(|c| EXPRESSION_CHARS.contains(&c))
}

/// Split into the first field (after `*` if present, up to the first `:`)
/// and the remainder after that `:`.
fn split_first_field(s: &str) -> (&str, &str) {
    let fields = match s.find('*') {
        Some(i) => &s[i + 1..],
        None => s,
    };
    match fields.find(':') {
        Some(i) => (&fields[..i], &fields[i + 1..]),
        None => (fields, ""),
    }
}

/// Numeric value of a field: the first digit run, ignoring any non-digit
/// prefix (serology names like `A9` carry the locus letter in the field).
fn field_number(field: &str) -> Option<u64> {
    let digits: String = field
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_equal() {
        assert_eq!(natural_cmp("A*01:01", "A*01:01"), Ordering::Equal);
        assert_eq!(natural_cmp("B7", "B7"), Ordering::Equal);
    }

    #[test]
    fn test_numeric_first_field() {
        assert_eq!(natural_cmp("A*9:01", "A*10:01"), Ordering::Less);
        assert_eq!(natural_cmp("A*100:01", "A*99:01"), Ordering::Greater);
    }

    #[test]
    fn test_numeric_second_field() {
        assert_eq!(natural_cmp("A*01:02", "A*01:10"), Ordering::Less);
        assert_eq!(natural_cmp("A*01:30", "A*01:04"), Ordering::Greater);
    }

    #[test]
    fn test_expression_suffix_ignored() {
        // N does not perturb the numeric keys
        assert_eq!(natural_cmp("A*01:04N", "A*01:05"), Ordering::Less);
        assert_eq!(natural_cmp("A*01:04N", "A*01:03"), Ordering::Greater);
    }

    #[test]
    fn test_serology_names() {
        assert_eq!(natural_cmp("A9", "A10"), Ordering::Less);
        assert_eq!(natural_cmp("B27", "B7"), Ordering::Greater);
    }

    #[test]
    fn test_total_order_on_ties() {
        // same numeric keys, different strings: still a strict order
        let ord = natural_cmp("A*01:01", "B*01:01");
        assert_ne!(ord, Ordering::Equal);
        assert_eq!(natural_cmp("B*01:01", "A*01:01"), ord.reverse());
    }

    #[test]
    fn test_transitivity() {
        let mut alleles = vec![
            "A*36:01", "A*02:01", "A*11:01", "A*03:01:01", "A*02:06", "A*01:01", "B*07:02",
            "A*01:01:01:01",
        ];
        alleles.sort_by(|a, b| natural_cmp(a, b));
        // the primary key is the field value, not the locus: B*07 sorts
        // between A*03 and A*11
        assert_eq!(
            alleles,
            vec![
                "A*01:01",
                "A*01:01:01:01",
                "A*02:01",
                "A*02:06",
                "A*03:01:01",
                "B*07:02",
                "A*11:01",
                "A*36:01",
            ]
        );
    }

    #[test]
    fn test_reflexive_and_antisymmetric() {
        let samples = ["A*01:01", "A*02:01N", "B7", "A9", "DRB1*11:01"];
        for a in samples {
            assert_eq!(natural_cmp(a, a), Ordering::Equal);
            for b in samples {
                assert_eq!(natural_cmp(a, b), natural_cmp(b, a).reverse());
            }
        }
    }

    #[test]
    fn test_non_numeric_fallback() {
        assert_ne!(natural_cmp("junk", "other"), Ordering::Equal);
        assert_eq!(natural_cmp("junk", "junk"), Ordering::Equal);
    }
}
