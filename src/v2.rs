//! Legacy V2 nomenclature prediction
//!
//! Pre-2010 allele names pack their fields into a single digit run
//! (`A*0101`, `DRB1*1301`). The exception table in the reference snapshot
//! is always consulted first; this heuristic is the fallback for names the
//! table does not carry.
//!
//! Split rules, driven by the length of the leading digit run:
//! one or two digits pass through (a two-digit name with a trailing code
//! becomes `digits:code`), DP loci with five digits split 3+2, other even
//! runs split pairwise, odd runs split 2+remainder. Any trailing
//! non-digit suffix is carried over.

use once_cell::sync::Lazy;
use regex::Regex;

/// Loci whose five-digit V2 names carry a three-digit first field
const THREE_DIGIT_FIELD_LOCI: [&str; 2] = ["DPA1", "DPB1"];

static FIELDS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)(.*)$").unwrap());

/// Predict the V3 (colon-delimited) form of a legacy V2 allele name.
///
/// Returns the input unchanged when it does not look like a V2 name
/// (no `*`, or no leading digits after the `*`).
///
/// # Example
///
/// ```
/// use ferro_hla::v2::predict_v3;
///
/// assert_eq!(predict_v3("A*0101"), "A*01:01");
/// assert_eq!(predict_v3("A*010101"), "A*01:01:01");
/// assert_eq!(predict_v3("A*2402N"), "A*24:02N");
/// ```
pub fn predict_v3(allele: &str) -> String {
    let Some((locus, fields)) = allele.split_once('*') else {
        return allele.to_string();
    };
    let Some(caps) = FIELDS_RE.captures(fields) else {
        return allele.to_string();
    };
    let digits = caps.get(1).map_or("", |m| m.as_str());
    let suffix = caps.get(2).map_or("", |m| m.as_str());

    let split = match digits.len() {
        1 => digits.to_string(),
        2 => {
            if suffix.is_empty() {
                digits.to_string()
            } else {
                // two digits plus a code: the code becomes the second field
                return format!("{}*{}:{}", locus, digits, suffix);
            }
        }
        5 if THREE_DIGIT_FIELD_LOCI.contains(&locus) => {
            format!("{}:{}", &digits[..3], &digits[3..])
        }
        n if n % 2 == 0 => digits
            .as_bytes()
            .chunks(2)
            .map(|pair| std::str::from_utf8(pair).unwrap())
            .collect::<Vec<_>>()
            .join(":"),
        _ => format!("{}:{}", &digits[..2], &digits[2..]),
    };

    format!("{}*{}{}", locus, split, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_digit_unchanged() {
        assert_eq!(predict_v3("A*1"), "A*1");
    }

    #[test]
    fn test_two_digits_unchanged() {
        assert_eq!(predict_v3("A*01"), "A*01");
        assert_eq!(predict_v3("DRB1*13"), "DRB1*13");
    }

    #[test]
    fn test_two_digits_with_code() {
        assert_eq!(predict_v3("A*01AB"), "A*01:AB");
    }

    #[test]
    fn test_four_digits_pairwise() {
        assert_eq!(predict_v3("A*0101"), "A*01:01");
        assert_eq!(predict_v3("B*0702"), "B*07:02");
    }

    #[test]
    fn test_six_digits_pairwise() {
        assert_eq!(predict_v3("A*010101"), "A*01:01:01");
    }

    #[test]
    fn test_expression_suffix_carried() {
        assert_eq!(predict_v3("A*2402N"), "A*24:02N");
        assert_eq!(predict_v3("DRB4*010301N"), "DRB4*01:03:01N");
    }

    #[test]
    fn test_odd_run_splits_two_plus_rest() {
        assert_eq!(predict_v3("A*24020"), "A*24:020");
        assert_eq!(predict_v3("B*0800102"), "B*08:00102");
    }

    #[test]
    fn test_dp_five_digits_split_three_two() {
        assert_eq!(predict_v3("DPB1*02012"), "DPB1*020:12");
        assert_eq!(predict_v3("DPA1*01031"), "DPA1*010:31");
        // non-DP loci keep the 2+remainder split
        assert_eq!(predict_v3("B*15011"), "B*15:011");
    }

    #[test]
    fn test_non_v2_shapes_unchanged() {
        assert_eq!(predict_v3("A9"), "A9");
        assert_eq!(predict_v3("A*"), "A*");
        assert_eq!(predict_v3("A*XX"), "A*XX");
    }
}
