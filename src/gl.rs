//! GL String grammar
//!
//! A GL String combines tokens with five delimiters in strict precedence,
//! highest first: `^` (genotype list), `|` (genotype ambiguity), `+`
//! (phased pair), `~` (haplotype), `/` (allele ambiguity). Splitting is
//! purely syntactic: every substring between delimiters is itself a valid
//! sub-expression.
//!
//! Recombination rules per delimiter:
//! - `^`, `|`, `/`: flatten nested runs of the same delimiter, drop empty
//!   tokens, deduplicate, sort in natural order
//! - `+`: sort, keep duplicates (homozygous pairs are legal), drop empties
//! - `~`: preserve order exactly

use crate::compare::natural_cmp;
use crate::error::HlaError;

/// GL String delimiters in precedence order, highest first
pub const DELIMITERS: [char; 5] = ['^', '|', '+', '~', '/'];

/// The highest-precedence delimiter present in `input`, if any
pub fn find_delimiter(input: &str) -> Option<char> {
    DELIMITERS.iter().copied().find(|d| input.contains(*d))
}

/// Check an atomic token for shapes no classification can rescue.
pub fn validate_token_shape(token: &str) -> Result<(), HlaError> {
    if token.ends_with('*') {
        return Err(HlaError::invalid_typing(token, "trailing * with no field"));
    }
    if let Some(bad) = token
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '*' | ':' | '-'))
    {
        return Err(HlaError::invalid_typing(
            token,
            format!("unexpected character {:?}", bad),
        ));
    }
    Ok(())
}

/// Join reduced sub-results back together according to the delimiter's
/// aggregation rule. `ignored_suffixes` names token endings that are
/// exempt from dedupe/sort; such tokens are appended after the sorted
/// ones in their original order.
pub fn recombine(delimiter: char, parts: Vec<String>, ignored_suffixes: &[String]) -> String {
    let sep = delimiter.to_string();
    match delimiter {
        '~' => parts.join(&sep),
        '+' => {
            let mut tokens: Vec<String> = parts.into_iter().filter(|p| !p.is_empty()).collect();
            tokens.sort_by(|a, b| natural_cmp(a, b));
            tokens.join(&sep)
        }
        _ => {
            // a reduced part may itself be a run of the same delimiter
            // (expansions come back slash-joined); flatten before sorting
            let flattened: Vec<String> = parts
                .iter()
                .flat_map(|p| p.split(delimiter))
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
            let (mut sortable, exempt): (Vec<String>, Vec<String>) = flattened
                .into_iter()
                .partition(|t| !has_ignored_suffix(t, ignored_suffixes));
            sortable.sort_by(|a, b| natural_cmp(a, b));
            sortable.dedup();
            sortable.extend(exempt);
            sortable.join(&sep)
        }
    }
}

/// Whether `token` ends with one of the configured ignore suffixes
pub fn has_ignored_suffix(token: &str, ignored_suffixes: &[String]) -> bool {
    ignored_suffixes.iter().any(|s| token.ends_with(s.as_str()))
}
