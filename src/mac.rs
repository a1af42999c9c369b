//! Multiple allele code (MAC) codec
//!
//! A MAC is a short alphabetic code standing for a defined set of allele
//! field suffixes (`A*01:AB` = `A*01:01/A*01:02`). Decoding distinguishes
//! *group* expansions (bare second fields, prefixed with the full
//! locus-antigen) from *allelic* expansions (two-field fragments, prefixed
//! with the bare locus); a few registry codes carry complete designations
//! with loci, which pass through untouched.

use crate::compare::natural_cmp;
use crate::error::HlaError;
use crate::reference::mapping::ReferenceMapping;

/// Whether `token` is a MAC-typed allele (`Locus*Field:CODE`).
///
/// The code must be alphabetic and known; for codes whose expansions carry
/// loci, the most frequent locus among the expansions must match the
/// token's stated locus. This guards against same-looking codes from
/// different loci colliding.
pub fn is_mac(mapping: &ReferenceMapping, token: &str) -> bool {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() != 2 {
        return false;
    }
    let (locus_antigen, code) = (parts[0], parts[1]);
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    let Some(suffixes) = mapping.mac_codes.get(code) else {
        return false;
    };

    let loci: Vec<&str> = suffixes
        .iter()
        .filter_map(|s| s.split_once('*').map(|(locus, _)| locus))
        .collect();
    if loci.is_empty() {
        return true;
    }
    let token_locus = locus_antigen.split('*').next().unwrap_or(locus_antigen);
    majority_locus(&loci).map_or(false, |majority| majority == token_locus)
}

/// The most frequent element, ties broken by first appearance.
fn majority_locus<'a>(loci: &[&'a str]) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for &locus in loci {
        let count = loci.iter().filter(|l| **l == locus).count();
        match best {
            Some((_, n)) if n >= count => {}
            _ => best = Some((locus, count)),
        }
    }
    best.map(|(locus, _)| locus)
}

/// Decode a MAC-typed allele to its allele list, restricted to alleles
/// valid in this reference version.
pub fn expand_mac(mapping: &ReferenceMapping, token: &str) -> Result<Vec<String>, HlaError> {
    let (locus_antigen, code) = token
        .split_once(':')
        .ok_or_else(|| HlaError::invalid_mac(token, "expected locus*antigen:code"))?;
    let locus = locus_antigen.split('*').next().unwrap_or(locus_antigen);
    let suffixes = mapping
        .mac_codes
        .get(code)
        .ok_or_else(|| HlaError::invalid_mac(token, format!("{} is not a known code", code)))?;

    let expanded = suffixes
        .iter()
        .map(|suffix| {
            if suffix.contains('*') {
                // complete designation, registry already supplied the locus
                suffix.clone()
            } else if suffix.contains(':') {
                // allelic expansion
                format!("{}*{}", locus, suffix)
            } else {
                // group expansion
                format!("{}:{}", locus_antigen, suffix)
            }
        })
        .filter(|allele| mapping.is_valid_allele(allele))
        .collect();
    Ok(expanded)
}

/// Encode a slash-joined set of same-locus alleles as a MAC-typed allele.
///
/// Tries, in order: the unique second fields (when every first field
/// matches), the field list in given order, the field list in natural
/// order. The first table hit wins.
pub fn lookup_mac(mapping: &ReferenceMapping, allele_list: &str) -> Result<String, HlaError> {
    let alleles: Vec<&str> = allele_list.split('/').filter(|a| !a.is_empty()).collect();
    if alleles.is_empty() {
        return Err(HlaError::invalid_mac(allele_list, "empty allele list"));
    }
    let locus = alleles[0].split('*').next().unwrap_or("");

    // locus-less field lists, e.g. ["01:01", "01:02"]
    let fields: Vec<String> = alleles
        .iter()
        .map(|a| a.split_once('*').map_or(a.to_string(), |(_, f)| f.to_string()))
        .collect();
    let first_fields: Vec<&str> = fields
        .iter()
        .map(|f| f.split(':').next().unwrap_or(f.as_str()))
        .collect();

    // collapse to unique second fields when the antigen is shared
    if first_fields.iter().all(|f| *f == first_fields[0]) && fields.iter().all(|f| f.contains(':'))
    {
        let mut seconds: Vec<&str> = Vec::new();
        for field in &fields {
            let second = field.split(':').nth(1).unwrap_or("");
            if !seconds.contains(&second) {
                seconds.push(second);
            }
        }
        if let Some(code) = mapping.mac_lookup.get(&seconds.join("/")) {
            return Ok(format!("{}*{}:{}", locus, first_fields[0], code));
        }
        seconds.sort_by(|a, b| natural_cmp(a, b));
        if let Some(code) = mapping.mac_lookup.get(&seconds.join("/")) {
            return Ok(format!("{}*{}:{}", locus, first_fields[0], code));
        }
    }

    // the field list in given order
    if let Some(code) = mapping.mac_lookup.get(&fields.join("/")) {
        return Ok(format!("{}*{}:{}", locus, first_fields[0], code));
    }

    // the field list in natural order
    let mut sorted = fields.clone();
    sorted.sort_by(|a, b| natural_cmp(a, b));
    if let Some(code) = mapping.mac_lookup.get(&sorted.join("/")) {
        let first = sorted[0].split(':').next().unwrap_or(sorted[0].as_str());
        return Ok(format!("{}*{}:{}", locus, first, code));
    }

    Err(HlaError::invalid_mac(
        allele_list,
        "no code encodes this allele list",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> ReferenceMapping {
        let mut mapping = ReferenceMapping::default();
        mapping
            .mac_codes
            .insert("AB".to_string(), vec!["01".to_string(), "02".to_string()]);
        mapping.mac_codes.insert(
            "GHJK".to_string(),
            vec!["02:01".to_string(), "03:01".to_string()],
        );
        mapping.mac_codes.insert(
            "BDEF".to_string(),
            vec![
                "B*07:02".to_string(),
                "B*08:01".to_string(),
                "C*07:01".to_string(),
            ],
        );
        mapping
            .mac_lookup
            .insert("01/02".to_string(), "AB".to_string());
        mapping
            .mac_lookup
            .insert("02:01/03:01".to_string(), "GHJK".to_string());
        for allele in [
            "A*01:01", "A*01:02", "A*02:01", "A*03:01", "B*07:02", "B*08:01", "C*07:01",
        ] {
            mapping.valid_alleles.insert(allele.to_string());
        }
        mapping
    }

    #[test]
    fn test_is_mac_known_code() {
        let m = mapping();
        assert!(is_mac(&m, "A*01:AB"));
        assert!(is_mac(&m, "A*02:GHJK"));
    }

    #[test]
    fn test_is_mac_rejects_unknown_or_molecular() {
        let m = mapping();
        assert!(!is_mac(&m, "A*01:ZZZZ"));
        assert!(!is_mac(&m, "A*01:01"));
        assert!(!is_mac(&m, "A*01:01:AB"));
        assert!(!is_mac(&m, "A*01"));
    }

    #[test]
    fn test_is_mac_locus_majority_guard() {
        let m = mapping();
        assert!(is_mac(&m, "B*07:BDEF"));
        assert!(!is_mac(&m, "A*07:BDEF"));
    }

    #[test]
    fn test_expand_group() {
        let m = mapping();
        assert_eq!(
            expand_mac(&m, "A*01:AB").unwrap(),
            vec!["A*01:01", "A*01:02"]
        );
    }

    #[test]
    fn test_expand_allelic() {
        let m = mapping();
        assert_eq!(
            expand_mac(&m, "A*02:GHJK").unwrap(),
            vec!["A*02:01", "A*03:01"]
        );
    }

    #[test]
    fn test_expand_complete_designations() {
        let m = mapping();
        assert_eq!(
            expand_mac(&m, "B*07:BDEF").unwrap(),
            vec!["B*07:02", "B*08:01", "C*07:01"]
        );
    }

    #[test]
    fn test_expand_filters_invalid() {
        let mut m = mapping();
        m.valid_alleles.remove("A*01:02");
        assert_eq!(expand_mac(&m, "A*01:AB").unwrap(), vec!["A*01:01"]);
    }

    #[test]
    fn test_expand_unknown_code() {
        let err = expand_mac(&mapping(), "A*01:ZZZZ").unwrap_err();
        assert!(matches!(err, HlaError::InvalidMac { .. }));
    }

    #[test]
    fn test_lookup_collapsed_second_fields() {
        let m = mapping();
        assert_eq!(lookup_mac(&m, "A*01:01/A*01:02").unwrap(), "A*01:AB");
        // order of the inputs does not matter for the collapsed form
        assert_eq!(lookup_mac(&m, "A*01:02/A*01:01").unwrap(), "A*01:AB");
    }

    #[test]
    fn test_lookup_given_order() {
        let m = mapping();
        assert_eq!(lookup_mac(&m, "A*02:01/A*03:01").unwrap(), "A*02:GHJK");
    }

    #[test]
    fn test_lookup_natural_order_fallback() {
        let m = mapping();
        assert_eq!(lookup_mac(&m, "A*03:01/A*02:01").unwrap(), "A*02:GHJK");
    }

    #[test]
    fn test_lookup_no_code() {
        let err = lookup_mac(&mapping(), "A*01:01/A*24:02").unwrap_err();
        assert!(matches!(err, HlaError::InvalidMac { .. }));
    }

    #[test]
    fn test_round_trip() {
        let m = mapping();
        let expanded = expand_mac(&m, "A*01:AB").unwrap();
        assert_eq!(lookup_mac(&m, &expanded.join("/")).unwrap(), "A*01:AB");
    }
}
