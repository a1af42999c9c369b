//! Serology mapping: broad/split antigens and allele expansions
//!
//! Serologic typing predates molecular nomenclature; antigens form a
//! two-level hierarchy where a broad antigen generalizes several splits
//! (`A9` covers `A23` and `A24`). The table also exists in DNA-locus form
//! (`A*09` covering `A*23`/`A*24`).

use crate::reference::mapping::ReferenceMapping;

const HLA_PREFIX: &str = "HLA-";

/// Resolve the broad/split relationship for an antigen name.
///
/// If `name` is a broad antigen, returns it with its splits. If it is a
/// split, returns its broad and the broad's full split list. An `HLA-`
/// prefix is preserved on every returned name. Unmapped names return
/// `None`.
pub fn find_broad_splits(mapping: &ReferenceMapping, name: &str) -> Option<(String, Vec<String>)> {
    let (prefix, bare) = match name.strip_prefix(HLA_PREFIX) {
        Some(rest) => (HLA_PREFIX, rest),
        None => ("", name),
    };

    if let Some(splits) = mapping.broad_splits.get(bare) {
        return Some((
            format!("{}{}", prefix, bare),
            splits.iter().map(|s| format!("{}{}", prefix, s)).collect(),
        ));
    }

    for (broad, splits) in &mapping.broad_splits {
        if splits.iter().any(|s| s == bare) {
            return Some((
                format!("{}{}", prefix, broad),
                splits.iter().map(|s| format!("{}{}", prefix, s)).collect(),
            ));
        }
    }

    None
}

/// The historically associated antigen for a serology, or the serology
/// itself when no association is recorded.
pub fn find_associated_antigen(mapping: &ReferenceMapping, serology: &str) -> String {
    mapping
        .associated_antigens
        .get(serology)
        .cloned()
        .unwrap_or_else(|| serology.to_string())
}

/// The molecular expansion of a serology designation, restricted to
/// alleles valid in this reference version.
pub fn allele_expansion(mapping: &ReferenceMapping, serology: &str) -> Vec<String> {
    let Some(entry) = mapping.serology.get(serology) else {
        return Vec::new();
    };
    let mut seen = std::collections::HashSet::new();
    entry
        .alleles
        .iter()
        .chain(entry.lgx_alleles.iter())
        .filter(|a| mapping.is_valid_allele(a))
        .filter(|a| seen.insert(a.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::mapping::SerologyEntry;

    fn mapping() -> ReferenceMapping {
        let mut mapping = ReferenceMapping::default();
        mapping
            .broad_splits
            .insert("A9".to_string(), vec!["A23".to_string(), "A24".to_string()]);
        mapping.broad_splits.insert(
            "A*09".to_string(),
            vec!["A*23".to_string(), "A*24".to_string()],
        );
        mapping
            .associated_antigens
            .insert("A203".to_string(), "A2".to_string());
        mapping.serology.insert(
            "A1".to_string(),
            SerologyEntry {
                alleles: vec!["A*01:01:01".to_string(), "A*01:99".to_string()],
                lgx_alleles: vec!["A*01:01".to_string()],
            },
        );
        mapping.valid_alleles.insert("A*01:01:01".to_string());
        mapping.valid_alleles.insert("A*01:01".to_string());
        mapping
    }

    #[test]
    fn test_broad_returns_splits() {
        let (broad, splits) = find_broad_splits(&mapping(), "A9").unwrap();
        assert_eq!(broad, "A9");
        assert_eq!(splits, vec!["A23", "A24"]);
    }

    #[test]
    fn test_split_returns_broad_and_siblings() {
        let (broad, splits) = find_broad_splits(&mapping(), "A24").unwrap();
        assert_eq!(broad, "A9");
        assert_eq!(splits, vec!["A23", "A24"]);
    }

    #[test]
    fn test_dna_locus_form() {
        let (broad, splits) = find_broad_splits(&mapping(), "A*23").unwrap();
        assert_eq!(broad, "A*09");
        assert_eq!(splits, vec!["A*23", "A*24"]);
    }

    #[test]
    fn test_hla_prefix_preserved() {
        let (broad, splits) = find_broad_splits(&mapping(), "HLA-A9").unwrap();
        assert_eq!(broad, "HLA-A9");
        assert_eq!(splits, vec!["HLA-A23", "HLA-A24"]);
    }

    #[test]
    fn test_unmapped_is_none() {
        assert!(find_broad_splits(&mapping(), "B44").is_none());
    }

    #[test]
    fn test_associated_antigen() {
        assert_eq!(find_associated_antigen(&mapping(), "A203"), "A2");
        assert_eq!(find_associated_antigen(&mapping(), "A1"), "A1");
    }

    #[test]
    fn test_allele_expansion_filters_invalid() {
        // A*01:99 is not in the valid set and must be dropped
        let expansion = allele_expansion(&mapping(), "A1");
        assert_eq!(expansion, vec!["A*01:01:01", "A*01:01"]);
    }

    #[test]
    fn test_allele_expansion_unknown_serology() {
        assert!(allele_expansion(&mapping(), "B7").is_empty());
    }
}
