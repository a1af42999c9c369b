//! Mock reference provider for testing
//!
//! Serves a small, fully in-memory table snapshot that exercises every
//! table the engine consumes: G/P/lgx/exon groups, duplicate-group
//! exceptions, XX codes, MACs, short nulls, serology rows, broad/splits
//! and the V2 exception table.

use std::collections::HashSet;

use crate::error::HlaError;
use crate::reference::mapping::{ReferenceMapping, SerologyEntry};
use crate::reference::provider::ReferenceProvider;

/// In-memory reference provider
#[derive(Clone, Default)]
pub struct MockProvider {
    mapping: ReferenceMapping,
}

impl MockProvider {
    /// Create a provider with an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider around an existing snapshot
    pub fn with_mapping(mapping: ReferenceMapping) -> Self {
        Self { mapping }
    }

    /// Create a provider with the test tables (version `3590`)
    pub fn with_test_data() -> Self {
        let mut mapping = ReferenceMapping {
            version: "3590".to_string(),
            ..Default::default()
        };

        let valid = [
            "A*01:01",
            "A*01:01:01",
            "A*01:01:01:01",
            "A*01:01:02",
            "A*01:02",
            "A*01:03",
            "A*01:04N",
            "A*02:01",
            "A*02:01:01",
            "A*02:01:01:01",
            "A*02:01:01:02L",
            "A*02:02",
            "A*02:02:01",
            "A*03:01",
            "A*23:01",
            "A*23:01:01",
            "A*24:02",
            "A*24:02:01",
            "A*24:02:01:01",
            "A*26:01",
            "A*26:01:01",
            "B*07:02",
            "B*07:02:01",
            "B*08:01",
            "B*08:01:01",
            "B*08:19N",
            "B*44:02",
            "B*44:02:01",
            "B*44:02:01:02S",
            "B*44:19N",
            "C*07:01",
            "DRB1*11:01",
            "DRB1*11:01:01",
            "DRB4*01:03",
            "DRB4*01:03:01",
            "DRB4*01:03:01:02N",
            "DRB5*01:08:01N",
            "DRB5*01:08:02N",
            "DPB1*02:01",
            "DPB1*02:01:02",
            "DPB1*04:01",
        ];
        mapping.valid_alleles = valid.iter().map(|a| a.to_string()).collect();
        mapping.who_alleles = mapping.valid_alleles.clone();

        for (allele, group) in [
            ("A*01:01:01", "A*01:01:01G"),
            ("A*01:01:01:01", "A*01:01:01G"),
            ("A*01:01:02", "A*01:01:01G"),
            ("A*02:01:01", "A*02:01:01G"),
            ("A*02:01:01:01", "A*02:01:01G"),
            ("A*02:01:01:02L", "A*02:01:01G"),
            ("A*23:01:01", "A*23:01:01G"),
            ("A*24:02:01", "A*24:02:01G"),
            ("A*24:02:01:01", "A*24:02:01G"),
            ("A*26:01:01", "A*26:01:01G"),
            ("B*07:02:01", "B*07:02:01G"),
            ("B*08:01:01", "B*08:01:01G"),
            ("B*44:02:01", "B*44:02:01G"),
            ("B*44:02:01:02S", "B*44:02:01G"),
            ("DRB1*11:01:01", "DRB1*11:01:01G"),
            ("DPB1*02:01:02", "DPB1*02:01:02G"),
        ] {
            mapping.g_group.insert(allele.to_string(), group.to_string());
        }
        mapping.dup_g.insert(
            "B*08:01:01".to_string(),
            "B*08:01:01G/B*08:19N".to_string(),
        );

        for (allele, group) in [
            ("A*01:01:01", "A*01:01P"),
            ("A*01:01:01:01", "A*01:01P"),
            ("A*01:01:02", "A*01:01P"),
            ("A*02:01:01", "A*02:01P"),
            ("A*02:01:01:01", "A*02:01P"),
            ("A*24:02:01:01", "A*24:02P"),
            ("B*07:02:01", "B*07:02P"),
            ("DRB1*11:01:01", "DRB1*11:01P"),
        ] {
            mapping.p_group.insert(allele.to_string(), group.to_string());
        }

        for (allele, group) in [
            ("A*01:01:01", "A*01:01"),
            ("A*01:01:01:01", "A*01:01"),
            ("A*01:01:02", "A*01:01"),
            ("A*02:01:01", "A*02:01"),
            ("A*02:01:01:01", "A*02:01"),
            ("A*02:01:01:02L", "A*02:01"),
            ("A*23:01:01", "A*23:01"),
            ("A*24:02:01:01", "A*24:02"),
            ("A*26:01:01", "A*26:01"),
            ("B*07:02:01", "B*07:02"),
            ("B*08:01:01", "B*08:01"),
            ("DRB1*11:01:01", "DRB1*11:01"),
            ("DPB1*02:01:02", "DPB1*02:01"),
        ] {
            mapping
                .lgx_group
                .insert(allele.to_string(), group.to_string());
        }
        mapping.dup_lgx.insert(
            "B*44:02:01:02S".to_string(),
            "B*44:02/B*44:19N".to_string(),
        );

        for (allele, group) in [
            ("A*01:01:01:01", "A*01:01:01"),
            ("A*02:01:01:01", "A*02:01:01"),
            ("A*02:01:01:02L", "A*02:01:01"),
            ("A*24:02:01:01", "A*24:02:01"),
            ("DRB4*01:03:01:02N", "DRB4*01:03:01"),
        ] {
            mapping
                .exon_group
                .insert(allele.to_string(), group.to_string());
        }

        mapping
            .p_not_g
            .insert("A*02:01:01:02L".to_string(), "A*02:01".to_string());

        mapping.who_group.insert(
            "A*01:01:01G".to_string(),
            vec![
                "A*01:01:01".to_string(),
                "A*01:01:01:01".to_string(),
                "A*01:01:02".to_string(),
            ],
        );

        mapping.xx_codes.insert(
            "A*01".to_string(),
            vec![
                "A*01:01".to_string(),
                "A*01:02".to_string(),
                "A*01:03".to_string(),
                "A*01:04N".to_string(),
            ],
        );
        mapping
            .xx_codes
            .insert("A*24".to_string(), vec!["A*24:02".to_string()]);
        mapping
            .xx_codes
            .insert("B*07".to_string(), vec!["B*07:02".to_string()]);
        mapping
            .xx_codes
            .insert("DPB1*04".to_string(), vec!["DPB1*04:01".to_string()]);

        mapping.shortnulls.insert(
            "DRB4*01:03N".to_string(),
            vec!["DRB4*01:03:01:02N".to_string()],
        );
        mapping.shortnulls.insert(
            "DRB4*01:03:01N".to_string(),
            vec!["DRB4*01:03:01:02N".to_string()],
        );
        mapping.shortnulls.insert(
            "DRB5*01:08N".to_string(),
            vec![
                "DRB5*01:08:01N".to_string(),
                "DRB5*01:08:02N".to_string(),
            ],
        );

        mapping
            .mac_codes
            .insert("AB".to_string(), vec!["01".to_string(), "02".to_string()]);
        mapping
            .mac_codes
            .insert("AC".to_string(), vec!["01".to_string(), "03".to_string()]);
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
            .insert("01/03".to_string(), "AC".to_string());
        mapping
            .mac_lookup
            .insert("02:01/03:01".to_string(), "GHJK".to_string());

        for (name, alleles, lgx_alleles) in [
            (
                "A1",
                vec!["A*01:01:01", "A*01:01:01:01", "A*01:01:02", "A*01:02"],
                vec!["A*01:01", "A*01:02"],
            ),
            (
                "A2",
                vec!["A*02:01:01:01", "A*02:02:01"],
                vec!["A*02:01", "A*02:02"],
            ),
            (
                "A9",
                vec!["A*23:01:01", "A*24:02:01:01"],
                vec!["A*23:01", "A*24:02"],
            ),
            ("A23", vec!["A*23:01:01"], vec!["A*23:01"]),
            ("A24", vec!["A*24:02:01:01"], vec!["A*24:02"]),
            ("B7", vec!["B*07:02:01"], vec![]),
            ("DR11", vec!["DRB1*11:01:01"], vec!["DRB1*11:01"]),
        ] {
            mapping.serology.insert(
                name.to_string(),
                SerologyEntry {
                    alleles: alleles.into_iter().map(String::from).collect(),
                    lgx_alleles: lgx_alleles.into_iter().map(String::from).collect(),
                },
            );
        }

        mapping.broad_splits.insert(
            "A9".to_string(),
            vec!["A23".to_string(), "A24".to_string()],
        );
        mapping.broad_splits.insert(
            "A*09".to_string(),
            vec!["A*23".to_string(), "A*24".to_string()],
        );
        mapping.broad_splits.insert(
            "DR5".to_string(),
            vec!["DR11".to_string(), "DR12".to_string()],
        );
        mapping.broad_splits.insert(
            "B14".to_string(),
            vec!["B64".to_string(), "B65".to_string()],
        );

        mapping
            .associated_antigens
            .insert("A203".to_string(), "A2".to_string());
        mapping
            .associated_antigens
            .insert("B703".to_string(), "B7".to_string());

        mapping
            .v2_to_v3
            .insert("A*0104".to_string(), "A*01:04N".to_string());

        for (locus, alleles) in [
            ("A", vec!["A*01:01", "A*02:01", "A*24:02"]),
            ("B", vec!["B*07:02", "B*08:01"]),
            ("DRB1", vec!["DRB1*11:01"]),
        ] {
            mapping.cwd.insert(
                locus.to_string(),
                alleles.into_iter().map(String::from).collect::<HashSet<_>>(),
            );
        }

        Self { mapping }
    }
}

impl ReferenceProvider for MockProvider {
    fn load(&self, version: &str) -> Result<ReferenceMapping, HlaError> {
        if version != self.mapping.version {
            return Err(HlaError::ReferenceNotFound {
                version: version.to_string(),
            });
        }
        Ok(self.mapping.clone())
    }

    fn db_version(&self) -> String {
        self.mapping.version.clone()
    }
}
