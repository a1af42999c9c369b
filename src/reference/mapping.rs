//! Reference table snapshot
//!
//! [`ReferenceMapping`] holds every lookup table the reduction engine needs
//! for one database version. Tables are built externally, loaded once, and
//! never mutated; the engine shares the snapshot across threads freely.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HlaError;

/// One row of the serology↔allele table.
///
/// `alleles` carries the full-resolution expansion, `lgx_alleles` the
/// two-field (ARD-level) column used when the query allele is two fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerologyEntry {
    /// Full-resolution allele expansion
    #[serde(default)]
    pub alleles: Vec<String>,
    /// Two-field allele column
    #[serde(default)]
    pub lgx_alleles: Vec<String>,
}

/// Immutable lookup tables for one reference database version
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceMapping {
    /// Database version identifier (e.g. `3590`)
    pub version: String,

    /// Allele → G group designation
    pub g_group: HashMap<String, String>,
    /// Alleles whose G reduction is a slash-joined set of groups
    pub dup_g: HashMap<String, String>,
    /// Allele → P group designation
    pub p_group: HashMap<String, String>,
    /// Allele → two-field ARD group
    pub lgx_group: HashMap<String, String>,
    /// Alleles whose lgx reduction is ambiguous across groups
    pub dup_lgx: HashMap<String, String>,
    /// Allele → three-field exon group
    pub exon_group: HashMap<String, String>,
    /// Alleles whose P group differs from their G group (ping table)
    pub p_not_g: HashMap<String, String>,
    /// Group name → WHO designation expansion
    pub who_group: HashMap<String, Vec<String>>,
    /// Locus-antigen (e.g. `A*01`) → XX wildcard expansion
    pub xx_codes: HashMap<String, Vec<String>>,
    /// Short null shortcut → expanded null allele list
    pub shortnulls: HashMap<String, Vec<String>>,
    /// Every allele name valid in this version
    pub valid_alleles: HashSet<String>,
    /// Official WHO nomenclature designations
    pub who_alleles: HashSet<String>,
    /// MAC → allele suffix list
    pub mac_codes: HashMap<String, Vec<String>>,
    /// Slash-joined suffix list → MAC (the encode direction)
    pub mac_lookup: HashMap<String, String>,
    /// Serology name → allele expansions
    pub serology: HashMap<String, SerologyEntry>,
    /// Broad antigen (serologic or DNA-locus form) → split antigens
    pub broad_splits: HashMap<String, Vec<String>>,
    /// Serology → historically associated antigen
    pub associated_antigens: HashMap<String, String>,
    /// Legacy V2 name → V3 name exceptions (heuristic bypass)
    pub v2_to_v3: HashMap<String, String>,
    /// Locus → common/well-documented two-field alleles
    pub cwd: HashMap<String, HashSet<String>>,
}

impl ReferenceMapping {
    /// Load a snapshot from a JSON file produced by the table builder.
    pub fn from_json(path: &Path) -> Result<Self, HlaError> {
        let content = std::fs::read_to_string(path)?;
        let mapping: ReferenceMapping = serde_json::from_str(&content)?;
        Ok(mapping)
    }

    /// Whether `allele` is a valid allele name in this version
    pub fn is_valid_allele(&self, allele: &str) -> bool {
        self.valid_alleles.contains(allele)
    }

    /// Whether `allele` is an official WHO designation
    pub fn is_who_allele(&self, allele: &str) -> bool {
        self.who_alleles.contains(allele)
    }

    /// Whether `name` is a registered serology designation
    pub fn is_serology(&self, name: &str) -> bool {
        self.serology.contains_key(name)
    }

    /// Whether `token` is a short null shortcut
    pub fn is_shortnull(&self, token: &str) -> bool {
        self.shortnulls.contains_key(token)
    }

    /// The names every G-group and P-group reduction can produce.
    ///
    /// Marker-suffixed names (`A*01:01:01G`, `A*01:01P`) are valid as-is in
    /// validate-only mode exactly when they appear here.
    pub fn group_names(&self) -> HashSet<String> {
        let mut names: HashSet<String> = HashSet::new();
        for value in self.g_group.values().chain(self.p_group.values()) {
            names.insert(value.clone());
        }
        for value in self.dup_g.values() {
            for part in value.split('/') {
                names.insert(part.to_string());
            }
        }
        names
    }
}
