//! Engine configuration
//!
//! [`ReduceConfig`] is set once at engine construction and read-only
//! thereafter. Every toggle gates a single step of the classification
//! cascade or a single strategy behavior; defaults match registry usage
//! (everything reducible, strict validation on).

use serde::{Deserialize, Serialize};

use crate::error::HlaError;

/// Target resolution for a reduction
///
/// A closed enumeration; dispatch happens in a single `match` so the
/// recursive re-reduction ("ping") logic can see all branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReductionType {
    /// G group: identical ARD exon sequence
    G,
    /// P group: identical ARD protein sequence
    P,
    /// Low-resolution group with trailing marker (`g` or `ARS`)
    #[serde(rename = "lg")]
    Lg,
    /// Low-resolution group without marker
    #[serde(rename = "lgx")]
    Lgx,
    /// WHO-recognized designation expansion
    W,
    /// Exon-level (three-field) grouping
    #[serde(rename = "exon")]
    Exon,
    /// Unambiguous two-field truncation
    U2,
    /// Serologic equivalent
    S,
    /// Validate-only mode; returns the input unchanged when valid
    #[serde(rename = "default")]
    Default,
}

impl std::fmt::Display for ReductionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReductionType::G => "G",
            ReductionType::P => "P",
            ReductionType::Lg => "lg",
            ReductionType::Lgx => "lgx",
            ReductionType::W => "W",
            ReductionType::Exon => "exon",
            ReductionType::U2 => "U2",
            ReductionType::S => "S",
            ReductionType::Default => "default",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for ReductionType {
    type Err = HlaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "G" => Ok(ReductionType::G),
            "P" => Ok(ReductionType::P),
            "lg" => Ok(ReductionType::Lg),
            "lgx" => Ok(ReductionType::Lgx),
            "W" => Ok(ReductionType::W),
            "exon" => Ok(ReductionType::Exon),
            "U2" => Ok(ReductionType::U2),
            "S" => Ok(ReductionType::S),
            "default" => Ok(ReductionType::Default),
            _ => Err(HlaError::invalid_typing(
                s,
                "unknown reduction type (expected G, P, lg, lgx, W, exon, U2 or S)",
            )),
        }
    }
}

/// Configuration for the reduction engine
///
/// Field names follow the established configuration keys, so a JSON config
/// written for other implementations of this nomenclature deserializes
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceConfig {
    /// Expand serology designations to their allele lists
    pub reduce_serology: bool,

    /// Translate legacy two-digit (V2) nomenclature before reduction
    pub reduce_v2: bool,

    /// Retry validation with the last field dropped for 3/4-field alleles
    pub reduce_3field: bool,

    /// Treat trailing `P`/`G` group markers as reducible
    #[serde(rename = "reduce_P")]
    pub reduce_p: bool,

    /// Expand XX antigen-group wildcards
    #[serde(rename = "reduce_XX")]
    pub reduce_xx: bool,

    /// Expand multiple allele codes
    #[serde(rename = "reduce_MAC")]
    pub reduce_mac: bool,

    /// Expand short null shortcuts
    pub reduce_shortnull: bool,

    /// Re-reduce when a group collapse hides a distinguishable sub-allele
    pub ping: bool,

    /// Use `ARS` instead of `g` as the lg marker
    #[serde(rename = "ARS_as_lg")]
    pub ars_as_lg: bool,

    /// Fail on any token that does not validate against the reference
    /// tables; when off, probe expression-suffixed variants first
    pub strict: bool,

    /// Tokens ending with any of these suffixes bypass classification
    /// unchanged and do not participate in dedupe/sort
    pub ignore_allele_with_suffixes: Vec<String>,

    /// Capacity of each memoization cache
    pub cache_size: usize,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            reduce_serology: true,
            reduce_v2: true,
            reduce_3field: true,
            reduce_p: true,
            reduce_xx: true,
            reduce_mac: true,
            reduce_shortnull: true,
            ping: true,
            ars_as_lg: false,
            strict: true,
            ignore_allele_with_suffixes: Vec::new(),
            cache_size: 1000,
        }
    }
}

impl ReduceConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with strict validation (the default)
    pub fn strict() -> Self {
        Self::default()
    }

    /// Create a config with non-strict validation: tokens that fail verbatim
    /// lookup are probed with expression suffixes before failing
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    /// Set strict validation
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable or disable ping re-reduction
    pub fn with_ping(mut self, ping: bool) -> Self {
        self.ping = ping;
        self
    }

    /// Use `ARS` instead of `g` as the lg marker
    pub fn with_ars_as_lg(mut self, ars_as_lg: bool) -> Self {
        self.ars_as_lg = ars_as_lg;
        self
    }

    /// Set the memoization cache capacity
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.cache_size = cache_size;
        self
    }

    /// Set the suffixes that exempt a token from classification and sorting
    pub fn with_ignored_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_allele_with_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// The lg marker selected by this config
    pub fn lg_marker(&self) -> &'static str {
        if self.ars_as_lg {
            "ARS"
        } else {
            "g"
        }
    }
}
