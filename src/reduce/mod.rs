//! Reduction engine
//!
//! [`Reducer`] owns one immutable reference-table snapshot and one
//! [`ReduceConfig`]; both are fixed for its lifetime, so any number of
//! threads may reduce concurrently. The only interior mutability is the
//! memoization cache.
//!
//! A call to [`Reducer::reduce`] recurses over the GL String delimiters in
//! precedence order; atomic tokens run through the classification cascade
//! (legacy V2 → serology → XX → MAC → short null → plain allele), and
//! plain alleles are rewritten by the strategy for the requested
//! resolution.
//!
//! # Example
//!
//! ```
//! use ferro_hla::{MockProvider, ReduceConfig, Reducer, ReductionType};
//!
//! let provider = MockProvider::with_test_data();
//! let reducer = Reducer::new(&provider, ReduceConfig::default()).unwrap();
//!
//! assert_eq!(
//!     reducer.reduce("A*01:01:01", ReductionType::G).unwrap(),
//!     "A*01:01:01G"
//! );
//! assert_eq!(
//!     reducer.reduce("HLA-A*01:01:01", ReductionType::Lg).unwrap(),
//!     "HLA-A*01:01g"
//! );
//! ```

mod strategy;

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::cache::{CacheStats, ReduceCache};
use crate::compare::natural_cmp;
use crate::config::{ReduceConfig, ReductionType};
use crate::error::HlaError;
use crate::reference::mapping::ReferenceMapping;
use crate::reference::provider::ReferenceProvider;
use crate::{gl, mac, serology, v2};

pub(crate) const HLA_PREFIX: &str = "HLA-";

/// Loci that kept single-field names through the V2 era
const V2_EXCLUDED_LOCI: [&str; 3] = ["MICA", "MICB", "HFE"];

/// The reduction engine for one reference database version
#[derive(Debug)]
pub struct Reducer {
    pub(crate) mapping: ReferenceMapping,
    pub(crate) config: ReduceConfig,
    /// Names the G/P tables can produce; marker-suffixed names validate
    /// against this set
    pub(crate) group_names: HashSet<String>,
    pub(crate) cache: ReduceCache,
}

impl Reducer {
    /// Create an engine for the provider's current database version
    pub fn new<P: ReferenceProvider>(
        provider: &P,
        config: ReduceConfig,
    ) -> Result<Self, HlaError> {
        let version = provider.db_version();
        Self::with_version(provider, &version, config)
    }

    /// Create an engine for a specific database version
    pub fn with_version<P: ReferenceProvider>(
        provider: &P,
        version: &str,
        config: ReduceConfig,
    ) -> Result<Self, HlaError> {
        let mapping = provider.load(version)?;
        Ok(Self::with_mapping(mapping, config))
    }

    /// Create an engine from an already-loaded table snapshot
    pub fn with_mapping(mapping: ReferenceMapping, config: ReduceConfig) -> Self {
        let group_names = mapping.group_names();
        let cache = ReduceCache::new(config.cache_size);
        Self {
            mapping,
            config,
            group_names,
            cache,
        }
    }

    /// The database version behind this engine
    pub fn db_version(&self) -> &str {
        &self.mapping.version
    }

    /// The configuration this engine was built with
    pub fn config(&self) -> &ReduceConfig {
        &self.config
    }

    /// Memoization statistics, keyed by operation name
    pub fn cache_stats(&self) -> HashMap<&'static str, CacheStats> {
        self.cache.stats()
    }

    /// Drop all memoized results
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Reduce a GL String to the requested resolution.
    ///
    /// Recurses over delimiters in precedence order (`^ | + ~ /`), reduces
    /// every atomic token, and recombines: `^`, `|` and `/` groups are
    /// flattened, deduplicated and sorted; `+` pairs are sorted keeping
    /// duplicates; `~` haplotypes keep their order.
    pub fn reduce(&self, input: &str, reduction_type: ReductionType) -> Result<String, HlaError> {
        self.cache
            .reduce
            .get_or_try_compute((input.to_string(), reduction_type), || {
                self.reduce_inner(input, reduction_type)
            })
    }

    /// Validate a GL String against the reference tables.
    ///
    /// Returns `Ok(true)` when every token is valid; otherwise the typed
    /// error for the first offending token.
    pub fn validate(&self, input: &str) -> Result<bool, HlaError> {
        self.reduce(input, ReductionType::Default).map(|_| true)
    }

    fn reduce_inner(&self, input: &str, reduction_type: ReductionType) -> Result<String, HlaError> {
        let input = input.trim();
        if let Some(delimiter) = gl::find_delimiter(input) {
            let parts = input
                .split(delimiter)
                .map(|part| self.reduce(part, reduction_type))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(gl::recombine(
                delimiter,
                parts,
                &self.config.ignore_allele_with_suffixes,
            ));
        }
        self.reduce_token(input, reduction_type)
    }

    /// Classification cascade for one atomic token.
    fn reduce_token(&self, token: &str, reduction_type: ReductionType) -> Result<String, HlaError> {
        if token.is_empty() {
            return Ok(String::new());
        }
        gl::validate_token_shape(token)?;

        if let Some(rest) = token.strip_prefix(HLA_PREFIX) {
            let reduced = self.reduce(rest, reduction_type)?;
            return Ok(reattach_prefix(&reduced));
        }

        // tokens with an exempt suffix bypass classification entirely
        if gl::has_ignored_suffix(token, &self.config.ignore_allele_with_suffixes) {
            return Ok(token.to_string());
        }

        // legacy V2 nomenclature
        if self.is_v2(token) {
            let v3 = self.v2_to_v3_form(token);
            if v3 != token {
                debug!("V2 {} -> {}", token, v3);
                return self.reduce(&v3, reduction_type);
            }
        }

        // serology designation; already at serologic resolution, so S is a
        // fixed point (expanding would inflate a split into its broad)
        if self.config.reduce_serology && self.mapping.is_serology(token) {
            if reduction_type == ReductionType::S {
                return Ok(token.to_string());
            }
            let expansion = serology::allele_expansion(&self.mapping, token);
            if expansion.is_empty() {
                return Ok(String::new());
            }
            return self.reduce(&expansion.join("/"), reduction_type);
        }

        // anything left must be molecular: locus-antigen, colon, code
        let (locus_antigen, code) = token.split_once(':').ok_or_else(|| {
            HlaError::invalid_typing(token, "expected a locus*antigen:code shape")
        })?;
        if locus_antigen.is_empty() || token.split(':').any(|field| field.is_empty()) {
            return Err(HlaError::invalid_typing(token, "empty field"));
        }

        // XX antigen-group wildcard; checked before MAC on purpose, a code
        // may satisfy both shapes
        if self.config.reduce_xx && code == "XX" {
            if let Some(expansion) = self.mapping.xx_codes.get(locus_antigen) {
                return self.reduce(&expansion.join("/"), reduction_type);
            }
        }

        // multiple allele code
        if self.config.reduce_mac && code.chars().all(|c| c.is_ascii_alphabetic()) {
            if self.is_mac(token) {
                let expansion = mac::expand_mac(&self.mapping, token)?;
                if expansion.is_empty() {
                    return Ok(String::new());
                }
                return self.reduce(&expansion.join("/"), reduction_type);
            }
            return Err(HlaError::invalid_mac(
                token,
                format!("{} is not a known code for {}", code, locus_antigen),
            ));
        }

        // short null shortcut
        if self.config.reduce_shortnull {
            if let Some(expansion) = self.mapping.shortnulls.get(token) {
                return self.reduce(&expansion.join("/"), reduction_type);
            }
        }

        // plain allele
        self.reduce_allele(token, reduction_type)
    }

    /// Whether `token` is a MAC-typed allele (`Locus*Field:CODE`)
    pub fn is_mac(&self, token: &str) -> bool {
        let bare = token.strip_prefix(HLA_PREFIX).unwrap_or(token);
        self.cache
            .mac
            .get_or_try_compute(bare.to_string(), || Ok(mac::is_mac(&self.mapping, bare)))
            .unwrap_or(false)
    }

    /// Whether the text names an XX antigen-group wildcard.
    ///
    /// When `locus_antigen` and `code` are both given, `text` is ignored
    /// and the pre-split parts are checked directly.
    pub fn is_xx(&self, text: &str, locus_antigen: Option<&str>, code: Option<&str>) -> bool {
        match (locus_antigen, code) {
            (Some(locus_antigen), Some(code)) => {
                code == "XX" && self.mapping.xx_codes.contains_key(locus_antigen)
            }
            _ => {
                let bare = text.strip_prefix(HLA_PREFIX).unwrap_or(text);
                bare.split_once(':').is_some_and(|(locus_antigen, code)| {
                    code == "XX" && self.mapping.xx_codes.contains_key(locus_antigen)
                })
            }
        }
    }

    /// Whether `allele` is a legacy V2 name that translates to a different
    /// V3 name
    pub fn is_v2(&self, allele: &str) -> bool {
        if !self.config.reduce_v2 {
            return false;
        }
        let bare = allele.strip_prefix(HLA_PREFIX).unwrap_or(allele);
        if !bare.contains('*') || bare.contains(':') {
            return false;
        }
        let locus = bare.split('*').next().unwrap_or("");
        if V2_EXCLUDED_LOCI.contains(&locus) {
            return false;
        }
        self.v2_to_v3_form(bare) != bare
    }

    /// Whether `text` is a registered serology designation
    pub fn is_serology(&self, text: &str) -> bool {
        let bare = text.strip_prefix(HLA_PREFIX).unwrap_or(text);
        self.mapping.is_serology(bare)
    }

    /// Whether `allele` is a short null shortcut
    pub fn is_shortnull(&self, allele: &str) -> bool {
        let bare = allele.strip_prefix(HLA_PREFIX).unwrap_or(allele);
        self.mapping.is_shortnull(bare)
    }

    /// Translate a legacy V2 name to V3; non-V2 inputs pass through
    pub fn v2_to_v3(&self, allele: &str) -> String {
        if self.is_v2(allele) {
            match allele.strip_prefix(HLA_PREFIX) {
                Some(rest) => format!("{}{}", HLA_PREFIX, self.v2_to_v3_form(rest)),
                None => self.v2_to_v3_form(allele),
            }
        } else {
            allele.to_string()
        }
    }

    /// Exception table first, heuristic prediction second
    fn v2_to_v3_form(&self, allele: &str) -> String {
        match self.mapping.v2_to_v3.get(allele) {
            Some(v3) => v3.clone(),
            None => v2::predict_v3(allele),
        }
    }

    /// Decode a MAC-typed allele to its slash-joined allele list
    pub fn expand_mac(&self, token: &str) -> Result<String, HlaError> {
        match token.strip_prefix(HLA_PREFIX) {
            Some(rest) => {
                let expanded = mac::expand_mac(&self.mapping, rest)?;
                Ok(expanded
                    .iter()
                    .map(|a| format!("{}{}", HLA_PREFIX, a))
                    .collect::<Vec<_>>()
                    .join("/"))
            }
            None => Ok(mac::expand_mac(&self.mapping, token)?.join("/")),
        }
    }

    /// Encode a slash-joined allele list as a MAC-typed allele
    pub fn lookup_mac(&self, allele_list: &str) -> Result<String, HlaError> {
        mac::lookup_mac(&self.mapping, allele_list)
    }

    /// Restrict an allele list (or a MAC/XX typing) to its common and
    /// well-documented members
    pub fn cwd_redux(&self, allele_list: &str) -> Result<String, HlaError> {
        let alleles: Vec<String> = if self.is_mac(allele_list) {
            let bare = allele_list.strip_prefix(HLA_PREFIX).unwrap_or(allele_list);
            mac::expand_mac(&self.mapping, bare)?
        } else if self.is_xx(allele_list, None, None) {
            let bare = allele_list.strip_prefix(HLA_PREFIX).unwrap_or(allele_list);
            bare.split_once(':')
                .and_then(|(locus_antigen, _)| self.mapping.xx_codes.get(locus_antigen))
                .cloned()
                .unwrap_or_default()
        } else {
            allele_list
                .split('/')
                .filter(|a| !a.is_empty())
                .map(String::from)
                .collect()
        };

        let mut common: Vec<String> = alleles
            .into_iter()
            .filter(|allele| self.is_cwd(allele))
            .collect();
        common.sort_by(|a, b| natural_cmp(a, b));
        common.dedup();
        Ok(common.join("/"))
    }

    /// CWD membership is decided at the two-field level
    fn is_cwd(&self, allele: &str) -> bool {
        let locus = allele.split('*').next().unwrap_or("");
        let two_field = strategy::two_field_form(allele);
        self.mapping
            .cwd
            .get(locus)
            .is_some_and(|set| set.contains(&two_field))
    }

    /// Resolve the broad/split relationship for a serologic or DNA-locus
    /// antigen name
    pub fn find_broad_splits(&self, name: &str) -> Option<(String, Vec<String>)> {
        serology::find_broad_splits(&self.mapping, name)
    }

    /// The historically associated antigen for a serology, identity when
    /// unmapped
    pub fn find_associated_antigen(&self, name: &str) -> String {
        serology::find_associated_antigen(&self.mapping, name)
    }

    /// Alleles and MAC typings completing `prefix`, naturally sorted.
    ///
    /// Returns `None` for prefixes that are not molecular (`*` missing) or
    /// match nothing.
    pub fn similar_alleles(&self, prefix: &str) -> Option<Vec<String>> {
        if !prefix.contains('*') {
            return None;
        }
        let mut matches: Vec<String> = Vec::new();

        if let Some((locus_antigen, code_prefix)) = prefix.split_once(':') {
            if !code_prefix.is_empty()
                && code_prefix.chars().all(|c| c.is_ascii_alphabetic())
            {
                for code in self.mapping.mac_codes.keys() {
                    if code.starts_with(code_prefix) {
                        let candidate = format!("{}:{}", locus_antigen, code);
                        if self.is_mac(&candidate) {
                            matches.push(candidate);
                        }
                    }
                }
            }
        }

        matches.extend(
            self.mapping
                .valid_alleles
                .iter()
                .filter(|allele| allele.starts_with(prefix))
                .cloned(),
        );

        if matches.is_empty() {
            return None;
        }
        matches.sort_by(|a, b| natural_cmp(a, b));
        matches.dedup();
        Some(matches)
    }
}

/// Put the `HLA-` prefix back on every slash-separated component
fn reattach_prefix(reduced: &str) -> String {
    if reduced.is_empty() {
        return String::new();
    }
    reduced
        .split('/')
        .map(|part| format!("{}{}", HLA_PREFIX, part))
        .collect::<Vec<_>>()
        .join("/")
}
