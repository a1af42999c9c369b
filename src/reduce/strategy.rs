//! Per-resolution reduction strategies
//!
//! One `match` covers every [`ReductionType`], so the ping re-reduction
//! logic can see all branches. Strategies only ever receive plain,
//! already-classified alleles; expansions that come back slash-joined flow
//! through the grammar recombiner.

use log::{debug, warn};

use crate::compare::EXPRESSION_CHARS;
use crate::config::ReductionType;
use crate::error::HlaError;
use crate::reduce::{Reducer, HLA_PREFIX};

/// Bound on ping re-reduction rounds. The heuristic converges in one or
/// two rounds for every observed table state; the bound keeps a
/// pathological table from looping.
const MAX_PING_ROUNDS: usize = 8;

impl Reducer {
    /// Reduce one plain allele to the requested resolution (memoized).
    pub(crate) fn reduce_allele(
        &self,
        allele: &str,
        reduction_type: ReductionType,
    ) -> Result<String, HlaError> {
        self.cache
            .allele
            .get_or_try_compute((allele.to_string(), reduction_type), || {
                self.reduce_allele_impl(allele, reduction_type)
            })
    }

    fn reduce_allele_impl(
        &self,
        allele: &str,
        reduction_type: ReductionType,
    ) -> Result<String, HlaError> {
        if let Some(rest) = allele.strip_prefix(HLA_PREFIX) {
            let reduced = self.reduce_allele(rest, reduction_type)?;
            if reduced.is_empty() {
                return Ok(reduced);
            }
            return Ok(reduced
                .split('/')
                .map(|part| format!("{}{}", HLA_PREFIX, part))
                .collect::<Vec<_>>()
                .join("/"));
        }

        if reduction_type == ReductionType::Default {
            return self.validate_allele(allele);
        }

        // markers come off before validation so reduction outputs
        // ("A*01:01:01G", "A*01:01g") re-reduce cleanly
        let subject = self.strip_group_marker(allele, reduction_type);

        // settle the allele against the tables once, up front: strict mode
        // fails here, non-strict mode may land on a suffixed variant
        let resolved = match self.validate_allele(&subject) {
            Ok(resolved) => resolved,
            Err(err) if self.config.strict => return Err(err),
            Err(_) => subject,
        };

        match reduction_type {
            ReductionType::Lg | ReductionType::Lgx | ReductionType::U2 if self.config.ping => {
                self.reduce_with_ping(&resolved, reduction_type)
            }
            _ => self.reduce_plain(&resolved, reduction_type),
        }
    }

    /// Validate-only reduction: the allele itself when it is known, the
    /// probed or truncated variant when leniency applies, an error
    /// otherwise.
    pub(crate) fn validate_allele(&self, allele: &str) -> Result<String, HlaError> {
        if (allele.ends_with('P') || allele.ends_with('G')) && self.group_names.contains(allele) {
            return Ok(allele.to_string());
        }
        if let Some(resolved) = self.resolve_valid(allele) {
            return Ok(resolved);
        }
        if self.config.reduce_3field && allele.matches(':').count() >= 2 {
            if let Some((head, _)) = allele.rsplit_once(':') {
                debug!("retrying validation of {} as {}", allele, head);
                return self
                    .validate_allele(head)
                    .map_err(|_| HlaError::invalid_allele(allele));
            }
        }
        Err(HlaError::invalid_allele(allele))
    }

    /// Verbatim lookup, then expression-suffix probing in non-strict mode.
    fn resolve_valid(&self, allele: &str) -> Option<String> {
        if self.mapping.is_valid_allele(allele) {
            return Some(allele.to_string());
        }
        if !self.config.strict && allele.contains(':') {
            for suffix in EXPRESSION_CHARS {
                let candidate = format!("{}{}", allele, suffix);
                if self.mapping.is_valid_allele(&candidate) {
                    warn!("accepting {} for unknown allele {}", candidate, allele);
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Drop a trailing resolution marker before group lookup.
    ///
    /// `P`/`G` markers come off for `G`, `lg` and `lgx` reductions (gated
    /// by `reduce_P`); the lg marker (`g`/`ARS`) comes off for `lg` and
    /// `lgx`, so lg outputs re-reduce to themselves.
    fn strip_group_marker(&self, allele: &str, reduction_type: ReductionType) -> String {
        let group_types = matches!(
            reduction_type,
            ReductionType::G | ReductionType::Lg | ReductionType::Lgx
        );
        if group_types && self.config.reduce_p && allele.contains(':') {
            let mut chars = allele.chars().rev();
            if let (Some('P') | Some('G'), Some(prev)) = (chars.next(), chars.next()) {
                if prev.is_ascii_digit() {
                    return allele[..allele.len() - 1].to_string();
                }
            }
        }
        if matches!(reduction_type, ReductionType::Lg | ReductionType::Lgx) {
            let marker = self.config.lg_marker();
            if let Some(base) = allele.strip_suffix(marker) {
                if base.contains(':')
                    && base.ends_with(|c: char| c.is_ascii_digit() || EXPRESSION_CHARS.contains(&c))
                {
                    return base.to_string();
                }
            }
        }
        allele.to_string()
    }

    /// The ping fixed point: reduce, strip the marker the reduction added,
    /// reduce again, until nothing changes or the result is ambiguous.
    /// Alleles in the P-not-G exception table short-circuit to their mapped
    /// value; a depth bound guards against table-driven cycles.
    fn reduce_with_ping(
        &self,
        allele: &str,
        reduction_type: ReductionType,
    ) -> Result<String, HlaError> {
        let marker = self.config.lg_marker();
        let mut current = allele.to_string();
        let mut last = None;
        for _ in 0..MAX_PING_ROUNDS {
            if let Some(mapped) = self.mapping.p_not_g.get(&current) {
                return Ok(if reduction_type == ReductionType::Lg {
                    append_marker(mapped, marker)
                } else {
                    mapped.clone()
                });
            }
            let reduced = self.reduce_plain(&current, reduction_type)?;
            let stripped = if reduction_type == ReductionType::Lg {
                strip_marker(&reduced, marker)
            } else {
                reduced.clone()
            };
            if stripped == current || stripped.contains('/') {
                return Ok(reduced);
            }
            current = stripped;
            last = Some(reduced);
        }
        warn!("ping did not converge for {}", allele);
        Ok(last.unwrap_or(current))
    }

    /// The strategy table proper. `allele` is plain, validated, and free of
    /// resolution markers where the type calls for it.
    fn reduce_plain(
        &self,
        allele: &str,
        reduction_type: ReductionType,
    ) -> Result<String, HlaError> {
        match reduction_type {
            ReductionType::G => match self.mapping.g_group.get(allele) {
                Some(group) => Ok(self.mapping.dup_g.get(allele).unwrap_or(group).clone()),
                None => self.validate_allele(allele),
            },

            ReductionType::P => match self.mapping.p_group.get(allele) {
                Some(group) => Ok(group.clone()),
                None => self.validate_allele(allele),
            },

            ReductionType::Lgx => {
                if let Some(dup) = self.mapping.dup_lgx.get(allele) {
                    return Ok(dup.clone());
                }
                match self.mapping.lgx_group.get(allele) {
                    Some(group) => Ok(group.clone()),
                    None => Ok(two_field_form(allele)),
                }
            }

            ReductionType::Lg => {
                let lgx = self.reduce_plain(allele, ReductionType::Lgx)?;
                Ok(append_marker(&lgx, self.config.lg_marker()))
            }

            ReductionType::W => {
                if self.mapping.is_who_allele(allele) {
                    return Ok(allele.to_string());
                }
                match self.mapping.who_group.get(allele) {
                    Some(expansion) => self.reduce(&expansion.join("/"), ReductionType::W),
                    None => Ok(allele.to_string()),
                }
            }

            ReductionType::Exon => {
                if let Some(exon) = self.mapping.exon_group.get(allele) {
                    // a null allele may collapse onto a short null at the
                    // exon level; prefer that designation
                    if let Some(last) = allele.chars().last() {
                        if EXPRESSION_CHARS.contains(&last) {
                            let shortnull = format!("{}{}", exon, last);
                            if self.mapping.is_shortnull(&shortnull) {
                                return Ok(shortnull);
                            }
                        }
                    }
                    return Ok(exon.clone());
                }
                let who = self.reduce_plain(allele, ReductionType::W)?;
                if who == allele || is_two_field(&who) {
                    Ok(allele.to_string())
                } else {
                    self.reduce(&who, ReductionType::Exon)
                }
            }

            ReductionType::U2 => {
                let fields: Vec<&str> = allele.split(':').collect();
                if fields.len() == 2 {
                    return Ok(allele.to_string());
                }
                let mut two_field = format!("{}:{}", fields[0], fields[1]);
                if let Some(last) = allele.chars().last() {
                    if EXPRESSION_CHARS.contains(&last) && !two_field.ends_with(last) {
                        two_field.push(last);
                    }
                }
                if self.mapping.is_valid_allele(&two_field) {
                    Ok(two_field)
                } else {
                    // ambiguous at two fields; fall back to the group
                    self.reduce_plain(allele, ReductionType::Lgx)
                }
            }

            ReductionType::S => self.serology_reduction(allele),

            ReductionType::Default => self.validate_allele(allele),
        }
    }

    /// Serologic equivalents of a molecular allele, naturally sorted and
    /// slash-joined; empty when the allele has no serologic designation.
    fn serology_reduction(&self, allele: &str) -> Result<String, HlaError> {
        let two_field_query = is_two_field(allele);
        let query = if two_field_query {
            self.reduce_plain(allele, ReductionType::Lgx)?
        } else {
            allele.to_string()
        };

        let mut found: Vec<String> = self
            .mapping
            .serology
            .iter()
            .filter(|(_, entry)| {
                let list = if two_field_query {
                    &entry.lgx_alleles
                } else {
                    &entry.alleles
                };
                list.iter().any(|a| *a == query)
            })
            .map(|(name, _)| name.clone())
            .collect();

        if found.is_empty() && two_field_query {
            // older table rows carry only full-resolution alleles; match
            // them at the group level
            found = self
                .mapping
                .serology
                .iter()
                .filter(|(_, entry)| {
                    entry.alleles.iter().any(|a| {
                        self.reduce_plain(a, ReductionType::Lgx)
                            .is_ok_and(|reduced| reduced == query)
                    })
                })
                .map(|(name, _)| name.clone())
                .collect();
        }

        found.sort_by(|a, b| crate::compare::natural_cmp(a, b));
        found.dedup();
        Ok(found.join("/"))
    }
}

/// First two colon-separated fields; shorter alleles pass through.
pub(crate) fn two_field_form(allele: &str) -> String {
    let mut fields = allele.split(':');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(first), Some(second), Some(_)) => format!("{}:{}", first, second),
        _ => allele.to_string(),
    }
}

fn is_two_field(allele: &str) -> bool {
    allele.matches(':').count() == 1
}

/// Append the lg marker to every slash-separated component
fn append_marker(reduced: &str, marker: &str) -> String {
    reduced
        .split('/')
        .map(|part| format!("{}{}", part, marker))
        .collect::<Vec<_>>()
        .join("/")
}

/// Remove the lg marker from every slash-separated component
fn strip_marker(reduced: &str, marker: &str) -> String {
    reduced
        .split('/')
        .map(|part| part.strip_suffix(marker).unwrap_or(part))
        .collect::<Vec<_>>()
        .join("/")
}
