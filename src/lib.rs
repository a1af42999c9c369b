// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-hla: HLA genotype reduction engine
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Normalizes HLA genotype nomenclature — GL Strings combining molecular
//! alleles, multiple allele codes (MACs), XX wildcards, legacy V2 names,
//! serology and short null shortcuts — to a chosen target resolution
//! (`G`, `P`, `lg`, `lgx`, `W`, `exon`, `U2`, `S`). Reductions are
//! deterministic, idempotent and safe to run concurrently against one
//! immutable reference-table snapshot.
//!
//! # Example
//!
//! ```
//! use ferro_hla::{MockProvider, ReduceConfig, Reducer, ReductionType};
//!
//! // Build an engine against a reference snapshot
//! let provider = MockProvider::with_test_data();
//! let reducer = Reducer::new(&provider, ReduceConfig::default()).unwrap();
//!
//! // Reduce a typing to its two-field ARD group
//! let reduced = reducer.reduce("A*01:01:01", ReductionType::Lgx).unwrap();
//! assert_eq!(reduced, "A*01:01");
//!
//! // Expand a multiple allele code
//! let expanded = reducer.expand_mac("A*01:AB").unwrap();
//! assert_eq!(expanded, "A*01:01/A*01:02");
//! ```

pub mod cache;
pub mod compare;
pub mod config;
pub mod error;
pub mod gl;
pub mod mac;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod reduce;
pub mod reference;
pub mod serology;
pub mod v2;

// Re-export commonly used types
pub use compare::natural_cmp;
pub use config::{ReduceConfig, ReductionType};
pub use error::HlaError;
pub use reduce::Reducer;
pub use reference::{MockProvider, ReferenceMapping, ReferenceProvider};

/// Result type alias for ferro-hla operations
pub type Result<T> = std::result::Result<T, HlaError>;
