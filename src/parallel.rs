//! Parallel batch helpers
//!
//! Rayon-backed variants of the reduction entry points for large inputs
//! (registry imports, donor files). Enable with the `parallel` feature.
//! The engine itself is freely shareable; these helpers only spread the
//! work and preserve input order.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "parallel")]
//! # fn main() {
//! use ferro_hla::parallel::reduce_parallel;
//! use ferro_hla::{MockProvider, ReduceConfig, Reducer, ReductionType};
//!
//! let provider = MockProvider::with_test_data();
//! let reducer = Reducer::new(&provider, ReduceConfig::default()).unwrap();
//!
//! let typings = vec!["A*01:01:01", "B*07:02:01", "A*01:AB"];
//! let reduced = reduce_parallel(&reducer, &typings, ReductionType::Lgx);
//! assert_eq!(reduced.len(), typings.len());
//! # }
//! # #[cfg(not(feature = "parallel"))]
//! # fn main() {}
//! ```

use rayon::prelude::*;

use crate::config::ReductionType;
use crate::error::HlaError;
use crate::reduce::Reducer;

/// Reduce many GL Strings in parallel; one result per input, order
/// preserved.
pub fn reduce_parallel<S: AsRef<str> + Sync>(
    reducer: &Reducer,
    inputs: &[S],
    reduction_type: ReductionType,
) -> Vec<Result<String, HlaError>> {
    inputs
        .par_iter()
        .map(|input| reducer.reduce(input.as_ref(), reduction_type))
        .collect()
}

/// Reduce many GL Strings in parallel, keeping only the successes.
pub fn reduce_parallel_ok<S: AsRef<str> + Sync>(
    reducer: &Reducer,
    inputs: &[S],
    reduction_type: ReductionType,
) -> Vec<String> {
    inputs
        .par_iter()
        .filter_map(|input| reducer.reduce(input.as_ref(), reduction_type).ok())
        .collect()
}

/// Validate many GL Strings in parallel; one result per input, order
/// preserved.
pub fn validate_parallel<S: AsRef<str> + Sync>(
    reducer: &Reducer,
    inputs: &[S],
) -> Vec<Result<bool, HlaError>> {
    inputs
        .par_iter()
        .map(|input| reducer.validate(input.as_ref()))
        .collect()
}
