//! Idempotency tests
//!
//! For every resolution `t` and every valid input `x`,
//! `reduce(reduce(x, t), t) == reduce(x, t)`. Outputs must be safe to
//! re-process: registries routinely re-reduce stored results when new
//! reference versions load.

use ferro_hla::{MockProvider, ReduceConfig, Reducer, ReductionType};

const ALL_TYPES: [ReductionType; 8] = [
    ReductionType::G,
    ReductionType::P,
    ReductionType::Lg,
    ReductionType::Lgx,
    ReductionType::W,
    ReductionType::Exon,
    ReductionType::U2,
    ReductionType::S,
];

const INPUTS: [&str; 18] = [
    "A*01:01",
    "A*01:01:01",
    "A*01:01:01:01",
    "A*02:01:01:02L",
    "A*24:02:01:01",
    "B*07:02:01",
    "B*08:01:01",
    "B*44:02:01:02S",
    "DRB4*01:03:01:02N",
    "HLA-A*01:01:01",
    "A*01:AB",
    "A*01:XX",
    "A1",
    "A*0101",
    "DRB4*01:03N",
    "A*01:01/A*01:02/A*02:01",
    "A*01:01:01+A*02:01:01:01",
    "B*07:02~A*01:01^A*01:01+A*02:01",
];

fn reducer(config: ReduceConfig) -> Reducer {
    Reducer::new(&MockProvider::with_test_data(), config).unwrap()
}

#[test]
fn reduce_is_idempotent_for_every_type() {
    let reducer = reducer(ReduceConfig::default());
    for reduction_type in ALL_TYPES {
        for input in INPUTS {
            let once = match reducer.reduce(input, reduction_type) {
                Ok(reduced) => reduced,
                // serology inputs are molecular-only under S, etc.; errors
                // are covered elsewhere
                Err(_) => continue,
            };
            if once.is_empty() {
                continue;
            }
            let twice = reducer
                .reduce(&once, reduction_type)
                .unwrap_or_else(|e| panic!("re-reducing {:?} ({}) failed: {}", once, reduction_type, e));
            assert_eq!(
                twice, once,
                "{} not idempotent for input {:?}",
                reduction_type, input
            );
        }
    }
}

#[test]
fn reduce_is_idempotent_without_ping() {
    let reducer = reducer(ReduceConfig::default().with_ping(false));
    for reduction_type in [ReductionType::Lg, ReductionType::Lgx, ReductionType::U2] {
        for input in INPUTS {
            let Ok(once) = reducer.reduce(input, reduction_type) else {
                continue;
            };
            if once.is_empty() {
                continue;
            }
            assert_eq!(reducer.reduce(&once, reduction_type).unwrap(), once);
        }
    }
}

#[test]
fn validate_accepts_every_reduced_output() {
    let reducer = reducer(ReduceConfig::default());
    for reduction_type in [ReductionType::G, ReductionType::Lgx, ReductionType::Exon] {
        for input in INPUTS {
            let Ok(once) = reducer.reduce(input, reduction_type) else {
                continue;
            };
            if once.is_empty() {
                continue;
            }
            assert!(
                reducer.validate(&once).is_ok(),
                "output {:?} of {} does not validate",
                once,
                reduction_type
            );
        }
    }
}

#[test]
fn repeated_calls_hit_the_cache_with_identical_results() {
    let reducer = reducer(ReduceConfig::default());
    let first = reducer.reduce("A*01:AB/A*01:03", ReductionType::Lgx).unwrap();
    for _ in 0..10 {
        assert_eq!(
            reducer.reduce("A*01:AB/A*01:03", ReductionType::Lgx).unwrap(),
            first
        );
    }
    assert!(reducer.cache_stats()["reduce"].hits >= 10);
}
