//! Reference data access
//!
//! The engine consumes a read-only, per-database-version snapshot of the
//! IMGT/HLA-derived lookup tables. Building those tables (the ETL pipeline)
//! is out of scope; this module defines the snapshot shape, the provider
//! interface, and an in-memory provider for tests.

pub mod mapping;
pub mod mock;
pub mod provider;

pub use mapping::{ReferenceMapping, SerologyEntry};
pub use mock::MockProvider;
pub use provider::ReferenceProvider;
