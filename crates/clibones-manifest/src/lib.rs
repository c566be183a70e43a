#![deny(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! Reconciliation of the two metadata tables of a `pyproject.toml`.
//!
//! The modern `[project]` table is the baseline; the legacy `[tool.poetry]`
//! table is checked against it field by field. Each field is compared under
//! the equivalence rule of its [`ComparatorKind`], and every discrepancy is
//! reported to a [`FindingSink`] before the total problem count is returned.

pub mod build_system;
pub mod error;
pub mod fields;
pub mod finding;
pub mod manifest;
pub mod module_init;
pub mod reconcile;
pub mod table;
pub mod version;

pub use build_system::BuildBackend;
pub use build_system::BuildSystemError;
pub use build_system::UnknownBackend;
pub use build_system::swap_build_system;
pub use error::ManifestError;
pub use fields::AuthorEntry;
pub use fields::Canonical;
pub use fields::Dependencies;
pub use fields::FieldValue;
pub use fields::LegacyConstraint;
pub use finding::Finding;
pub use finding::FindingSink;
pub use finding::Severity;
pub use finding::TracingSink;
pub use manifest::DEFAULT_MANIFEST;
pub use manifest::Manifest;
pub use manifest::Schema;
pub use module_init::ModuleInitError;
pub use module_init::generate_module_init;
pub use reconcile::PreparedManifest;
pub use reconcile::reconcile;
pub use table::ComparatorKind;
pub use table::FieldTable;
pub use table::GroupRule;
pub use version::VersionError;
pub use version::translate_constraint;
pub use version::upper_bound;
