//! Findings reported while reconciling, and where they go.

use std::fmt;

use tracing::error;
use tracing::info;
use tracing::warn;

use crate::manifest::Schema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Present in both schemas with equal canonical values.
    Match { field: String },
    /// Absent from both schemas.
    MissingField { field: String },
    /// Present in exactly one schema.
    AsymmetricPresence {
        field: String,
        present_in: Schema,
        value: String,
    },
    /// Present in both, canonical values differ.
    ValueMismatch {
        field: String,
        modern: String,
        legacy: String,
    },
    /// Fields stored under different paths differ.
    StructuralMismatch {
        modern_path: String,
        legacy_path: String,
    },
    /// Top-level names of one schema that no check covered.
    Unchecked { schema: Schema, fields: Vec<String> },
    Note(String),
}

impl Finding {
    pub fn severity(&self) -> Severity {
        match self {
            Finding::Match { .. } | Finding::Note(_) => Severity::Info,
            Finding::Unchecked { fields, .. } if fields.is_empty() => Severity::Info,
            Finding::MissingField { .. }
            | Finding::AsymmetricPresence { .. }
            | Finding::Unchecked { .. } => Severity::Warning,
            Finding::ValueMismatch { .. } | Finding::StructuralMismatch { .. } => Severity::Error,
        }
    }

    /// Whether the finding adds to the problem count.
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            Finding::AsymmetricPresence { .. }
                | Finding::ValueMismatch { .. }
                | Finding::StructuralMismatch { .. }
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Finding::Match { .. } => "match",
            Finding::MissingField { .. } => "missing_field",
            Finding::AsymmetricPresence { .. } => "asymmetric_presence",
            Finding::ValueMismatch { .. } => "value_mismatch",
            Finding::StructuralMismatch { .. } => "structural_mismatch",
            Finding::Unchecked { .. } => "unchecked",
            Finding::Note(_) => "note",
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::Match { field } => write!(
                f,
                "\"{field}\" found in both {} and {}",
                Schema::Modern,
                Schema::Legacy
            ),
            Finding::MissingField { field } => write!(
                f,
                "\"{field}\" not found in {} nor in {}",
                Schema::Modern,
                Schema::Legacy
            ),
            Finding::AsymmetricPresence {
                field,
                present_in,
                value,
            } => {
                let missing_from = match present_in {
                    Schema::Modern => Schema::Legacy,
                    Schema::Legacy => Schema::Modern,
                };
                write!(
                    f,
                    "{present_in}.{field}: {value}, but \"{field}\" not in {missing_from}"
                )
            }
            Finding::ValueMismatch {
                field,
                modern,
                legacy,
            } => write!(
                f,
                "Values do not match between {}.{field}: {modern} and {}.{field}: {legacy}",
                Schema::Modern.section(),
                Schema::Legacy.section()
            ),
            Finding::StructuralMismatch {
                modern_path,
                legacy_path,
            } => write!(
                f,
                "[{}.{modern_path}] does not match [{}.{legacy_path}]",
                Schema::Modern.section(),
                Schema::Legacy.section()
            ),
            Finding::Unchecked { schema, fields } if fields.is_empty() => {
                write!(f, "Fields not checked in {schema}: (none)")
            }
            Finding::Unchecked { schema, fields } => {
                write!(f, "Fields not checked in {schema}: {}", fields.join(", "))
            }
            Finding::Note(text) => f.write_str(text),
        }
    }
}

/// Receives findings as they are produced.
pub trait FindingSink {
    fn record(&mut self, finding: Finding);
}

impl FindingSink for Vec<Finding> {
    fn record(&mut self, finding: Finding) {
        self.push(finding);
    }
}

/// Emits each finding as a tracing event at its severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl FindingSink for TracingSink {
    fn record(&mut self, finding: Finding) {
        let kind = finding.kind();
        match finding.severity() {
            Severity::Info => info!(finding = kind, "{finding}"),
            Severity::Warning => warn!(finding = kind, "{finding}"),
            Severity::Error => error!(finding = kind, "{finding}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_classification() {
        let missing = Finding::MissingField {
            field: "readme".into(),
        };
        assert_eq!(missing.severity(), Severity::Warning);
        assert!(!missing.is_problem());

        let one_sided = Finding::AsymmetricPresence {
            field: "keywords".into(),
            present_in: Schema::Legacy,
            value: "[\"cli\"]".into(),
        };
        assert_eq!(one_sided.severity(), Severity::Warning);
        assert!(one_sided.is_problem());

        let structural = Finding::StructuralMismatch {
            modern_path: "optional-dependencies.dev".into(),
            legacy_path: "group.dev.dependencies".into(),
        };
        assert_eq!(structural.severity(), Severity::Error);
        assert!(structural.is_problem());

        let unchecked = Finding::Unchecked {
            schema: Schema::Modern,
            fields: vec!["license".into()],
        };
        assert_eq!(unchecked.severity(), Severity::Warning);
        assert!(!unchecked.is_problem());
    }

    #[test]
    fn test_empty_unchecked_list_is_informational() {
        let none = Finding::Unchecked {
            schema: Schema::Legacy,
            fields: Vec::new(),
        };
        assert_eq!(none.severity(), Severity::Info);
        assert!(!none.is_problem());
        assert_eq!(none.to_string(), "Fields not checked in [tool.poetry]: (none)");

        let some = Finding::Unchecked {
            schema: Schema::Modern,
            fields: vec!["license".into(), "requires-python".into()],
        };
        assert_eq!(
            some.to_string(),
            "Fields not checked in [project]: license, requires-python"
        );
    }

    #[test]
    fn test_messages() {
        let mismatch = Finding::ValueMismatch {
            field: "version".into(),
            modern: "\"1.0.0\"".into(),
            legacy: "\"1.0.1\"".into(),
        };
        assert_eq!(
            mismatch.to_string(),
            "Values do not match between project.version: \"1.0.0\" and tool.poetry.version: \"1.0.1\""
        );

        let one_sided = Finding::AsymmetricPresence {
            field: "keywords".into(),
            present_in: Schema::Legacy,
            value: "[\"cli\"]".into(),
        };
        assert_eq!(
            one_sided.to_string(),
            "[tool.poetry].keywords: [\"cli\"], but \"keywords\" not in [project]"
        );

        let structural = Finding::StructuralMismatch {
            modern_path: "optional-dependencies.dev".into(),
            legacy_path: "group.dev.dependencies".into(),
        };
        assert_eq!(
            structural.to_string(),
            "[project.optional-dependencies.dev] does not match [tool.poetry.group.dev.dependencies]"
        );
    }

    #[test]
    fn test_vec_sink_collects_in_order() {
        let mut sink: Vec<Finding> = Vec::new();
        sink.record(Finding::Note("first".into()));
        sink.record(Finding::Match {
            field: "name".into(),
        });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].kind(), "note");
        assert_eq!(sink[1].severity(), Severity::Info);
    }
}
