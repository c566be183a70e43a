use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a reconciliation before any finding is reported.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse manifest {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Manifest {origin} has no {section} table")]
    MissingSection {
        origin: String,
        section: &'static str,
    },

    #[error("{section}.{field} in {origin} is not a valid {expected} value: {reason}")]
    FieldShape {
        origin: String,
        section: &'static str,
        field: String,
        expected: &'static str,
        reason: String,
    },
}

impl ManifestError {
    /// Whether the manifest exists but does not have the expected structure.
    pub fn is_unparseable(&self) -> bool {
        !matches!(self, ManifestError::Read { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ManifestError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_classification() {
        let err = ManifestError::Read {
            path: PathBuf::from("missing.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.is_not_found());
        assert!(!err.is_unparseable());
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_shape_error_message() {
        let err = ManifestError::FieldShape {
            origin: "pyproject.toml".into(),
            section: "tool.poetry",
            field: "authors".into(),
            expected: "author list",
            reason: "invalid type: integer `3`".into(),
        };
        assert!(err.is_unparseable());
        assert_eq!(
            err.to_string(),
            "tool.poetry.authors in pyproject.toml is not a valid author list value: invalid type: integer `3`"
        );
    }
}
