//! In-place rewrite of a manifest's `[build-system]` table.
//!
//! Edits go through `toml_edit` so comments, ordering and formatting of
//! everything outside `[build-system]` survive the rewrite.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use toml_edit::Array;
use toml_edit::DocumentMut;
use tracing::debug;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildBackend {
    Hatch,
    Poetry,
}

impl BuildBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildBackend::Hatch => "hatch",
            BuildBackend::Poetry => "poetry",
        }
    }

    pub fn requires(&self) -> &'static [&'static str] {
        match self {
            BuildBackend::Hatch => &["hatchling", "hatch-vcs"],
            BuildBackend::Poetry => &["poetry-core>=1.0.0"],
        }
    }

    pub fn build_backend(&self) -> &'static str {
        match self {
            BuildBackend::Hatch => "hatchling.build",
            BuildBackend::Poetry => "poetry.core.masonry.api",
        }
    }
}

impl fmt::Display for BuildBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown build backend '{0}' (expected hatch or poetry)")]
pub struct UnknownBackend(pub String);

impl FromStr for BuildBackend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hatch" | "hatchling" => Ok(BuildBackend::Hatch),
            "poetry" | "poetry-core" => Ok(BuildBackend::Poetry),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

#[derive(Error, Debug)]
pub enum BuildSystemError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },

    #[error("[build-system] in {path} is not a table")]
    NotATable { path: PathBuf },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildSystemError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BuildSystemError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }

    pub fn is_unparseable(&self) -> bool {
        matches!(
            self,
            BuildSystemError::Parse { .. } | BuildSystemError::NotATable { .. }
        )
    }
}

/// Point `[build-system]` of `document` at `backend`.
///
/// Returns whether the table already existed, or `None` when
/// `build-system` holds something other than a table.
pub fn apply_backend(document: &mut DocumentMut, backend: BuildBackend) -> Option<bool> {
    let existed = document.contains_key("build-system");
    let table = document
        .entry("build-system")
        .or_insert(toml_edit::table())
        .as_table_like_mut()?;

    let requires: Array = backend.requires().iter().copied().collect();
    table.insert("requires", toml_edit::value(requires));
    table.insert("build-backend", toml_edit::value(backend.build_backend()));
    Some(existed)
}

/// Rewrite the manifest at `path` to build with `backend`.
pub fn swap_build_system(path: &Path, backend: BuildBackend) -> Result<(), BuildSystemError> {
    let text = fs::read_to_string(path).map_err(|source| BuildSystemError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut document = text
        .parse::<DocumentMut>()
        .map_err(|source| BuildSystemError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let existed = apply_backend(&mut document, backend).ok_or_else(|| {
        BuildSystemError::NotATable {
            path: path.to_path_buf(),
        }
    })?;
    if !existed {
        debug!(path = %path.display(), "Created missing [build-system] table");
    }

    let temp_path = path.with_extension("toml.tmp");
    fs::write(&temp_path, document.to_string()).map_err(|source| BuildSystemError::Write {
        path: temp_path.clone(),
        source,
    })?;
    fs::rename(&temp_path, path).map_err(|source| BuildSystemError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), backend = %backend, "Build system switched");
    Ok(())
}
