//! Loading a manifest document and locating its two metadata schemas.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ManifestError;

pub const DEFAULT_MANIFEST: &str = "pyproject.toml";

/// Which of the two overlapping metadata tables a value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Schema {
    /// `[project]`, the baseline.
    Modern,
    /// `[tool.poetry]`, checked against the baseline.
    Legacy,
}

impl Schema {
    pub const BOTH: [Schema; 2] = [Schema::Modern, Schema::Legacy];

    /// Dotted path of the table, e.g. `tool.poetry`.
    pub fn section(&self) -> &'static str {
        match self {
            Schema::Modern => "project",
            Schema::Legacy => "tool.poetry",
        }
    }

    fn path(&self) -> &'static [&'static str] {
        match self {
            Schema::Modern => &["project"],
            Schema::Legacy => &["tool", "poetry"],
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.section())
    }
}

/// A parsed manifest. Read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    origin: String,
    document: toml::Table,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = text.len(), "Manifest read");
        Self::parse(&text, path.display().to_string())
    }

    /// Parse manifest text; `origin` names the source in messages.
    pub fn parse(text: &str, origin: impl Into<String>) -> Result<Self, ManifestError> {
        let origin = origin.into();
        let document = toml::from_str::<toml::Table>(text).map_err(|source| {
            ManifestError::Parse {
                origin: origin.clone(),
                source,
            }
        })?;
        Ok(Self { origin, document })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The schema's table, if present and actually a table.
    pub fn section(&self, schema: Schema) -> Option<&toml::Table> {
        let mut current = &self.document;
        for key in schema.path() {
            current = current.get(*key)?.as_table()?;
        }
        Some(current)
    }

    pub fn require_section(&self, schema: Schema) -> Result<&toml::Table, ManifestError> {
        self.section(schema)
            .ok_or_else(|| ManifestError::MissingSection {
                origin: self.origin.clone(),
                section: schema.section(),
            })
    }

    /// `version` from `[project]`, falling back to `[tool.poetry]`.
    pub fn version(&self) -> Option<&str> {
        Schema::BOTH.iter().find_map(|&schema| {
            self.section(schema)?
                .get("version")
                .and_then(toml::Value::as_str)
        })
    }
}

/// Follow `path` through nested tables. A missing key or a non-table
/// intermediate resolves to `None`.
pub fn walk<'a>(section: &'a toml::Table, path: &[String]) -> Option<&'a toml::Value> {
    let (last, parents) = path.split_last()?;
    let mut current = section;
    for key in parents {
        current = current.get(key)?.as_table()?;
    }
    current.get(last)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[project]
name = "demo"
version = "1.2.3"

[tool.poetry]
name = "demo"

[tool.poetry.group.dev.dependencies]
pytest = "^8.0"
"#;

    #[test]
    fn test_sections_are_located() {
        let manifest = Manifest::parse(SAMPLE, "sample").unwrap();
        assert_eq!(manifest.origin(), "sample");
        assert!(manifest.section(Schema::Modern).unwrap().contains_key("version"));
        assert!(manifest.section(Schema::Legacy).unwrap().contains_key("group"));
        assert_eq!(manifest.version(), Some("1.2.3"));
    }

    #[test]
    fn test_missing_section() {
        let manifest = Manifest::parse("[project]\nname = \"x\"\n", "sample").unwrap();
        let err = manifest.require_section(Schema::Legacy).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MissingSection { section: "tool.poetry", .. }
        ));

        let manifest = Manifest::parse("tool = 3\n[project]\n", "sample").unwrap();
        assert!(manifest.section(Schema::Legacy).is_none());
    }

    #[test]
    fn test_parse_error() {
        let err = Manifest::parse("[project\nname = ", "broken.toml").unwrap_err();
        assert!(matches!(err, ManifestError::Parse { ref origin, .. } if origin == "broken.toml"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("pyproject.toml")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_walk() {
        let manifest = Manifest::parse(SAMPLE, "sample").unwrap();
        let poetry = manifest.section(Schema::Legacy).unwrap();
        let path = |parts: &[&str]| parts.iter().map(|p| p.to_string()).collect::<Vec<_>>();

        let leaf = walk(poetry, &path(&["group", "dev", "dependencies"])).unwrap();
        assert!(leaf.as_table().unwrap().contains_key("pytest"));
        assert!(walk(poetry, &path(&["group", "docs", "dependencies"])).is_none());
        assert!(walk(poetry, &path(&["name", "dev"])).is_none());
        assert!(walk(poetry, &[]).is_none());
    }

    #[test]
    fn test_version_falls_back_to_legacy() {
        let manifest =
            Manifest::parse("[project]\n[tool.poetry]\nversion = \"0.4.0\"\n", "sample").unwrap();
        assert_eq!(manifest.version(), Some("0.4.0"));
    }

    #[test]
    fn test_schema_display() {
        assert_eq!(Schema::Modern.to_string(), "[project]");
        assert_eq!(Schema::Legacy.to_string(), "[tool.poetry]");
    }
}
