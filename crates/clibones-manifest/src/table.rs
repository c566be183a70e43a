//! Field classification: which comparator applies to which field.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// Equivalence rule used to compare one field across both schemas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComparatorKind {
    /// Compared as-is.
    Verbatim,
    /// List of strings compared as a set.
    Set,
    /// `"Name <email>"` strings or `{name, email}` tables, compared as a set.
    Authors,
    /// PEP 508 strings or a poetry dependency table, compared as a set.
    Dependencies,
}

impl ComparatorKind {
    /// Order in which groups are checked.
    pub const ALL: [ComparatorKind; 4] = [
        ComparatorKind::Verbatim,
        ComparatorKind::Set,
        ComparatorKind::Authors,
        ComparatorKind::Dependencies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verbatim => "string",
            Self::Set => "string list",
            Self::Authors => "author list",
            Self::Dependencies => "dependency",
        }
    }
}

impl fmt::Display for ComparatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields stored under different paths in each schema, one entry per group:
/// `<modern_container>.<group>` against `<legacy_container>.<group>.<legacy_leaf>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRule {
    pub modern_container: String,
    pub legacy_container: String,
    pub legacy_leaf: String,
}

impl GroupRule {
    pub fn modern_path(&self, group: &str) -> Vec<String> {
        vec![self.modern_container.clone(), group.to_string()]
    }

    pub fn legacy_path(&self, group: &str) -> Vec<String> {
        vec![
            self.legacy_container.clone(),
            group.to_string(),
            self.legacy_leaf.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Field '{0}' is already classified")]
pub struct DuplicateField(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub name: String,
    pub kind: ComparatorKind,
}

/// Static partition of field names into comparator groups.
///
/// A name is classified at most once, and never collides with the
/// containers of the group rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTable {
    rules: Vec<FieldRule>,
    groups: GroupRule,
}

const PYPROJECT_FIELDS: &[(&str, ComparatorKind)] = &[
    ("name", ComparatorKind::Verbatim),
    ("description", ComparatorKind::Verbatim),
    ("readme", ComparatorKind::Verbatim),
    ("version", ComparatorKind::Verbatim),
    ("scripts", ComparatorKind::Verbatim),
    ("urls", ComparatorKind::Verbatim),
    ("keywords", ComparatorKind::Set),
    ("classifiers", ComparatorKind::Set),
    ("authors", ComparatorKind::Authors),
    ("maintainers", ComparatorKind::Authors),
    ("dependencies", ComparatorKind::Dependencies),
];

impl FieldTable {
    pub fn new(groups: GroupRule) -> Self {
        Self {
            rules: Vec::new(),
            groups,
        }
    }

    /// Classification for `[project]` against `[tool.poetry]`.
    pub fn pyproject() -> Self {
        Self {
            rules: PYPROJECT_FIELDS
                .iter()
                .map(|&(name, kind)| FieldRule {
                    name: name.to_string(),
                    kind,
                })
                .collect(),
            groups: GroupRule {
                modern_container: "optional-dependencies".to_string(),
                legacy_container: "group".to_string(),
                legacy_leaf: "dependencies".to_string(),
            },
        }
    }

    pub fn with_field(
        mut self,
        name: impl Into<String>,
        kind: ComparatorKind,
    ) -> Result<Self, DuplicateField> {
        let name = name.into();
        if self.checked_names().contains(name.as_str()) {
            return Err(DuplicateField(name));
        }
        self.rules.push(FieldRule { name, kind });
        Ok(self)
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn groups(&self) -> &GroupRule {
        &self.groups
    }

    /// Field names of one group, in declaration order.
    pub fn fields_of(&self, kind: ComparatorKind) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(move |rule| rule.kind == kind)
            .map(|rule| rule.name.as_str())
    }

    pub fn kind_of(&self, name: &str) -> Option<ComparatorKind> {
        self.rules
            .iter()
            .find(|rule| rule.name == name)
            .map(|rule| rule.kind)
    }

    /// Every top-level name some check looks at, group containers included.
    pub fn checked_names(&self) -> BTreeSet<&str> {
        self.rules
            .iter()
            .map(|rule| rule.name.as_str())
            .chain([
                self.groups.modern_container.as_str(),
                self.groups.legacy_container.as_str(),
            ])
            .collect()
    }
}

impl Default for FieldTable {
    fn default() -> Self {
        Self::pyproject()
    }
}
