//! Typed field values and their canonical, comparable forms.
//!
//! Raw TOML is converted into [`FieldValue`] once, at the parse boundary.
//! The canonicalizers then pattern-match on these shapes instead of
//! inspecting TOML types while comparing.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::debug;

use crate::table::ComparatorKind;
use crate::version::translate_constraint;

/// An author or maintainer in either schema's shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AuthorEntry {
    /// `"Jane Doe <jane@example.com>"`
    Formatted(String),
    /// `{ name = "Jane Doe", email = "jane@example.com" }`, either key optional
    Structured {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

impl AuthorEntry {
    /// The `"Name <email>"` form, dropping whichever half is absent.
    pub fn formatted(&self) -> String {
        match self {
            AuthorEntry::Formatted(text) => text.clone(),
            AuthorEntry::Structured { name, email } => match (name, email) {
                (Some(name), Some(email)) => format!("{name} <{email}>"),
                (Some(name), None) => name.clone(),
                (None, Some(email)) => format!("<{email}>"),
                (None, None) => String::new(),
            },
        }
    }
}

/// One entry of a poetry dependency table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LegacyConstraint {
    /// `requests = "^2.31"`
    Version(String),
    /// `uvicorn = { version = "^0.23", extras = ["standard"] }`
    Detailed {
        #[serde(default)]
        version: Option<String>,
        #[serde(default)]
        extras: Vec<String>,
    },
    /// Multiple-constraint lists and anything else poetry accepts that has
    /// no single PEP 508 rendering.
    Unrecognized(toml::Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Dependencies {
    /// `[project]` style: `["requests>=2.31", ...]`
    Pep508(Vec<String>),
    /// `[tool.poetry]` style: `{ requests = "^2.31", ... }`
    Legacy(BTreeMap<String, LegacyConstraint>),
}

impl Dependencies {
    pub fn empty() -> Self {
        Dependencies::Legacy(BTreeMap::new())
    }
}

/// A classified field value, shaped according to its [`ComparatorKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Verbatim(toml::Value),
    Strings(Vec<String>),
    Authors(Vec<AuthorEntry>),
    Dependencies(Dependencies),
}

impl FieldValue {
    pub fn from_raw(kind: ComparatorKind, raw: &toml::Value) -> Result<Self, toml::de::Error> {
        Ok(match kind {
            ComparatorKind::Verbatim => FieldValue::Verbatim(raw.clone()),
            ComparatorKind::Set => FieldValue::Strings(raw.clone().try_into()?),
            ComparatorKind::Authors => FieldValue::Authors(raw.clone().try_into()?),
            ComparatorKind::Dependencies => FieldValue::Dependencies(raw.clone().try_into()?),
        })
    }

    pub fn canonical(&self) -> Canonical {
        match self {
            FieldValue::Verbatim(value) => canonical_string(value),
            FieldValue::Strings(values) => Canonical::Set(canonical_set(values)),
            FieldValue::Authors(entries) => Canonical::Set(canonical_authors(entries)),
            FieldValue::Dependencies(deps) => Canonical::Set(canonical_dependencies(deps)),
        }
    }
}

/// Normalized form two differently-shaped values are compared in.
#[derive(Debug, Clone, PartialEq)]
pub enum Canonical {
    Verbatim(toml::Value),
    Set(BTreeSet<String>),
}

pub fn canonical_string(value: &toml::Value) -> Canonical {
    Canonical::Verbatim(value.clone())
}

pub fn canonical_set(values: &[String]) -> BTreeSet<String> {
    values.iter().cloned().collect()
}

pub fn canonical_authors(entries: &[AuthorEntry]) -> BTreeSet<String> {
    entries.iter().map(AuthorEntry::formatted).collect()
}

fn render_legacy(name: &str, constraint: &LegacyConstraint) -> Option<String> {
    match constraint {
        LegacyConstraint::Version(version) => {
            Some(format!("{name}{}", translate_constraint(version)))
        }
        LegacyConstraint::Detailed { version, extras } => {
            let extras = if extras.is_empty() {
                String::new()
            } else {
                format!("[{}]", extras.join(","))
            };
            let range = version.as_deref().map(translate_constraint).unwrap_or_default();
            Some(format!("{name}{extras}{range}"))
        }
        LegacyConstraint::Unrecognized(value) => {
            debug!(dependency = name, value = %value, "Skipping dependency without a PEP 508 form");
            None
        }
    }
}

pub fn canonical_dependencies(deps: &Dependencies) -> BTreeSet<String> {
    match deps {
        Dependencies::Pep508(specs) => specs.iter().cloned().collect(),
        Dependencies::Legacy(table) => table
            .iter()
            .filter_map(|(name, constraint)| render_legacy(name, constraint))
            .collect(),
    }
}
