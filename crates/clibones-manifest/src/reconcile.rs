//! Field-by-field reconciliation of `[project]` against `[tool.poetry]`.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use tracing::debug;

use crate::error::ManifestError;
use crate::fields::Dependencies;
use crate::fields::FieldValue;
use crate::fields::canonical_dependencies;
use crate::finding::Finding;
use crate::finding::FindingSink;
use crate::manifest::Manifest;
use crate::manifest::Schema;
use crate::manifest::walk;
use crate::table::ComparatorKind;
use crate::table::FieldTable;

const LICENSE_NOTE: &str = "License tables differ structurally between [project] and \
                            [tool.poetry]; keep them in sync by hand";

#[derive(Debug, Clone)]
struct PreparedField {
    raw: toml::Value,
    value: FieldValue,
}

/// One optional-dependency group, resolved on both sides.
#[derive(Debug, Clone)]
struct PreparedGroup {
    name: String,
    modern_path: String,
    legacy_path: String,
    modern: Dependencies,
    legacy: Dependencies,
}

/// A manifest whose classified fields have all been shape-checked.
///
/// Preparation is the only fallible step; once built, [`check`] reports
/// findings and never fails.
///
/// [`check`]: PreparedManifest::check
#[derive(Debug)]
pub struct PreparedManifest<'t> {
    table: &'t FieldTable,
    modern: BTreeMap<String, PreparedField>,
    legacy: BTreeMap<String, PreparedField>,
    groups: Vec<PreparedGroup>,
    unchecked: Vec<(Schema, Vec<String>)>,
}

impl<'t> PreparedManifest<'t> {
    pub fn prepare(manifest: &Manifest, table: &'t FieldTable) -> Result<Self, ManifestError> {
        let modern_section = manifest.require_section(Schema::Modern)?;
        let legacy_section = manifest.require_section(Schema::Legacy)?;
        let origin = manifest.origin();

        let modern = prepare_fields(origin, Schema::Modern, modern_section, table)?;
        let legacy = prepare_fields(origin, Schema::Legacy, legacy_section, table)?;

        let rule = table.groups();
        let mut names = BTreeSet::new();
        for (section, container) in [
            (modern_section, &rule.modern_container),
            (legacy_section, &rule.legacy_container),
        ] {
            if let Some(groups) = section.get(container).and_then(toml::Value::as_table) {
                names.extend(groups.keys().cloned());
            }
        }

        let mut groups = Vec::with_capacity(names.len());
        for name in &names {
            let modern_path = rule.modern_path(name);
            let legacy_path = rule.legacy_path(name);
            groups.push(PreparedGroup {
                name: name.clone(),
                modern: prepare_group(origin, Schema::Modern, modern_section, &modern_path)?,
                legacy: prepare_group(origin, Schema::Legacy, legacy_section, &legacy_path)?,
                modern_path: modern_path.join("."),
                legacy_path: legacy_path.join("."),
            });
        }

        let checked = table.checked_names();
        let unchecked = [(Schema::Modern, modern_section), (Schema::Legacy, legacy_section)]
            .into_iter()
            .map(|(schema, section)| {
                let mut names: Vec<String> = section
                    .keys()
                    .filter(|name| !checked.contains(name.as_str()))
                    .cloned()
                    .collect();
                names.sort();
                (schema, names)
            })
            .collect();

        debug!(
            origin,
            modern = modern.len(),
            legacy = legacy.len(),
            groups = groups.len(),
            "Manifest prepared"
        );

        Ok(Self {
            table,
            modern,
            legacy,
            groups,
            unchecked,
        })
    }

    fn field(&self, schema: Schema, name: &str) -> Option<&PreparedField> {
        match schema {
            Schema::Modern => self.modern.get(name),
            Schema::Legacy => self.legacy.get(name),
        }
    }

    /// Group names under either container, sorted.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.name.as_str())
    }

    /// Symmetric check of every field in one comparator group.
    pub fn check_fields(&self, kind: ComparatorKind, sink: &mut dyn FindingSink) -> usize {
        let mut problems = 0;

        for name in self.table.fields_of(kind) {
            let field = name.to_string();
            match (
                self.field(Schema::Modern, name),
                self.field(Schema::Legacy, name),
            ) {
                (None, None) => sink.record(Finding::MissingField { field }),
                (Some(modern), Some(legacy)) => {
                    if modern.value.canonical() == legacy.value.canonical() {
                        sink.record(Finding::Match { field });
                    } else {
                        problems += 1;
                        sink.record(Finding::ValueMismatch {
                            field,
                            modern: modern.raw.to_string(),
                            legacy: legacy.raw.to_string(),
                        });
                    }
                }
                (Some(only), None) | (None, Some(only)) => {
                    let present_in = if self.modern.contains_key(name) {
                        Schema::Modern
                    } else {
                        Schema::Legacy
                    };
                    problems += 1;
                    sink.record(Finding::AsymmetricPresence {
                        field,
                        present_in,
                        value: only.raw.to_string(),
                    });
                }
            }
        }

        if kind == ComparatorKind::Dependencies && problems > 0 {
            for name in self.table.fields_of(kind) {
                for schema in Schema::BOTH {
                    if let Some(field) = self.field(schema, name) {
                        debug!(
                            field = name,
                            schema = %schema,
                            canonical = ?field.value.canonical(),
                            "Canonical dependencies"
                        );
                    }
                }
            }
        }

        debug!(kind = %kind, problems, "Field group checked");
        problems
    }

    /// Structural check of every optional-dependency group.
    pub fn check_groups(&self, sink: &mut dyn FindingSink) -> usize {
        let mut problems = 0;
        for group in &self.groups {
            let modern = canonical_dependencies(&group.modern);
            let legacy = canonical_dependencies(&group.legacy);
            if modern != legacy {
                problems += 1;
                debug!(path = %group.modern_path, canonical = ?modern, "Canonical dependencies");
                debug!(path = %group.legacy_path, canonical = ?legacy, "Canonical dependencies");
                sink.record(Finding::StructuralMismatch {
                    modern_path: group.modern_path.clone(),
                    legacy_path: group.legacy_path.clone(),
                });
            }
        }
        problems
    }

    /// Runs every check in order and returns the total problem count.
    pub fn check(&self, sink: &mut dyn FindingSink) -> usize {
        let mut problems = 0;
        for kind in ComparatorKind::ALL {
            problems += self.check_fields(kind, sink);
        }
        problems += self.check_groups(sink);

        for (schema, fields) in &self.unchecked {
            sink.record(Finding::Unchecked {
                schema: *schema,
                fields: fields.clone(),
            });
        }
        sink.record(Finding::Note(LICENSE_NOTE.to_string()));

        problems
    }
}

fn prepare_fields(
    origin: &str,
    schema: Schema,
    section: &toml::Table,
    table: &FieldTable,
) -> Result<BTreeMap<String, PreparedField>, ManifestError> {
    let mut prepared = BTreeMap::new();
    for rule in table.rules() {
        let Some(raw) = section.get(&rule.name) else {
            continue;
        };
        let value = FieldValue::from_raw(rule.kind, raw).map_err(|err| ManifestError::FieldShape {
            origin: origin.to_string(),
            section: schema.section(),
            field: rule.name.clone(),
            expected: rule.kind.as_str(),
            reason: err.message().to_string(),
        })?;
        prepared.insert(
            rule.name.clone(),
            PreparedField {
                raw: raw.clone(),
                value,
            },
        );
    }
    Ok(prepared)
}

fn prepare_group(
    origin: &str,
    schema: Schema,
    section: &toml::Table,
    path: &[String],
) -> Result<Dependencies, ManifestError> {
    let Some(raw) = walk(section, path) else {
        return Ok(Dependencies::empty());
    };
    raw.clone()
        .try_into()
        .map_err(|err: toml::de::Error| ManifestError::FieldShape {
            origin: origin.to_string(),
            section: schema.section(),
            field: path.join("."),
            expected: ComparatorKind::Dependencies.as_str(),
            reason: err.message().to_string(),
        })
}

/// Reconcile both schemas of `manifest`, reporting every finding to `sink`.
///
/// Returns the number of problems; zero means the schemas agree.
pub fn reconcile(
    manifest: &Manifest,
    table: &FieldTable,
    sink: &mut dyn FindingSink,
) -> Result<usize, ManifestError> {
    let prepared = PreparedManifest::prepare(manifest, table)?;
    Ok(prepared.check(sink))
}
