//! Generation of a package `__init__.py` carrying the project version and
//! the README as the module docstring.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::manifest::Manifest;
use crate::manifest::Schema;

const HEADER: &str = "\
# This file is generated by `clibones module-init`.
# DO NOT MANUALLY EDIT THIS FILE!  Edit the README.md file instead.
#
# __version__  set to the application's version from the pyproject.toml file.
# __doc__      set to the contents of the project's README.md file.
";

#[derive(Error, Debug)]
pub enum ModuleInitError {
    #[error("Package directory {0} does not exist or is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to read README {path}: {source}")]
    ReadReadme {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Manifest {0} declares no version")]
    MissingVersion(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn python_string_body(text: &str) -> String {
    text.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"")
}

/// Contents of the generated `__init__.py`.
pub fn render_init_py(readme: &str, version: &str) -> String {
    let version = version.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "{HEADER}\n__version__ = '{version}'\n__doc__ = \"\"\"\n{}\"\"\"\n",
        python_string_body(readme)
    )
}

/// The `[tool.poetry]` version, falling back to `[project]`.
fn package_version(manifest: &Manifest) -> Option<&str> {
    manifest
        .section(Schema::Legacy)
        .and_then(|poetry| poetry.get("version"))
        .and_then(toml::Value::as_str)
        .or_else(|| manifest.version())
}

/// Write `<package_dir>/__init__.py`, replacing any existing file.
pub fn generate_module_init(
    package_dir: &Path,
    readme_path: &Path,
    manifest: &Manifest,
) -> Result<PathBuf, ModuleInitError> {
    if !package_dir.is_dir() {
        return Err(ModuleInitError::NotADirectory(package_dir.to_path_buf()));
    }

    let version = package_version(manifest)
        .ok_or_else(|| ModuleInitError::MissingVersion(manifest.origin().to_string()))?;
    let readme = fs::read_to_string(readme_path).map_err(|source| ModuleInitError::ReadReadme {
        path: readme_path.to_path_buf(),
        source,
    })?;

    let output = package_dir.join("__init__.py");
    fs::write(&output, render_init_py(&readme, version)).map_err(|source| {
        ModuleInitError::Write {
            path: output.clone(),
            source,
        }
    })?;

    info!(path = %output.display(), version, "Module init generated");
    Ok(output)
}
