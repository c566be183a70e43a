//! Run settings layered from flags, environment and config file.
//!
//! Flags and environment variables arrive together through clap; whatever
//! they leave unset is filled from the `[clibones]` table of the config file,
//! then from built-in defaults.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use clibones_common::LogLevel;
use clibones_common::LogLevelError;
use clibones_common::TelemetryConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::app::commands::Cli;
use crate::app::commands::OutputFormat;

const LOCAL_CONFIG: &str = ".clibonesrc";
const USER_CONFIG: &str = ".local/clibones.conf";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid loglevel in config file {path}: {source}")]
    LogLevel {
        path: PathBuf,
        #[source]
        source: LogLevelError,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    clibones: FileSettings,
}

/// Keys accepted in the `[clibones]` table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSettings {
    pub loglevel: Option<String>,
    pub logfile: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub no_color: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub level: LogLevel,
    pub log_file: Option<PathBuf>,
    pub format: OutputFormat,
    pub no_color: bool,
    /// Config file the defaults came from, if any.
    pub source: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(cli: &Cli) -> Result<Self, SettingsError> {
        let loaded = match &cli.config {
            Some(path) => Some((path.clone(), load_file(path)?)),
            None => discover(&default_locations())?,
        };
        let (source, file) = match loaded {
            Some((path, file)) => (Some(path), file),
            None => (None, FileSettings::default()),
        };

        let file_level = match (&file.loglevel, &source) {
            (Some(raw), Some(path)) => Some(raw.parse::<LogLevel>().map_err(|source| {
                SettingsError::LogLevel {
                    path: path.clone(),
                    source,
                }
            })?),
            _ => None,
        };

        Ok(Self {
            level: cli.requested_level().or(file_level).unwrap_or_default(),
            log_file: cli.logfile.clone().or(file.logfile),
            format: cli.requested_format().or(file.format).unwrap_or_default(),
            no_color: cli.no_color || file.no_color.unwrap_or(false),
            source,
        })
    }

    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            level: self.level,
            log_file: self.log_file.clone(),
        }
    }
}

fn load_file(path: &Path) -> Result<FileSettings, SettingsError> {
    let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ConfigFile = toml::from_str(&text).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(config.clibones)
}

/// First existing file among `candidates`. Missing files are skipped; one
/// that exists but cannot be loaded is an error.
fn discover(candidates: &[PathBuf]) -> Result<Option<(PathBuf, FileSettings)>, SettingsError> {
    for path in candidates {
        if path.is_file() {
            return load_file(path).map(|file| Some((path.clone(), file)));
        }
    }
    Ok(None)
}

fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(LOCAL_CONFIG)];
    if let Some(home) = home_dir() {
        locations.push(home.join(USER_CONFIG));
    }
    locations
}

fn home_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    if let Ok(home) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(home));
    }
    match (std::env::var("HOMEDRIVE"), std::env::var("HOMEPATH")) {
        (Ok(drive), Ok(path)) => Some(PathBuf::from(format!("{}{}", drive, path))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["clibones"];
        argv.extend_from_slice(args);
        argv.push("check");
        Cli::parse_from(argv)
    }

    #[test]
    fn test_file_fills_unset_values() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "clibones.conf",
            "[clibones]\nloglevel = \"warning\"\nformat = \"json\"\nno-color = true\n",
        );
        let path_arg = path.to_string_lossy().to_string();

        let settings = Settings::resolve(&cli(&["--config", &path_arg])).unwrap();
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(settings.no_color);
        assert_eq!(settings.source, Some(path.clone()));
        if std::env::var_os("CLIBONES_LOGLEVEL").is_none() {
            assert_eq!(settings.level, LogLevel::Warning);
        }

        let settings =
            Settings::resolve(&cli(&["--config", &path_arg, "--debug", "--format", "text"]))
                .unwrap();
        assert_eq!(settings.level, LogLevel::Debug);
        assert_eq!(settings.format, OutputFormat::Text);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "bad.conf", "[clibones]\nverbosity = 3\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));

        let path = write_config(&dir, "other.conf", "[elsewhere]\nloglevel = \"info\"\n");
        assert!(matches!(
            load_file(&path).unwrap_err(),
            SettingsError::Parse { .. }
        ));
    }

    #[test]
    fn test_invalid_file_loglevel() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "level.conf", "[clibones]\nloglevel = \"loud\"\n");
        let path_arg = path.to_string_lossy().to_string();
        let err = Settings::resolve(&cli(&["--config", &path_arg, "--quiet"])).unwrap_err();
        assert!(matches!(err, SettingsError::LogLevel { .. }));
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.conf");
        let err = load_file(&missing).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }

    #[test]
    fn test_discover_skips_missing_files() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("missing.conf");
        let second = write_config(&dir, "present.conf", "[clibones]\nlogfile = \"run.log\"\n");

        let (path, file) = discover(&[first, second.clone()]).unwrap().unwrap();
        assert_eq!(path, second);
        assert_eq!(file.logfile, Some(PathBuf::from("run.log")));

        assert!(discover(&[dir.path().join("nope")]).unwrap().is_none());
    }

    #[test]
    fn test_empty_config_file_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "empty.conf", "");
        assert_eq!(load_file(&path).unwrap(), FileSettings::default());
    }
}
