#![expect(clippy::print_stdout, reason = "CLI output is emitted here")]

//! CLI application layer and composition root wiring.

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use std::io;
use std::path::Path;
use std::path::PathBuf;

pub mod commands;
pub mod error;
pub mod presenter;
pub mod settings;

use clibones_common::InterruptError;
use clibones_common::InterruptHandler;
use clibones_common::color_init;
use clibones_common::telemetry;
use clibones_manifest::BuildBackend;
use clibones_manifest::BuildSystemError;
use clibones_manifest::DEFAULT_MANIFEST;
use clibones_manifest::FieldTable;
use clibones_manifest::Manifest;
use clibones_manifest::ManifestError;
use clibones_manifest::ModuleInitError;
use clibones_manifest::TracingSink;
use clibones_manifest::generate_module_init;
use clibones_manifest::reconcile;
use clibones_manifest::swap_build_system;
use tracing::debug;
use tracing::info_span;
use tracing::warn;

use crate::app::commands::Cli;
use crate::app::commands::Commands;
use crate::app::commands::OutputFormat;
use crate::app::error::CliError;
use crate::app::error::MissingCommand;
use crate::app::presenter::CheckSummary;
use crate::app::presenter::Presenter;
use crate::app::presenter::create_presenter;
use crate::app::settings::Settings;
use crate::app::settings::SettingsError;

const LONG_HELP: &str = include_str!("../../README.md");

/// Exit codes following sysexits.h.
///
/// `check` exits with its problem count, so only fatal errors use these.
mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const USAGE: i32 = 64;
    pub const DATAERR: i32 = 65;
    pub const NOINPUT: i32 = 66;
    pub const OSERR: i32 = 71;
    pub const IOERR: i32 = 74;
    /// 128 + SIGINT
    pub const INTERRUPTED: i32 = 130;
    pub const MAX_STATUS: i32 = 255;
}

pub struct Application;

impl Application {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self) -> Result<i32> {
        let exit_code = match self.execute() {
            Ok(code) => code,
            Err(e) => self.handle_error(e),
        };
        Ok(exit_code)
    }

    fn execute(&self) -> Result<i32> {
        let cli = match Cli::try_parse() {
            Ok(cli) => cli,
            Err(err) => return Ok(handle_parse_error(err)),
        };

        if cli.longhelp {
            println!("{}", LONG_HELP.trim_end());
            return Ok(exit_codes::SUCCESS);
        }

        let early_format = cli.requested_format().unwrap_or_default();
        let settings = Settings::resolve(&cli)
            .map_err(|e| self.wrap_error(e.into(), early_format))
            .context("failed to load settings")?;
        let format = settings.format;

        let _telemetry = telemetry::init_tracing(&settings.telemetry());
        color_init(settings.no_color);
        debug!(
            command = ?cli.command,
            format = ?format,
            level = %settings.level,
            config = ?settings.source,
            "CLI command parsed"
        );

        let presenter = create_presenter(format);
        let Some(command) = &cli.command else {
            return Err(self.wrap_error(MissingCommand.into(), format));
        };

        self.dispatch_command(command, presenter.as_ref())
            .map_err(|e| self.wrap_error(e, format))
    }

    fn dispatch_command(&self, command: &Commands, presenter: &dyn Presenter) -> Result<i32> {
        match command {
            Commands::Check { manifests } => self.check(manifests, presenter),
            Commands::SwapBuildSystem { backend, manifest } => {
                self.swap(*backend, manifest, presenter)
            }
            Commands::ModuleInit {
                package_dir,
                readme,
                manifest,
            } => self.module_init(package_dir, readme, manifest, presenter),
        }
    }

    fn check(&self, manifests: &[PathBuf], presenter: &dyn Presenter) -> Result<i32> {
        let default = [PathBuf::from(DEFAULT_MANIFEST)];
        let paths = if manifests.is_empty() {
            &default[..]
        } else {
            manifests
        };

        let mut interrupt =
            InterruptHandler::capture().context("failed to install interrupt handler")?;
        let table = FieldTable::pyproject();
        let mut summary = CheckSummary::default();
        let mut interrupted = false;

        for (index, path) in paths.iter().enumerate() {
            let span = info_span!("check", manifest = %path.display());
            let _entered = span.enter();

            let manifest = Manifest::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            let problems = reconcile(&manifest, &table, &mut TracingSink)
                .with_context(|| format!("failed to check {}", path.display()))?;
            debug!(problems, "Manifest checked");
            summary.record(path, problems);

            if interrupt.is_interrupted() {
                warn!(
                    skipped = paths.len() - index - 1,
                    "Interrupted; stopping after current manifest"
                );
                interrupted = true;
                break;
            }
        }
        interrupt.release();

        presenter.present_summary(&summary);
        if interrupted {
            return Ok(exit_codes::INTERRUPTED);
        }
        Ok(problem_status(summary.total))
    }

    fn swap(
        &self,
        backend: BuildBackend,
        manifest: &Path,
        presenter: &dyn Presenter,
    ) -> Result<i32> {
        swap_build_system(manifest, backend).with_context(|| {
            format!(
                "failed to switch {} to the {} backend",
                manifest.display(),
                backend
            )
        })?;
        presenter.present_success(&format!(
            "Build system of {} switched to {}",
            manifest.display(),
            backend
        ));
        Ok(exit_codes::SUCCESS)
    }

    fn module_init(
        &self,
        package_dir: &Path,
        readme: &Path,
        manifest: &Path,
        presenter: &dyn Presenter,
    ) -> Result<i32> {
        let loaded = Manifest::load(manifest)
            .with_context(|| format!("failed to load {}", manifest.display()))?;
        let output = generate_module_init(package_dir, readme, &loaded).with_context(|| {
            format!("failed to generate module init in {}", package_dir.display())
        })?;
        presenter.present_success(&format!("Wrote {}", output.display()));
        Ok(exit_codes::SUCCESS)
    }

    fn handle_error(&self, e: anyhow::Error) -> i32 {
        if let Some(cli_error) = find_error::<CliError>(&e) {
            create_presenter(cli_error.format).present_error(&cli_error.message);
            return cli_error.exit_code;
        }
        create_presenter(OutputFormat::Text).present_error(&format!("{e:#}"));
        exit_codes::GENERAL_ERROR
    }

    fn wrap_error(&self, error: anyhow::Error, format: OutputFormat) -> anyhow::Error {
        if find_error::<CliError>(&error).is_some() {
            return error;
        }
        let exit_code = exit_code_for(&error);
        anyhow::Error::new(CliError::new(format, format!("{error:#}"), exit_code))
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

fn handle_parse_error(err: clap::Error) -> i32 {
    let _ = err.print();
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit_codes::SUCCESS,
        _ => exit_codes::USAGE,
    }
}

fn find_error<T: std::error::Error + 'static>(error: &anyhow::Error) -> Option<&T> {
    error.chain().find_map(|source| source.downcast_ref::<T>())
}

fn is_not_found(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::NotFound
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    if let Some(manifest_error) = find_error::<ManifestError>(error) {
        return if manifest_error.is_not_found() {
            exit_codes::NOINPUT
        } else if manifest_error.is_unparseable() {
            exit_codes::DATAERR
        } else {
            exit_codes::IOERR
        };
    }
    if let Some(build_error) = find_error::<BuildSystemError>(error) {
        return if build_error.is_not_found() {
            exit_codes::NOINPUT
        } else if build_error.is_unparseable() {
            exit_codes::DATAERR
        } else {
            exit_codes::IOERR
        };
    }
    if let Some(init_error) = find_error::<ModuleInitError>(error) {
        return match init_error {
            ModuleInitError::NotADirectory(_) => exit_codes::NOINPUT,
            ModuleInitError::ReadReadme { source, .. } if is_not_found(source) => {
                exit_codes::NOINPUT
            }
            ModuleInitError::MissingVersion(_) => exit_codes::DATAERR,
            ModuleInitError::ReadReadme { .. } | ModuleInitError::Write { .. } => {
                exit_codes::IOERR
            }
        };
    }
    if find_error::<SettingsError>(error).is_some() || find_error::<MissingCommand>(error).is_some()
    {
        return exit_codes::USAGE;
    }
    if find_error::<InterruptError>(error).is_some() {
        return exit_codes::OSERR;
    }
    exit_codes::GENERAL_ERROR
}

/// Exit status for a problem count, capped so it never wraps to 0.
fn problem_status(total: usize) -> i32 {
    i32::try_from(total)
        .unwrap_or(exit_codes::MAX_STATUS)
        .min(exit_codes::MAX_STATUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_status_saturates() {
        assert_eq!(problem_status(0), exit_codes::SUCCESS);
        assert_eq!(problem_status(3), 3);
        assert_eq!(problem_status(255), 255);
        assert_eq!(problem_status(256), 255);
        assert_eq!(problem_status(usize::MAX), 255);
    }

    #[test]
    fn test_manifest_errors_map_to_sysexits() {
        let missing = anyhow::Error::new(ManifestError::Read {
            path: PathBuf::from("pyproject.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        })
        .context("failed to load pyproject.toml");
        assert_eq!(exit_code_for(&missing), exit_codes::NOINPUT);

        let denied = anyhow::Error::new(ManifestError::Read {
            path: PathBuf::from("pyproject.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        });
        assert_eq!(exit_code_for(&denied), exit_codes::IOERR);

        let unparseable = Manifest::parse("[project", "broken.toml").unwrap_err();
        assert_eq!(
            exit_code_for(&anyhow::Error::new(unparseable)),
            exit_codes::DATAERR
        );
    }

    #[test]
    fn test_other_errors_map_to_sysexits() {
        assert_eq!(
            exit_code_for(&anyhow::Error::new(MissingCommand)),
            exit_codes::USAGE
        );
        assert_eq!(
            exit_code_for(&anyhow::Error::new(ModuleInitError::MissingVersion(
                "pyproject.toml".into()
            ))),
            exit_codes::DATAERR
        );
        assert_eq!(
            exit_code_for(&anyhow::anyhow!("something else")),
            exit_codes::GENERAL_ERROR
        );
    }

    #[test]
    fn test_wrap_error_keeps_context_and_code() {
        let app = Application::new();
        let error = anyhow::Error::new(ModuleInitError::NotADirectory(PathBuf::from("pkg")))
            .context("failed to generate module init in pkg");
        let wrapped = app.wrap_error(error, OutputFormat::Json);
        let cli_error = find_error::<CliError>(&wrapped).unwrap();
        assert_eq!(cli_error.exit_code, exit_codes::NOINPUT);
        assert_eq!(cli_error.format, OutputFormat::Json);
        assert!(cli_error.message.starts_with("failed to generate module init in pkg: "));

        let again = app.wrap_error(wrapped, OutputFormat::Text);
        assert_eq!(find_error::<CliError>(&again).unwrap().format, OutputFormat::Json);
    }
}
