#![expect(clippy::print_stdout, reason = "CLI output is emitted here")]
#![expect(clippy::print_stderr, reason = "CLI output is emitted here")]

//! CLI output presenter.

use std::path::Path;

use clibones_common::Colors;
use serde::Serialize;

use crate::app::commands::OutputFormat;

const PROGRAM_NAME: &str = "clibones";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestSummary {
    pub path: String,
    pub problems: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub manifests: Vec<ManifestSummary>,
    pub total: usize,
}

impl CheckSummary {
    pub fn record(&mut self, path: &Path, problems: usize) {
        self.manifests.push(ManifestSummary {
            path: path.display().to_string(),
            problems,
        });
        self.total = self.total.saturating_add(problems);
    }
}

pub trait Presenter {
    fn present_summary(&self, summary: &CheckSummary);

    fn present_success(&self, message: &str);

    fn present_error(&self, message: &str);
}

pub struct TextPresenter;

fn problems_line(entry: &ManifestSummary) -> String {
    let count = format!("{} problems detected", entry.problems);
    let count = if entry.problems == 0 {
        Colors::success(&count)
    } else {
        Colors::error(&count)
    };
    format!("{}: {}", entry.path, count)
}

impl Presenter for TextPresenter {
    fn present_summary(&self, summary: &CheckSummary) {
        for entry in &summary.manifests {
            println!("{}", problems_line(entry));
        }
        if summary.manifests.len() > 1 {
            println!(
                "{} {} problems detected",
                Colors::bold("Total:"),
                summary.total
            );
        }
    }

    fn present_success(&self, message: &str) {
        println!("{} {}", Colors::success("✓"), message);
    }

    fn present_error(&self, message: &str) {
        eprintln!("{}: {} {}", PROGRAM_NAME, Colors::error("Error:"), message);
    }
}

pub struct JsonPresenter;

impl Presenter for JsonPresenter {
    fn present_summary(&self, summary: &CheckSummary) {
        println!(
            "{}",
            serde_json::to_string_pretty(summary).unwrap_or_default()
        );
    }

    fn present_success(&self, message: &str) {
        let output = serde_json::json!({
            "success": true,
            "message": message
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    }

    fn present_error(&self, message: &str) {
        let output = serde_json::json!({
            "success": false,
            "error": message
        });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    }
}

pub fn create_presenter(format: OutputFormat) -> Box<dyn Presenter> {
    match format {
        OutputFormat::Json => Box::new(JsonPresenter),
        OutputFormat::Text => Box::new(TextPresenter),
    }
}
