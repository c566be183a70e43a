//! Terminal color helpers for the summary printed on stdout.

use std::io::IsTerminal;
use std::sync::OnceLock;

static NO_COLOR: OnceLock<bool> = OnceLock::new();

/// Decide once per process whether summaries are colored.
pub fn init(no_color_flag: bool) {
    let _ = NO_COLOR.set(
        no_color_flag
            || no_color_env(std::env::var_os("NO_COLOR"))
            || !std::io::stdout().is_terminal(),
    );
}

/// `NO_COLOR` counts only when set to a non-empty value.
fn no_color_env(value: Option<std::ffi::OsString>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

pub fn is_disabled() -> bool {
    *NO_COLOR.get().unwrap_or(&false)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tone {
    Green,
    Red,
    Bold,
}

impl Tone {
    fn code(self) -> &'static str {
        match self {
            Tone::Green => "\x1b[32m",
            Tone::Red => "\x1b[31m",
            Tone::Bold => "\x1b[1m",
        }
    }
}

const RESET: &str = "\x1b[0m";

fn paint(text: &str, tone: Tone) -> String {
    if is_disabled() {
        return text.to_string();
    }
    format!("{}{}{}", tone.code(), text, RESET)
}

pub struct Colors;

impl Colors {
    pub fn success(text: &str) -> String {
        paint(text, Tone::Green)
    }

    pub fn error(text: &str) -> String {
        paint(text, Tone::Red)
    }

    pub fn bold(text: &str) -> String {
        paint(text, Tone::Bold)
    }
}
