#![deny(clippy::all)]

mod color;
pub mod interrupt;
pub mod telemetry;

pub use color::Colors;
pub use color::init as color_init;
pub use interrupt::InterruptError;
pub use interrupt::InterruptHandler;
pub use telemetry::LogLevel;
pub use telemetry::LogLevelError;
pub use telemetry::TelemetryConfig;
pub use telemetry::TelemetryGuard;
