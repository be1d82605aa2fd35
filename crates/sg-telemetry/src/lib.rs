//! # Swapgate Telemetry
//!
//! Logging setup shared by swapgate binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sg_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SG_SERVICE_NAME` | `swapgate` | Service name in log lines |
//! | `SG_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `SG_CONSOLE_OUTPUT` | `true` | Write logs to the console |
//! | `SG_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `SG_NETWORK` | `testnet` | Network name |

#![warn(missing_docs)]

mod config;
mod logging;
mod subscriber;

pub use config::TelemetryConfig;
pub use subscriber::{build_filter, init_logging, LoggingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// A global subscriber is already installed, or installation failed.
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    /// Configuration rejected.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
