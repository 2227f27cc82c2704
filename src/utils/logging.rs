//! Logging setup plus conditional logging macros that check a module-level
//! `ENABLE_LOGS` flag.
//!
//! Usage:
//! ```ignore
//! // In your module, define the flag first:
//! const ENABLE_LOGS: bool = true;
//!
//! // Then use the macros (they're exported at the crate root):
//! use crate::{log_info, log_warn, log_error};
//!
//! log_info!("This will log if ENABLE_LOGS is true");
//! ```

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize `env_logger` once for the process.
///
/// `RUST_LOG` still wins over `default_level`.
pub fn init_logging(default_level: log::LevelFilter) {
    INIT.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(default_level)
            .parse_default_env()
            .try_init();
    });
}

/// Macro for conditional info logging.
///
/// Each module that uses this macro must define:
/// ```ignore
/// const ENABLE_LOGS: bool = true; // or false
/// ```
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Macro for conditional debug logging. Same `ENABLE_LOGS` contract as `log_info!`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// Macro for conditional warn logging.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Macro for error logging.
///
/// Transport failures must always leave a trace, so this one ignores
/// `ENABLE_LOGS` and only requires the const to exist for symmetry.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        {
            let _ = ENABLE_LOGS;
            log::error!($($arg)*);
        }
    };
}
