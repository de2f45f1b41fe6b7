//! Crate-internal logging macros.
//!
//! With the `logging` feature these forward to `tracing`; without it they
//! expand to nothing, so the library carries no logging dependency.
//!
//! ```rust,ignore
//! use crate::logging::{debug, info};
//!
//! info!(keys = listed.len(), "listed store keys");
//! debug!(key = %key, "reading value");
//! ```

#[cfg(feature = "logging")]
macro_rules! export_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! export_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! export_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! export_info {
    ($($arg:tt)*) => {};
}

/// Unexpected but recoverable conditions, e.g. a key vanishing mid-export.
#[cfg(feature = "logging")]
macro_rules! export_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) }
}

#[cfg(not(feature = "logging"))]
macro_rules! export_warn {
    ($($arg:tt)*) => {};
}

pub(crate) use export_debug as debug;
pub(crate) use export_info as info;
pub(crate) use export_warn as warn;
