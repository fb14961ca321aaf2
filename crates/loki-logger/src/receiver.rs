//! Local receiver: the immediate pass-through sink for every log call.
//!
//! Queued entries are only shipped at flush time; the receiver sees each
//! message synchronously as it is logged, rendered with its MDC prefix. For
//! `warn` and `error` the raw classified error value rides along unmodified
//! for the receiver's own use.

use crate::error_value::ErrorValue;
use tracing::{debug, error, info, warn};

/// Consumer-side sink for immediate local logging.
pub trait LogReceiver: Send + Sync {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str, error: Option<&ErrorValue>);
    fn error(&self, message: &str, error: Option<&ErrorValue>);
}

/// Default receiver forwarding to the `tracing` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReceiver;

impl LogReceiver for TracingReceiver {
    fn debug(&self, message: &str) {
        debug!("{message}");
    }

    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn warn(&self, message: &str, error: Option<&ErrorValue>) {
        match error {
            Some(error) => warn!(error = ?error, "{message}"),
            None => warn!("{message}"),
        }
    }

    fn error(&self, message: &str, error: Option<&ErrorValue>) {
        match error {
            Some(error) => error!(error = ?error, "{message}"),
            None => error!("{message}"),
        }
    }
}
