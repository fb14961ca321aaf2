//! Buffered client-side logging with batched delivery to Grafana Loki.
//!
//! Log calls append to an in-memory queue and echo to a local receiver
//! immediately; a single [`Logger::flush`] at the end of the unit of work
//! ships the whole queue as one `POST /loki/api/v1/push` request. Every line
//! carries an ordered key/value prefix (the MDC) and a `level=` tag.
//!
//! ```no_run
//! use loki_logger::{ErrorValue, Logger, LoggerConfig};
//! use std::collections::BTreeMap;
//!
//! # async fn handle_request() -> Result<(), loki_logger::ShippingError> {
//! let logger = Logger::new(LoggerConfig {
//!     loki_secret: "base64-user-token".to_string(),
//!     stream: BTreeMap::from([("environment".to_string(), "production".to_string())]),
//!     ..LoggerConfig::default()
//! });
//!
//! logger.mdc_set("request_id", "abc123");
//! logger.info("handling request");
//! logger.error("lookup failed", Some(&ErrorValue::from("timeout")));
//! logger.flush().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Delivery is deliberately minimal: one batch per flush, no retry, no
//! level filtering, no compression. The transport, receiver, timestamp
//! source, and deferred-completion hook are all injectable through
//! [`LoggerConfig`].

pub mod clock;
pub mod error_value;
pub mod logger;
pub mod mdc;
pub mod payload;
pub mod receiver;
pub mod registrar;
pub mod transport;

pub use error_value::{format_error_to_string, ErrorValue};
pub use logger::{Level, LogEntry, Logger, LoggerConfig, DEFAULT_LOKI_URL};
pub use receiver::{LogReceiver, TracingReceiver};
pub use registrar::{DeferredTaskRegistrar, InlineRegistrar, SpawnRegistrar};
pub use transport::{HttpTransport, PushRequest, ShippingError, Transport};
