//! Buffering logger: pending-entry queue, MDC, and the flush protocol.
//!
//! A [`Logger`] is constructed once per logical unit of work (typically one
//! incoming request). Level methods append to an in-memory queue and forward
//! to the local receiver synchronously; [`Logger::flush`] drains the whole
//! queue into one push request at the end of the unit of work.
//!
//! ```text
//!   info/warn/error/fatal ──> queue ──┐
//!            │                        │ flush()
//!            v                        v
//!       LogReceiver            PushPayload ──> Transport ──> Loki
//! ```
//!
//! The queue is taken synchronously when a flush starts, so entries logged
//! while a push is in flight belong unambiguously to the next batch: no entry
//! is ever shipped twice, none is dropped.

use crate::clock::{default_time_source, TimeSource};
use crate::error_value::{format_error_to_string, ErrorValue};
use crate::mdc::Mdc;
use crate::payload::PushPayload;
use crate::receiver::{LogReceiver, TracingReceiver};
use crate::registrar::{DeferredTaskRegistrar, InlineRegistrar};
use crate::transport::{HttpTransport, PushRequest, ShippingError, Transport};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Default ingestion endpoint when none is configured.
pub const DEFAULT_LOKI_URL: &str = "https://logs-prod-eu-west-0.grafana.net";

/// Severity of a queued entry. `Fatal` is a wire-level tag only; it does not
/// terminate anything and shares the receiver's `error` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One buffered record. Immutable once queued; removed only by `flush`,
/// atomically as a whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Logical nanosecond timestamp, strictly increasing per logger.
    pub time: u64,
    /// Fully rendered text, error detail already appended.
    pub message: String,
    pub level: Level,
}

/// Construction inputs for [`Logger`]. Only `loki_secret` and `stream` are
/// required; every `Option` field falls back to the stated default.
pub struct LoggerConfig {
    /// Opaque credential inserted verbatim into `Authorization: Basic <..>`.
    pub loki_secret: String,
    /// Static stream labels attached to every flush payload.
    pub stream: BTreeMap<String, String>,
    /// Base endpoint URL. Default: [`DEFAULT_LOKI_URL`].
    pub loki_url: Option<String>,
    /// Transport issuing the push request. Default: [`HttpTransport`].
    pub transport: Option<Arc<dyn Transport>>,
    /// Initial MDC entries, applied in order.
    pub mdc: Vec<(String, String)>,
    /// Forward a `flushing messages with mdc=..` note to the receiver on
    /// every non-empty flush. Default: `true`.
    pub log_mdc_to_console: bool,
    /// Local receiver. Default: [`TracingReceiver`].
    pub receiver: Option<Arc<dyn LogReceiver>>,
    /// Timestamp generator. Default: [`crate::clock::wall_clock_nanos`].
    pub time_source: Option<TimeSource>,
    /// Deferred-completion capability. Default: [`InlineRegistrar`].
    pub registrar: Option<Arc<dyn DeferredTaskRegistrar>>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            loki_secret: String::new(),
            stream: BTreeMap::new(),
            loki_url: None,
            transport: None,
            mdc: Vec::new(),
            log_mdc_to_console: true,
            receiver: None,
            time_source: None,
            registrar: None,
        }
    }
}

struct Inner {
    entries: Vec<LogEntry>,
    mdc: Mdc,
    issued: u64,
    time_source: TimeSource,
}

impl Inner {
    fn draw_timestamp(&mut self) -> u64 {
        let time = (self.time_source)(self.issued);
        self.issued += 1;
        time
    }
}

/// Buffering logger with level-scoped logging operations and a batch flush.
///
/// Level methods and MDC mutators are synchronous and never suspend; the only
/// suspension points are inside [`Logger::flush`].
pub struct Logger {
    inner: Mutex<Inner>,
    stream: BTreeMap<String, String>,
    loki_secret: String,
    loki_url: String,
    transport: Arc<dyn Transport>,
    receiver: Arc<dyn LogReceiver>,
    registrar: Arc<dyn DeferredTaskRegistrar>,
    log_mdc_to_console: bool,
}

impl Logger {
    pub fn new(config: LoggerConfig) -> Self {
        let mut mdc = Mdc::new();
        for (key, value) in config.mdc {
            mdc.set(key, value);
        }
        Logger {
            inner: Mutex::new(Inner {
                entries: Vec::new(),
                mdc,
                issued: 0,
                time_source: config.time_source.unwrap_or_else(default_time_source),
            }),
            stream: config.stream,
            loki_secret: config.loki_secret,
            loki_url: config
                .loki_url
                .unwrap_or_else(|| DEFAULT_LOKI_URL.to_string()),
            transport: config
                .transport
                .unwrap_or_else(|| Arc::new(HttpTransport::new())),
            receiver: config
                .receiver
                .unwrap_or_else(|| Arc::new(TracingReceiver)),
            registrar: config
                .registrar
                .unwrap_or_else(|| Arc::new(InlineRegistrar)),
            log_mdc_to_console: config.log_mdc_to_console,
        }
    }

    #[allow(clippy::expect_used)]
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("lock poisoned")
    }

    /// Inserts or overwrites an MDC entry, keeping the key's original
    /// position on overwrite.
    pub fn mdc_set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().mdc.set(key, value);
    }

    pub fn mdc_delete(&self, key: &str) {
        self.lock().mdc.delete(key);
    }

    pub fn mdc_get(&self, key: &str) -> Option<String> {
        self.lock().mdc.get(key).map(str::to_string)
    }

    /// The cached or freshly computed MDC render.
    pub fn mdc_format_string(&self) -> String {
        self.lock().mdc.format_string().to_string()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(message.into(), None, Level::Info);
    }

    pub fn warn(&self, message: impl Into<String>, error: Option<&ErrorValue>) {
        self.log(message.into(), error, Level::Warn);
    }

    pub fn error(&self, message: impl Into<String>, error: Option<&ErrorValue>) {
        self.log(message.into(), error, Level::Error);
    }

    /// Identical to [`Logger::error`] apart from the wire-level tag; not
    /// process-terminating.
    pub fn fatal(&self, message: impl Into<String>, error: Option<&ErrorValue>) {
        self.log(message.into(), error, Level::Fatal);
    }

    fn log(&self, mut message: String, error: Option<&ErrorValue>, level: Level) {
        if let Some(error) = error {
            message.push(' ');
            message.push_str(&format_error_to_string(error));
        }
        let rendered = {
            let mut inner = self.lock();
            let time = inner.draw_timestamp();
            inner.entries.push(LogEntry {
                time,
                message: message.clone(),
                level,
            });
            format!("{}{}", inner.mdc.format_string(), message)
        };
        match level {
            Level::Info => self.receiver.info(&rendered),
            Level::Warn => self.receiver.warn(&rendered, error),
            Level::Error | Level::Fatal => self.receiver.error(&rendered, error),
        }
    }

    /// Drains the queue into one push request and transmits it.
    ///
    /// The queue is taken and the MDC rendered before the first suspension
    /// point, so concurrent logging during the push starts a fresh batch.
    /// With no queued entries this is a no-op reported at debug level. A
    /// transport fault propagates unaltered; there is no retry.
    pub async fn flush(&self) -> Result<(), ShippingError> {
        let batch = {
            let mut inner = self.lock();
            if inner.entries.is_empty() {
                None
            } else {
                let mdc_render = inner.mdc.format_string().to_string();
                Some((std::mem::take(&mut inner.entries), mdc_render))
            }
        };

        let Some((entries, mdc_render)) = batch else {
            self.receiver.debug("logger has no messages to flush");
            return Ok(());
        };

        if self.log_mdc_to_console {
            self.receiver
                .info(&format!("flushing messages with mdc={mdc_render}"));
        }

        let payload = PushPayload::from_entries(&self.stream, &mdc_render, &entries);
        let body = serde_json::to_string(&payload)
            .map_err(|e| ShippingError::Payload(e.to_string()))?;
        let request = PushRequest::new(&self.loki_url, &self.loki_secret, body);

        let transport = Arc::clone(&self.transport);
        self.registrar
            .register(Box::pin(async move { transport.send(request).await }))
            .await
    }
}
