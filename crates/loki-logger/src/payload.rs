//! Loki push envelope construction.
//!
//! A flush serializes the whole pending queue into a single payload:
//!
//! ```json
//! {
//!   "streams": [
//!     {
//!       "stream": { "environment": "development" },
//!       "values": [
//!         ["1700000000000000000", "foo=bar level=info m1"],
//!         ["1700000000000000001", "foo=bar level=warn m2"]
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Timestamps are the decimal string form of the entry's logical nanosecond
//! timestamp; each rendered line is `<mdc-render>level=<level> <message>`.

use crate::logger::LogEntry;
use serde::Serialize;
use std::collections::BTreeMap;

/// Body of one `POST /loki/api/v1/push` request.
#[derive(Debug, Serialize)]
pub struct PushPayload {
    pub streams: Vec<StreamBatch>,
}

/// One labeled stream and its batched values.
#[derive(Debug, Serialize)]
pub struct StreamBatch {
    /// Static stream labels, attached verbatim to every batch.
    pub stream: BTreeMap<String, String>,
    /// `["<decimal nanosecond time>", "<rendered line>"]` pairs in call order.
    pub values: Vec<[String; 2]>,
}

impl PushPayload {
    /// Builds the single-stream payload for a batch of queued entries.
    pub fn from_entries(
        stream: &BTreeMap<String, String>,
        mdc_render: &str,
        entries: &[LogEntry],
    ) -> Self {
        let values = entries
            .iter()
            .map(|entry| {
                [
                    entry.time.to_string(),
                    format!("{mdc_render}level={} {}", entry.level, entry.message),
                ]
            })
            .collect();
        PushPayload {
            streams: vec![StreamBatch {
                stream: stream.clone(),
                values,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Level;

    fn entry(time: u64, message: &str, level: Level) -> LogEntry {
        LogEntry {
            time,
            message: message.to_string(),
            level,
        }
    }

    #[test]
    fn test_line_rendering_includes_mdc_and_level_tag() {
        let stream = BTreeMap::from([("environment".to_string(), "development".to_string())]);
        let entries = vec![
            entry(0, "m1", Level::Info),
            entry(1, "m2", Level::Warn),
            entry(2, "m3", Level::Fatal),
        ];

        let payload = PushPayload::from_entries(&stream, "foo=bar ", &entries);

        assert_eq!(payload.streams.len(), 1);
        let batch = &payload.streams[0];
        assert_eq!(batch.values[0], ["0", "foo=bar level=info m1"]);
        assert_eq!(batch.values[1], ["1", "foo=bar level=warn m2"]);
        assert_eq!(batch.values[2], ["2", "foo=bar level=fatal m3"]);
    }

    #[test]
    fn test_empty_mdc_render_leaves_no_prefix() {
        let stream = BTreeMap::new();
        let entries = vec![entry(7, "plain", Level::Error)];

        let payload = PushPayload::from_entries(&stream, "", &entries);

        assert_eq!(payload.streams[0].values[0], ["7", "level=error plain"]);
    }

    #[test]
    fn test_serialized_shape() {
        let stream = BTreeMap::from([("environment".to_string(), "development".to_string())]);
        let entries = vec![entry(0, "m1", Level::Info)];

        let payload = PushPayload::from_entries(&stream, "foo=bar ", &entries);
        let body = serde_json::to_string(&payload).expect("payload serialization failed");

        assert_eq!(
            body,
            r#"{"streams":[{"stream":{"environment":"development"},"values":[["0","foo=bar level=info m1"]]}]}"#
        );
    }
}
