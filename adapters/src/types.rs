//! Transport-level request, response and signalling types

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A fully resolved HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

/// Status and raw body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Flag raised by a broker client once partitions are assigned to a consumer.
///
/// Cloned into the client's rebalance callback; read by the consumption loop.
#[derive(Debug, Clone, Default)]
pub struct AssignmentSignal(Arc<AtomicBool>);

impl AssignmentSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify_assigned(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_assigned(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a watermark (offset bounds) request failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkError {
    /// No leader for the partition: the topic most likely does not exist
    LeaderNotAvailable,
    UnknownTopic,
    TimedOut,
    Other(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatermarkError::LeaderNotAvailable => f.write_str("leader not available"),
            WatermarkError::UnknownTopic => f.write_str("unknown topic or partition"),
            WatermarkError::TimedOut => f.write_str("timed out"),
            WatermarkError::Other(message) => f.write_str(message),
        }
    }
}
