use thiserror::Error;

use crate::types::AcField;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("invalid {field} value {value:?}")]
    InvalidValue { field: AcField, value: String },
    #[error("no command handler for topic {0}")]
    UnknownTopic(String),
    #[error("malformed payload on {topic}: {reason}")]
    Malformed { topic: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Temperature,
    Humidity,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SensorFault {
    #[error("sensor did not answer")]
    Unreadable,
    #[error("sensor returned a non-finite {}", .0.as_str())]
    NotFinite(Channel),
    #[error("{} reading {value} outside plausible range {min}..={max}", .channel.as_str())]
    OutOfRange {
        channel: Channel,
        value: f32,
        min: f32,
        max: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport unavailable, dropped publish to {topic}")]
    Unavailable { topic: String },
    #[error("publish to {topic} rejected: {reason}")]
    Rejected { topic: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("ir transmit failed: {0}")]
    Transmit(String),
}
